// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Date-addressed entries stored straight in the filesystem.
//!
//! Tumblog publishes and retrieves __entries__, short dated posts, without a
//! database server. Every entry lives at a [`DateAddress`], and readers name
//! entries through __tumblers__, a path-like address language covering single
//! entries, whole days, months, years, and ranges between them.
//!
//! - [`tumbler`] resolves tumbler text into an [`AddressSpec`].
//! - [`store`] maps addresses onto the storage layout, walks ranges while
//!   skipping empty days, navigates to neighbouring entries, and coordinates
//!   concurrent writers.

pub mod address;
pub mod config;
pub mod path;
pub mod store;
pub mod tumbler;

pub use crate::{
    address::{DateAddress, Granularity},
    store::{entry::Entry, navigate::Navigator, Blog, StoreError},
    tumbler::{parse, AddressSpec},
};
