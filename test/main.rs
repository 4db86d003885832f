// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

mod navigate;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::Path;
use tempfile::TempDir;
use tumblog::{Blog, DateAddress, Entry};

/// Scratch storage root that disappears with the fixture.
pub(crate) struct BlogFixture {
    dir: TempDir,
    blog: Blog,
}

impl BlogFixture {
    pub(crate) fn new(now: NaiveDateTime) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let blog = Blog::init(dir.path(), now)?;

        Ok(Self { dir, blog })
    }

    pub(crate) fn blog(&self) -> &Blog {
        &self.blog
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open second handle onto the same storage root.
    pub(crate) fn reopen(&self, now: NaiveDateTime) -> Result<Blog> {
        Ok(Blog::open(self.path(), now)?)
    }

    /// Append entry titled `title` to a day, and return its address.
    pub(crate) fn post(&self, year: i32, month: u32, day: u32, title: &str) -> Result<DateAddress> {
        post(&self.blog, year, month, day, title)
    }
}

pub(crate) fn post(blog: &Blog, year: i32, month: u32, day: u32, title: &str) -> Result<DateAddress> {
    let mut entry = Entry::new(DateAddress::new(year, month, day, 0), blog.now());
    entry.title = title.into();
    entry.body = format!("body of {title}\n").into_bytes();
    blog.write(&mut entry)?;

    Ok(entry.when)
}

pub(crate) fn noon(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(12, 0, 0))
        .unwrap()
}

pub(crate) fn titles(entries: &[Entry]) -> Vec<&str> {
    entries.iter().map(|entry| entry.title.as_str()).collect()
}
