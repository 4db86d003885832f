// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use crate::{
    address::DateAddress,
    store::meta::{DayMeta, MetaField, MetaRow},
};

use chrono::NaiveDateTime;
use std::borrow::Cow;

/// A single post.
///
/// Entries are built fresh on every read, and belong to the caller from then
/// on. Nothing is cached between reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Address of entry. Part 0 until the entry is first written.
    pub when: DateAddress,
    pub title: String,
    pub class: String,
    pub author: String,
    pub status: String,
    pub adtag: String,

    /// Time of last write.
    pub timestamp: NaiveDateTime,

    /// Raw body content.
    pub body: Vec<u8>,
}

impl Entry {
    /// Construct new empty entry.
    pub fn new(when: DateAddress, timestamp: NaiveDateTime) -> Self {
        Self {
            when,
            title: String::new(),
            class: String::new(),
            author: String::new(),
            status: String::new(),
            adtag: String::new(),
            timestamp,
            body: Vec::new(),
        }
    }

    /// Check if entry still waits for a part to be assigned.
    pub fn is_unassigned(&self) -> bool {
        self.when.part == 0
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub(crate) fn from_meta(
        when: DateAddress,
        meta: &DayMeta,
        timestamp: NaiveDateTime,
        body: Vec<u8>,
    ) -> Self {
        Self {
            when,
            title: meta.get(MetaField::Title, when.part).to_owned(),
            class: meta.get(MetaField::Class, when.part).to_owned(),
            author: meta.get(MetaField::Author, when.part).to_owned(),
            status: meta.get(MetaField::Status, when.part).to_owned(),
            adtag: meta.get(MetaField::Adtag, when.part).to_owned(),
            timestamp,
            body,
        }
    }

    /// Metadata row of entry in [`MetaField::ALL`] order.
    ///
    /// Line breaks become spaces, since every value must fit on one line.
    pub(crate) fn meta_row(&self) -> MetaRow {
        [
            one_line(&self.title),
            one_line(&self.class),
            one_line(&self.author),
            one_line(&self.status),
            one_line(&self.adtag),
        ]
    }
}

fn one_line(value: &str) -> String {
    value
        .split(['\r', '\n'])
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    #[test]
    fn meta_row_flattens_line_breaks() {
        let timestamp = NaiveDate::from_ymd_opt(2000, 12, 20)
            .and_then(|date| date.and_hms_opt(8, 30, 0))
            .unwrap();
        let mut entry = Entry::new(DateAddress::new(2000, 12, 20, 0), timestamp);
        entry.title = "Snow\r\nagain".into();
        entry.class = "weather\n".into();

        assert!(entry.is_unassigned());
        assert_eq!(
            entry.meta_row(),
            [
                "Snow again".to_owned(),
                "weather".to_owned(),
                String::new(),
                String::new(),
                String::new(),
            ]
        );
    }
}
