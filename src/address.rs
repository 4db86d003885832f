// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Date addresses.
//!
//! Every entry in the store lives at a __date address__: a calendar day plus
//! a __part__, the 1-based slot of the entry among all entries published on
//! that same day. Addresses are totally ordered field by field, so sorting
//! addresses sorts entries into publication order.
//!
//! # Text Form
//!
//! The text form of an address is `YYYY/MM/DD.P`, where year, month, and day
//! are zero-padded, and the part carries no leading zero. This is the form
//! used by the `.first` and `.last` sentinel files at the root of a store.

use chrono::{Datelike, NaiveDate};
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// Calendar day plus part slot.
///
/// # Invariant
///
/// - `day <= days_in_month(year, month)` whenever the address names a
///   concrete day.
/// - `part == 0` only for entries that have not been assigned a slot yet.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateAddress {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub part: u32,
}

impl DateAddress {
    /// Largest legal part number.
    ///
    /// Stop endpoints that only name a day use this as their part, so they
    /// cover every entry of that day.
    pub const MAX_PART: u32 = 999;

    /// Construct new date address without validation.
    pub const fn new(year: i32, month: u32, day: u32, part: u32) -> Self {
        Self {
            year,
            month,
            day,
            part,
        }
    }

    /// Construct date address from calendar date and part.
    pub fn from_date(date: NaiveDate, part: u32) -> Self {
        Self::new(date.year(), date.month(), date.day(), part)
    }

    /// Calendar date of address, if the address names a real day.
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Check that address names a real day and a legal part.
    pub fn is_valid(&self) -> bool {
        self.date().is_some() && self.part <= Self::MAX_PART
    }

    /// Compare two addresses by calendar day alone, ignoring parts.
    pub fn date_cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month, self.day).cmp(&(other.year, other.month, other.day))
    }

    /// Same address with a different part.
    pub fn with_part(self, part: u32) -> Self {
        Self { part, ..self }
    }
}

impl Display for DateAddress {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "{:04}/{:02}/{:02}.{}",
            self.year, self.month, self.day, self.part
        )
    }
}

impl FromStr for DateAddress {
    type Err = AddressError;

    /// Parse strict `YYYY/MM/DD.P` text form.
    ///
    /// Surrounding whitespace is ignored so sentinel files may end with a
    /// newline.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        let malformed = || AddressError::Malformed(text.to_owned());

        let (date, part) = text.split_once('.').ok_or_else(malformed)?;
        let mut fields = date.splitn(3, '/');
        let year = fields.next().ok_or_else(malformed)?;
        let month = fields.next().ok_or_else(malformed)?;
        let day = fields.next().ok_or_else(malformed)?;

        let address = Self::new(
            year.parse().map_err(|_| malformed())?,
            month.parse().map_err(|_| malformed())?,
            day.parse().map_err(|_| malformed())?,
            part.parse().map_err(|_| malformed())?,
        );

        if !address.is_valid() {
            return Err(AddressError::OutOfRange(address));
        }

        Ok(address)
    }
}

/// Number of days in a month, leap year aware.
///
/// Returns 0 for months outside 1..=12 or years outside the calendar range.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };

    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match next {
        Some(next) => next.signed_duration_since(first).num_days() as u32,
        None => 31,
    }
}

/// Which field of an address was written most precisely.
///
/// Ordered from coarse to fine.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Granularity {
    /// No explicit unit at all, e.g., the empty address.
    #[default]
    Index,
    Year,
    Month,
    Day,
    Part,
}

/// Date address error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Text is not in `YYYY/MM/DD.P` form.
    #[error("malformed date address {0:?}")]
    Malformed(String),

    /// Fields parse but do not name a real day.
    #[error("date address {0} is out of range")]
    OutOfRange(DateAddress),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    #[test_case(2000, 2, 29; "leap century")]
    #[test_case(1900, 2, 28; "non leap century")]
    #[test_case(2024, 2, 29; "leap year")]
    #[test_case(2023, 2, 28; "common year")]
    #[test_case(2023, 4, 30; "thirty day month")]
    #[test_case(2023, 12, 31; "december")]
    #[test_case(2023, 13, 0; "bad month")]
    #[test]
    fn month_lengths(year: i32, month: u32, expect: u32) {
        use pretty_assertions::assert_eq;
        assert_eq!(days_in_month(year, month), expect);
    }

    #[test]
    fn ordering_is_lexicographic() {
        let mut addresses = vec![
            DateAddress::new(2000, 12, 20, 2),
            DateAddress::new(1999, 12, 31, 9),
            DateAddress::new(2000, 12, 20, 1),
            DateAddress::new(2000, 1, 31, 4),
        ];
        addresses.sort();

        assert_eq!(
            addresses,
            vec![
                DateAddress::new(1999, 12, 31, 9),
                DateAddress::new(2000, 1, 31, 4),
                DateAddress::new(2000, 12, 20, 1),
                DateAddress::new(2000, 12, 20, 2),
            ]
        );
    }

    #[test]
    fn date_cmp_ignores_part() {
        let lhs = DateAddress::new(2000, 12, 20, 1);
        let rhs = DateAddress::new(2000, 12, 20, 7);
        assert_eq!(lhs.date_cmp(&rhs), Ordering::Equal);
        assert!(lhs < rhs);
    }

    #[test]
    fn text_form() -> anyhow::Result<()> {
        let address: DateAddress = "2000/02/29.3\n".parse()?;
        assert_eq!(address, DateAddress::new(2000, 2, 29, 3));
        assert_eq!(address.to_string(), "2000/02/29.3");

        Ok(())
    }

    #[test_case("2000/02/29"; "missing part")]
    #[test_case("2000/02.1"; "missing day")]
    #[test_case("2000/xx/01.1"; "garbage month")]
    #[test]
    fn malformed_text(text: &str) {
        assert!(matches!(
            text.parse::<DateAddress>(),
            Err(AddressError::Malformed(_))
        ));
    }

    #[test]
    fn out_of_range_text() {
        assert_eq!(
            "2001/02/29.1".parse::<DateAddress>(),
            Err(AddressError::OutOfRange(DateAddress::new(2001, 2, 29, 1)))
        );
    }
}
