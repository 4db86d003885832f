// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Tumbler resolution.
//!
//! A __tumbler__ is the path-like address language used to name entries in
//! the store, e.g., `2000/12/20.2`. A tumbler can name a whole year, a month,
//! a day, a single part of a day, a file stored next to a day's entries, or a
//! range between two such points.
//!
//! # Grammar
//!
//! ```text
//! tumbler  = [ "/" ] [ endpoint [ "-" endpoint ] ]
//! endpoint = year [ "/" month [ "/" day [ "." part | "/" filename ] ] ]
//! ```
//!
//! Months and days are written with exactly two digits, and parts carry no
//! leading zero. Input that breaks only these spelling rules is still
//! understood, but is flagged as needing a redirect to its canonical form.
//! The same goes for `:` or a misplaced `.` used as a field separator, for
//! trailing separators, and for a doubled range marker.
//!
//! # Ranges
//!
//! The second endpoint of a range may be abbreviated. Its fields are aligned
//! to the right of the first endpoint's fields, borrowing whatever high-order
//! fields it leaves out, so `2000/12/20-21` runs from the 20th to the 21st of
//! December 2000.
//!
//! A range written backwards is reordered. Because the fields an endpoint
//! leaves out are filled differently depending on whether it acts as a start
//! (first month, first day, first part) or as a stop (last month, last day,
//! every part), both endpoints are filled again for their new roles, e.g.,
//! `2000/12-09` covers all of September through all of December.

use crate::address::{days_in_month, DateAddress, Granularity};

use chrono::NaiveDate;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use tracing::debug;

/// Resolved tumbler.
///
/// # Invariant
///
/// - `is_file` and `is_range` are never both set.
/// - `needs_redirect` is never set together with `is_error`.
/// - `start <= stop` unless `is_error` is set or the unit is
///   [`Granularity::Index`].
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct AddressSpec {
    pub start: DateAddress,
    pub stop: DateAddress,
    pub start_unit: Granularity,
    pub stop_unit: Granularity,
    pub is_range: bool,
    pub is_file: bool,
    pub filename: Option<String>,
    pub needs_redirect: bool,
    pub is_error: bool,
}

impl AddressSpec {
    fn error() -> Self {
        Self {
            is_error: true,
            ..Self::default()
        }
    }

    /// Check if tumbler names no unit at all, i.e., the empty address.
    pub fn is_index(&self) -> bool {
        !self.is_error && self.start_unit == Granularity::Index
    }

    /// Render tumbler in canonical form.
    ///
    /// Errors render as the empty string. Range endpoints are always spelled
    /// out in full so the result never depends on alignment.
    pub fn canonical(&self) -> String {
        if self.is_error {
            return String::new();
        }

        if self.is_range {
            return format!(
                "{}-{}",
                render(&self.start, self.start_unit),
                render(&self.stop, self.stop_unit)
            );
        }

        match &self.filename {
            Some(filename) => format!("{}/{filename}", render(&self.start, Granularity::Day)),
            None => render(&self.start, self.start_unit),
        }
    }
}

impl Display for AddressSpec {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.canonical().as_str())
    }
}

impl FromStr for AddressSpec {
    type Err = TumblerError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.strip_prefix('/').unwrap_or(text);
        Scanner::new(text).run()?.resolve()
    }
}

/// Resolve tumbler text.
///
/// Never fails. Text that cannot be understood yields an [`AddressSpec`] with
/// `is_error` set, which callers should treat as "not found".
pub fn parse(text: impl AsRef<str>) -> AddressSpec {
    let text = text.as_ref();
    match text.parse::<AddressSpec>() {
        Ok(spec) => spec,
        Err(error) => {
            debug!("reject tumbler {text:?}: {error}");
            AddressSpec::error()
        }
    }
}

/// Render address in canonical form, truncated to given granularity.
pub fn render(address: &DateAddress, unit: Granularity) -> String {
    let DateAddress {
        year,
        month,
        day,
        part,
    } = address;

    match unit {
        Granularity::Index => String::new(),
        Granularity::Year => format!("{year:04}"),
        Granularity::Month => format!("{year:04}/{month:02}"),
        Granularity::Day => format!("{year:04}/{month:02}/{day:02}"),
        Granularity::Part => format!("{year:04}/{month:02}/{day:02}.{part}"),
    }
}

/// Scanner states, one per address component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Year,
    Month,
    Day,
    Part,
    File,
    Done,
}

/// Run of digits as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Digits {
    value: u32,
    width: usize,
}

impl Digits {
    const MAX_WIDTH: usize = 9;

    fn has_leading_zero(&self) -> bool {
        self.width > 1 && self.width > self.value.checked_ilog10().map_or(1, |log| log as usize + 1)
    }
}

/// One endpoint as written, before alignment.
///
/// Date fields are kept in order of appearance. Which calendar field each one
/// denotes is only known after alignment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Endpoint {
    fields: Vec<Digits>,
    part: Option<Digits>,
}

impl Endpoint {
    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.part.is_none()
    }

    fn unit(&self) -> Granularity {
        if self.part.is_some() {
            return Granularity::Part;
        }

        match self.fields.len() {
            0 => Granularity::Index,
            1 => Granularity::Year,
            2 => Granularity::Month,
            _ => Granularity::Day,
        }
    }

    /// Right-align fields of this endpoint against a wider endpoint.
    fn aligned_to(&self, wider: &Endpoint) -> Endpoint {
        let missing = wider.fields.len().saturating_sub(self.fields.len());
        let mut fields = wider.fields[..missing].to_vec();
        fields.extend(self.fields.iter().copied());

        Endpoint {
            fields,
            part: self.part,
        }
    }

    /// Check spelling of aligned fields for canonical form.
    fn is_canonical(&self) -> bool {
        let year = self
            .fields
            .first()
            .is_none_or(|year| year.width == year.value.to_string().len().max(4));
        let padded = year && self.fields.iter().skip(1).all(|field| field.width == 2);
        let part = self.part.is_none_or(|part| !part.has_leading_zero());
        padded && part
    }

    /// Validate aligned fields into calendar values.
    fn to_fields(&self) -> Result<Fields> {
        let mut fields = self.fields.iter().map(|field| field.value);
        let year = fields.next().ok_or(TumblerError::MissingYear)?;
        let year = i32::try_from(year).map_err(|_| TumblerError::Year(year))?;
        let month = fields.next();
        let day = fields.next();
        let part = self.part.map(|part| part.value);

        if let Some(month) = month {
            if !(1..=12).contains(&month) {
                return Err(TumblerError::Month(month));
            }
        }

        if NaiveDate::from_ymd_opt(year, month.unwrap_or(1), 1).is_none() {
            return Err(TumblerError::Year(year as u32));
        }

        if let (Some(month), Some(day)) = (month, day) {
            if day == 0 || day > days_in_month(year, month) {
                return Err(TumblerError::Day { month, day });
            }
        }

        if let Some(part) = part {
            if part == 0 || part > DateAddress::MAX_PART {
                return Err(TumblerError::Part(part));
            }
        }

        Ok(Fields {
            year,
            month,
            day,
            part,
        })
    }
}

/// Validated calendar fields of one endpoint.
#[derive(Debug, Clone, Copy)]
struct Fields {
    year: i32,
    month: Option<u32>,
    day: Option<u32>,
    part: Option<u32>,
}

impl Fields {
    /// Fill unspecified fields for an endpoint acting as a start.
    fn lower(&self) -> DateAddress {
        DateAddress::new(
            self.year,
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
            self.part.unwrap_or(1),
        )
    }

    /// Fill unspecified fields for an endpoint acting as a stop.
    fn upper(&self) -> DateAddress {
        let month = self.month.unwrap_or(12);
        DateAddress::new(
            self.year,
            month,
            self.day.unwrap_or_else(|| days_in_month(self.year, month)),
            self.part.unwrap_or(DateAddress::MAX_PART),
        )
    }
}

/// Left to right scanner over tumbler text.
#[derive(Debug)]
struct Scanner<'a> {
    text: &'a str,
    position: usize,
    closed: Option<Endpoint>,
    current: Endpoint,
    filename: Option<String>,
    redirect: bool,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            position: 0,
            closed: None,
            current: Endpoint::default(),
            filename: None,
            redirect: false,
        }
    }

    fn run(mut self) -> Result<Scanned> {
        let mut state = State::Year;
        while state != State::Done {
            state = match state {
                State::Year => self.year()?,
                State::Month => self.month()?,
                State::Day => self.day()?,
                State::Part => self.part()?,
                State::File => self.file()?,
                State::Done => State::Done,
            };
        }

        let mut endpoints = Vec::with_capacity(2);
        endpoints.extend(self.closed);
        if !self.current.is_empty() {
            endpoints.push(self.current);
        }

        Ok(Scanned {
            endpoints,
            filename: self.filename,
            redirect: self.redirect,
        })
    }

    fn year(&mut self) -> Result<State> {
        let Some(digits) = self.digits()? else {
            return match (self.peek(), &self.closed) {
                // Empty tumbler.
                (None, None) => Ok(State::Done),

                // Trailing range marker.
                (None, Some(_)) => {
                    self.redirect = true;
                    Ok(State::Done)
                }

                // Doubled range marker.
                (Some('-'), Some(_)) if self.current.is_empty() => {
                    self.bump();
                    self.redirect = true;
                    Ok(State::Year)
                }
                (Some(found), _) => Err(self.unexpected(found)),
            };
        };

        self.current.fields.push(digits);
        match self.bump() {
            None => Ok(State::Done),
            Some('-') => self.close(),
            Some('/') => Ok(State::Month),
            Some('.' | ':') => {
                self.redirect = true;
                Ok(State::Month)
            }
            Some(found) => Err(self.unexpected_previous(found)),
        }
    }

    fn month(&mut self) -> Result<State> {
        let Some(digits) = self.digits()? else {
            return self.trailing_separator();
        };

        self.current.fields.push(digits);
        match self.bump() {
            None => Ok(State::Done),
            Some('-') => self.close(),
            Some('/') => Ok(State::Day),
            Some('.' | ':') => {
                self.redirect = true;
                Ok(State::Day)
            }
            Some(found) => Err(self.unexpected_previous(found)),
        }
    }

    fn day(&mut self) -> Result<State> {
        let Some(digits) = self.digits()? else {
            return self.trailing_separator();
        };

        self.current.fields.push(digits);
        match self.bump() {
            None => Ok(State::Done),
            Some('-') => self.close(),
            Some('/') => Ok(State::File),
            Some('.') => Ok(State::Part),
            Some(':') => {
                self.redirect = true;
                Ok(State::Part)
            }
            Some(found) => Err(self.unexpected_previous(found)),
        }
    }

    fn part(&mut self) -> Result<State> {
        let Some(digits) = self.digits()? else {
            return self.trailing_separator();
        };

        if digits.value == 0 {
            return Err(TumblerError::Part(0));
        }

        self.current.part = Some(digits);
        match self.bump() {
            None => Ok(State::Done),
            Some('-') => self.close(),
            Some(found) => Err(self.unexpected_previous(found)),
        }
    }

    fn file(&mut self) -> Result<State> {
        if self.closed.is_some() {
            return Err(TumblerError::FileInRange);
        }

        let rest = &self.text[self.position..];
        self.position = self.text.len();
        if rest.is_empty() {
            self.redirect = true;
        } else {
            self.filename = Some(rest.to_owned());
        }

        Ok(State::Done)
    }

    /// Close current endpoint, and begin the second one.
    fn close(&mut self) -> Result<State> {
        if self.closed.is_some() {
            return Err(TumblerError::TooManyEndpoints);
        }

        self.closed = Some(std::mem::take(&mut self.current));
        Ok(State::Year)
    }

    /// Empty field at end of input means a trailing separator.
    fn trailing_separator(&mut self) -> Result<State> {
        match self.peek() {
            None => {
                self.redirect = true;
                Ok(State::Done)
            }
            Some(found) => Err(self.unexpected(found)),
        }
    }

    fn digits(&mut self) -> Result<Option<Digits>> {
        let rest = &self.text[self.position..];
        let width = rest.bytes().take_while(u8::is_ascii_digit).count();
        if width == 0 {
            return Ok(None);
        }

        if width > Digits::MAX_WIDTH {
            return Err(TumblerError::TooLong {
                position: self.position,
            });
        }

        let value = rest[..width]
            .parse()
            .map_err(|_| TumblerError::TooLong {
                position: self.position,
            })?;
        self.position += width;

        Ok(Some(Digits { value, width }))
    }

    fn peek(&self) -> Option<char> {
        self.text[self.position..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let next = self.peek()?;
        self.position += next.len_utf8();
        Some(next)
    }

    fn unexpected(&self, found: char) -> TumblerError {
        TumblerError::Unexpected {
            found,
            position: self.position,
        }
    }

    fn unexpected_previous(&self, found: char) -> TumblerError {
        TumblerError::Unexpected {
            found,
            position: self.position - found.len_utf8(),
        }
    }
}

/// Scanner output, waiting for alignment and validation.
#[derive(Debug)]
struct Scanned {
    endpoints: Vec<Endpoint>,
    filename: Option<String>,
    redirect: bool,
}

impl Scanned {
    fn resolve(self) -> Result<AddressSpec> {
        match self.endpoints.as_slice() {
            [] => Ok(AddressSpec {
                needs_redirect: self.redirect,
                ..AddressSpec::default()
            }),
            [point] => self.resolve_point(point),
            [first, second] => self.resolve_range(first, second),
            _ => Err(TumblerError::TooManyEndpoints),
        }
    }

    fn resolve_point(&self, point: &Endpoint) -> Result<AddressSpec> {
        let fields = point.to_fields()?;
        let unit = point.unit();

        Ok(AddressSpec {
            start: fields.lower(),
            stop: fields.upper(),
            start_unit: unit,
            stop_unit: unit,
            is_range: false,
            is_file: self.filename.is_some(),
            filename: self.filename.clone(),
            needs_redirect: self.redirect || !point.is_canonical(),
            is_error: false,
        })
    }

    fn resolve_range(&self, first: &Endpoint, second: &Endpoint) -> Result<AddressSpec> {
        let second = second.aligned_to(first);
        let (a, b) = (first.to_fields()?, second.to_fields()?);
        let (a_unit, b_unit) = (first.unit(), second.unit());

        // INVARIANT: Refill both endpoints for their new roles when reversed.
        //   The stop is spelled out at least as far as the start's date fields,
        //   so its canonical rendering aligns back onto the same fields.
        let (start, stop, start_unit, stop_unit) = if a.lower() > b.upper() {
            let stop_unit = a_unit.max(b_unit.min(Granularity::Day));
            (b.lower(), a.upper(), b_unit, stop_unit)
        } else {
            (a.lower(), b.upper(), a_unit, b_unit)
        };

        Ok(AddressSpec {
            start,
            stop,
            start_unit,
            stop_unit,
            is_range: true,
            is_file: false,
            filename: None,
            needs_redirect: self.redirect || !first.is_canonical() || !second.is_canonical(),
            is_error: false,
        })
    }
}

/// Tumbler resolution error types.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TumblerError {
    /// Character that does not fit the grammar.
    #[error("unexpected {found:?} at byte {position}")]
    Unexpected { found: char, position: usize },

    /// Digit run too long to be any field.
    #[error("digit run at byte {position} is too long")]
    TooLong { position: usize },

    /// Endpoint without a year.
    #[error("endpoint has no year")]
    MissingYear,

    /// More than two endpoints.
    #[error("a range has at most two endpoints")]
    TooManyEndpoints,

    /// Filename given as part of a range.
    #[error("files cannot be range endpoints")]
    FileInRange,

    /// Year outside of the calendar.
    #[error("year {0} is out of range")]
    Year(u32),

    /// Month outside 1..=12.
    #[error("month {0} is out of range")]
    Month(u32),

    /// Day past the end of its month.
    #[error("day {day} is out of range for month {month}")]
    Day { month: u32, day: u32 },

    /// Part zero or past the largest legal part.
    #[error("part {0} is out of range")]
    Part(u32),
}

/// Friendly result alias :3
type Result<T, E = TumblerError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    const MAX: u32 = DateAddress::MAX_PART;

    fn at(year: i32, month: u32, day: u32, part: u32) -> DateAddress {
        DateAddress::new(year, month, day, part)
    }

    fn point(start: DateAddress, stop: DateAddress, unit: Granularity) -> AddressSpec {
        AddressSpec {
            start,
            stop,
            start_unit: unit,
            stop_unit: unit,
            ..AddressSpec::default()
        }
    }

    fn range(
        start: DateAddress,
        start_unit: Granularity,
        stop: DateAddress,
        stop_unit: Granularity,
    ) -> AddressSpec {
        AddressSpec {
            start,
            stop,
            start_unit,
            stop_unit,
            is_range: true,
            ..AddressSpec::default()
        }
    }

    #[test_case("2000", point(at(2000, 1, 1, 1), at(2000, 12, 31, MAX), Granularity::Year); "year")]
    #[test_case("2000/02", point(at(2000, 2, 1, 1), at(2000, 2, 29, MAX), Granularity::Month); "leap month")]
    #[test_case("2000/12/20", point(at(2000, 12, 20, 1), at(2000, 12, 20, MAX), Granularity::Day); "day")]
    #[test_case("2000/12/20.2", point(at(2000, 12, 20, 2), at(2000, 12, 20, 2), Granularity::Part); "part")]
    #[test_case("/2000/12/20.2", point(at(2000, 12, 20, 2), at(2000, 12, 20, 2), Granularity::Part); "url path")]
    #[test]
    fn parse_point(text: &str, expect: AddressSpec) {
        use pretty_assertions::assert_eq;
        assert_eq!(parse(text), expect);
    }

    #[test]
    fn parse_empty_is_index() {
        let result = parse("");
        assert!(result.is_index());
        assert!(!result.needs_redirect);
        assert_eq!(result.canonical(), "");
    }

    #[test]
    fn parse_file() {
        let result = parse("2000/12/20/sunset-1.jpg");
        let expect = AddressSpec {
            is_file: true,
            filename: Some("sunset-1.jpg".into()),
            ..point(at(2000, 12, 20, 1), at(2000, 12, 20, MAX), Granularity::Day)
        };
        assert_eq!(result, expect);
        assert_eq!(result.canonical(), "2000/12/20/sunset-1.jpg");
    }

    #[test]
    fn parse_forward_range() {
        let result = parse("2000/12/20-21");
        let expect = range(
            at(2000, 12, 20, 1),
            Granularity::Day,
            at(2000, 12, 21, MAX),
            Granularity::Day,
        );
        assert_eq!(result, expect);
        assert_eq!(result.canonical(), "2000/12/20-2000/12/21");
    }

    #[test]
    fn parse_range_with_longer_second_endpoint() {
        let result = parse("2000/12-2001/01/05");
        let expect = range(
            at(2000, 12, 1, 1),
            Granularity::Month,
            at(2001, 1, 5, MAX),
            Granularity::Day,
        );
        assert_eq!(result, expect);
    }

    #[test_case("2000/12-09", at(2000, 9, 1, 1), Granularity::Month, at(2000, 12, 31, MAX), Granularity::Month; "month then month")]
    #[test_case("2000/12-2000/09/15", at(2000, 9, 15, 1), Granularity::Day, at(2000, 12, 31, MAX), Granularity::Day; "month then day")]
    #[test_case("2000/12-2000/09/15.3", at(2000, 9, 15, 3), Granularity::Part, at(2000, 12, 31, MAX), Granularity::Day; "month then part")]
    #[test_case("2000/12/20-09", at(2000, 12, 9, 1), Granularity::Day, at(2000, 12, 20, MAX), Granularity::Day; "day then day")]
    #[test_case("2000/12/20-09.2", at(2000, 12, 9, 2), Granularity::Part, at(2000, 12, 20, MAX), Granularity::Day; "day then part")]
    #[test_case("2000/12/20.2-09/15", at(2000, 9, 15, 1), Granularity::Day, at(2000, 12, 20, 2), Granularity::Part; "part then day")]
    #[test_case("2000/12/20.2-09/15.3", at(2000, 9, 15, 3), Granularity::Part, at(2000, 12, 20, 2), Granularity::Part; "part then part")]
    #[test_case("2000/12/20.3-20.1", at(2000, 12, 20, 1), Granularity::Part, at(2000, 12, 20, 3), Granularity::Part; "part then part same day")]
    #[test_case("2001-2000/03", at(2000, 3, 1, 1), Granularity::Month, at(2001, 12, 31, MAX), Granularity::Month; "year then month")]
    #[test_case("2001-2000/03/05", at(2000, 3, 5, 1), Granularity::Day, at(2001, 12, 31, MAX), Granularity::Day; "year then day")]
    #[test_case("2005-2000", at(2000, 1, 1, 1), Granularity::Year, at(2005, 12, 31, MAX), Granularity::Year; "year then year")]
    #[test]
    fn parse_reversed_range(
        text: &str,
        start: DateAddress,
        start_unit: Granularity,
        stop: DateAddress,
        stop_unit: Granularity,
    ) {
        use pretty_assertions::assert_eq;
        assert_eq!(parse(text), range(start, start_unit, stop, stop_unit));
    }

    #[test_case("1999/3/4", "1999/03/04"; "single digit month and day")]
    #[test_case("2000/12/", "2000/12"; "trailing slash after month")]
    #[test_case("2000/", "2000"; "trailing slash after year")]
    #[test_case("2000/12/20/", "2000/12/20"; "trailing slash after day")]
    #[test_case("2000/12/20.", "2000/12/20"; "trailing dot")]
    #[test_case("2000.12", "2000/12"; "dot after year")]
    #[test_case("2000:12", "2000/12"; "colon after year")]
    #[test_case("2000/12.20", "2000/12/20"; "dot after month")]
    #[test_case("2000/12/20:2", "2000/12/20.2"; "colon before part")]
    #[test_case("2000/12/20.02", "2000/12/20.2"; "leading zero part")]
    #[test_case("2000/12-", "2000/12"; "trailing range marker")]
    #[test_case("2000/12--09", "2000/09-2000/12"; "doubled range marker")]
    #[test_case("2000/12/20-9", "2000/12/09-2000/12/20"; "short aligned day")]
    #[test_case("2000/12--2000/09/15", "2000/09/15-2000/12/31"; "doubled marker before longer endpoint")]
    #[test_case("02000", "2000"; "padded year")]
    #[test_case("200/01", "0200/01"; "short year")]
    #[test]
    fn parse_needs_redirect(text: &str, canonical: &str) {
        let result = parse(text);
        assert!(!result.is_error);
        assert!(result.needs_redirect);
        use pretty_assertions::assert_eq;
        assert_eq!(result.canonical(), canonical);
    }

    #[test]
    fn parse_single_digit_fields() {
        let result = parse("1999/3/4");
        let expect = AddressSpec {
            needs_redirect: true,
            ..point(at(1999, 3, 4, 1), at(1999, 3, 4, MAX), Granularity::Day)
        };
        assert_eq!(result, expect);
    }

    #[test_case("abc", TumblerError::Unexpected { found: 'a', position: 0 }; "letters")]
    #[test_case("2000/13", TumblerError::Month(13); "month thirteen")]
    #[test_case("2000/00", TumblerError::Month(0); "month zero")]
    #[test_case("2001/02/29", TumblerError::Day { month: 2, day: 29 }; "no leap day")]
    #[test_case("2000/04/31", TumblerError::Day { month: 4, day: 31 }; "april thirty first")]
    #[test_case("2000/12/20.0", TumblerError::Part(0); "part zero")]
    #[test_case("2000/12/20.1000", TumblerError::Part(1000); "part too large")]
    #[test_case("2000//12", TumblerError::Unexpected { found: '/', position: 5 }; "empty month")]
    #[test_case("2000-2001-2002", TumblerError::TooManyEndpoints; "three endpoints")]
    #[test_case("2000/12/20-2000/12/21/x.jpg", TumblerError::FileInRange; "file in range")]
    #[test_case("2000/12/20.2/x", TumblerError::Unexpected { found: '/', position: 12 }; "file after part")]
    #[test_case("2000/12/20-2000/12", TumblerError::Month(2000); "misaligned second endpoint")]
    #[test_case("-2000", TumblerError::Unexpected { found: '-', position: 0 }; "missing first endpoint")]
    #[test_case("1234567890", TumblerError::TooLong { position: 0 }; "huge year")]
    #[test]
    fn parse_error(text: &str, expect: TumblerError) {
        use pretty_assertions::assert_eq;
        assert_eq!(text.parse::<AddressSpec>(), Err(expect));

        let result = parse(text);
        assert!(result.is_error);
        assert!(!result.needs_redirect);
    }

    #[test]
    fn canonical_round_trip() {
        let inputs = [
            "2000",
            "2000/02",
            "2000/12/20",
            "2000/12/20.2",
            "2000/12/20/photo.png",
            "2000/12/20-21",
            "2000/12-09",
            "2000/12/20.2-09/15",
            "2000/12/20.3-20.1",
            "1999/3/4",
            "2000/12/20:02",
            "2005-2000",
            "2000/12--2001/01/05",
            "2001-2000/03",
            "2001-2000/03/05",
            "2000/12-2000/09/15",
            "2000/12-2000/09/15.3",
            "2000/12--2000/09/15",
            "0200/01/01",
            "10000",
        ];

        for input in inputs {
            let spec = parse(input);
            assert!(!spec.is_error, "{input:?} should parse");

            let canonical = spec.canonical();
            let reparsed = parse(&canonical);
            assert!(!reparsed.needs_redirect, "{canonical:?} should be canonical");
            assert_eq!(
                reparsed,
                AddressSpec {
                    needs_redirect: false,
                    ..spec
                },
                "round trip of {input:?}"
            );
        }
    }
}
