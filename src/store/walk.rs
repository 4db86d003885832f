// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Sparse-aware day traversal.
//!
//! Most calendar days of a store hold no entries at all. Traversal visits
//! days one at a time, but consults the index for whole years and months
//! first, so empty stretches of the calendar are skipped without probing
//! each of their days.

use chrono::{Datelike, NaiveDate};

/// Day holding at least one entry.
pub trait DayRecord {
    /// Calendar date of day.
    fn date(&self) -> NaiveDate;

    /// Number of entries stored on day.
    fn count(&self) -> u32;
}

/// Lookup of the days holding entries.
pub trait DayIndex {
    /// Populated day as loaded from the index.
    type Day: DayRecord;

    /// Failure to consult the index.
    type Error;

    /// Load a given day.
    ///
    /// A day without entries and a day that does not exist at all both load
    /// as `None`.
    fn load_day(&self, date: NaiveDate) -> Result<Option<Self::Day>, Self::Error>;

    /// Number of entries stored on a given day.
    fn day_count(&self, date: NaiveDate) -> Result<u32, Self::Error> {
        Ok(self.load_day(date)?.map_or(0, |day| day.count()))
    }

    /// Check if any day of a year could hold entries.
    fn has_year(&self, _year: i32) -> bool {
        true
    }

    /// Check if any day of a month could hold entries.
    fn has_month(&self, _year: i32, _month: u32) -> bool {
        true
    }
}

/// Direction of travel through the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Iterator over populated days between two dates, inclusive.
///
/// Yields each day holding at least one entry, loaded once. The walk ends
/// after the first error of the index.
#[derive(Debug)]
pub struct DayWalk<'a, I>
where
    I: DayIndex + ?Sized,
{
    index: &'a I,
    next: Option<NaiveDate>,
    bound: NaiveDate,
    direction: Direction,
}

impl<'a, I> DayWalk<'a, I>
where
    I: DayIndex + ?Sized,
{
    /// Construct new walk from `start` toward `bound` in given direction.
    ///
    /// Walk is empty if `bound` lies behind `start`.
    pub fn new(index: &'a I, start: NaiveDate, bound: NaiveDate, direction: Direction) -> Self {
        Self {
            index,
            next: Some(start),
            bound,
            direction,
        }
    }

    fn is_past_bound(&self, date: NaiveDate) -> bool {
        match self.direction {
            Direction::Forward => date > self.bound,
            Direction::Backward => date < self.bound,
        }
    }

    fn step_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.direction {
            Direction::Forward => date.succ_opt(),
            Direction::Backward => date.pred_opt(),
        }
    }

    fn step_year(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.direction {
            Direction::Forward => NaiveDate::from_ymd_opt(date.year() + 1, 1, 1),
            Direction::Backward => NaiveDate::from_ymd_opt(date.year() - 1, 12, 31),
        }
    }

    fn step_month(&self, date: NaiveDate) -> Option<NaiveDate> {
        match self.direction {
            Direction::Forward => first_of_next_month(date),
            Direction::Backward => date.with_day(1)?.pred_opt(),
        }
    }
}

impl<I> Iterator for DayWalk<'_, I>
where
    I: DayIndex + ?Sized,
{
    type Item = Result<I::Day, I::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let date = self.next?;
            if self.is_past_bound(date) {
                self.next = None;
                return None;
            }

            if !self.index.has_year(date.year()) {
                self.next = self.step_year(date);
                continue;
            }

            if !self.index.has_month(date.year(), date.month()) {
                self.next = self.step_month(date);
                continue;
            }

            self.next = self.step_day(date);
            match self.index.load_day(date) {
                Ok(Some(day)) => return Some(Ok(day)),
                Ok(None) => continue,
                Err(err) => {
                    self.next = None;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// First day of the month following a given date.
pub(crate) fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    }
}
