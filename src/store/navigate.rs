// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Previous and next navigation.
//!
//! Given an address and a granularity, find the nearest populated address
//! one unit before or after it. No index of populated days exists, so the
//! search walks the calendar until it meets a day holding entries, or leaves
//! the extent of the store.

use crate::{
    address::{DateAddress, Granularity},
    store::walk::{first_of_next_month, DayIndex, DayRecord, DayWalk, Direction},
};

use chrono::{Datelike, NaiveDate};
use tracing::debug;

/// Resolve previous and next addresses within the extent of a store.
///
/// The extent runs from the first entry of the store to a ceiling, usually
/// the earlier of the newest entry and the current time.
#[derive(Debug)]
pub struct Navigator<'a, I>
where
    I: DayIndex + ?Sized,
{
    index: &'a I,
    first: Option<DateAddress>,
    ceiling: Option<DateAddress>,
}

impl<'a, I> Navigator<'a, I>
where
    I: DayIndex + ?Sized,
{
    /// Construct new navigator over given extent.
    ///
    /// A missing bound means an empty store, where nothing can be found.
    pub fn new(index: &'a I, first: Option<DateAddress>, ceiling: Option<DateAddress>) -> Self {
        Self {
            index,
            first,
            ceiling,
        }
    }

    /// Nearest populated address one unit before `current`.
    ///
    /// Year and month results point at the first day of their unit, day
    /// results at part 1, and part results at the last part of their day.
    /// Results never precede the first entry, so a year or month holding the
    /// first entry resolves to that entry instead of to its first day.
    ///
    /// # Errors
    ///
    /// - Return error of index if a day on the way cannot be loaded.
    pub fn previous(
        &self,
        current: DateAddress,
        unit: Granularity,
    ) -> Result<Option<DateAddress>, I::Error> {
        let (Some(first), Some(ceiling)) = (self.first, self.ceiling) else {
            return Ok(None);
        };
        let (Some(first_date), Some(ceiling_date), Some(date)) =
            (first.date(), ceiling.date(), current.date())
        else {
            return Ok(None);
        };

        let candidate = match unit {
            Granularity::Year => NaiveDate::from_ymd_opt(current.year - 1, 12, 31),
            Granularity::Month => date.with_day(1).and_then(|day| day.pred_opt()),
            Granularity::Index | Granularity::Day => date.pred_opt(),
            Granularity::Part => {
                let count = self.index.day_count(date)?;
                let part = current.part.saturating_sub(1).min(count);
                if part > 0 && date >= first_date {
                    return Ok(Some(current.with_part(part).min(ceiling)));
                }
                date.pred_opt()
            }
        };
        let Some(candidate) = candidate else {
            return Ok(None);
        };

        let start = candidate.min(ceiling_date);
        let found = DayWalk::new(self.index, start, first_date, Direction::Backward)
            .next()
            .transpose()?
            .map(|day| settle(&day, unit, Direction::Backward).max(first));
        debug!("previous {unit:?} of {current}: {found:?}");

        Ok(found)
    }

    /// Nearest populated address one unit after `current`.
    ///
    /// Year and month results point at the first day of their unit, day
    /// results at part 1, and part results at part 1 of their day. Results
    /// never precede the first entry.
    ///
    /// # Errors
    ///
    /// - Return error of index if a day on the way cannot be loaded.
    pub fn next(
        &self,
        current: DateAddress,
        unit: Granularity,
    ) -> Result<Option<DateAddress>, I::Error> {
        let (Some(first), Some(ceiling)) = (self.first, self.ceiling) else {
            return Ok(None);
        };
        let (Some(first_date), Some(ceiling_date), Some(date)) =
            (first.date(), ceiling.date(), current.date())
        else {
            return Ok(None);
        };

        let candidate = match unit {
            Granularity::Year => NaiveDate::from_ymd_opt(current.year + 1, 1, 1),
            Granularity::Month => first_of_next_month(date),
            Granularity::Index | Granularity::Day => date.succ_opt(),
            Granularity::Part => {
                let count = self.index.day_count(date)?;
                let next = current.with_part(current.part.saturating_add(1));
                if next.part <= count && date >= first_date && next <= ceiling {
                    return Ok(Some(next));
                }
                date.succ_opt()
            }
        };
        let Some(candidate) = candidate else {
            return Ok(None);
        };

        let start = candidate.max(first_date);
        let found = DayWalk::new(self.index, start, ceiling_date, Direction::Forward)
            .next()
            .transpose()?
            .map(|day| settle(&day, unit, Direction::Forward).max(first));
        debug!("next {unit:?} of {current}: {found:?}");

        Ok(found)
    }
}

/// Normalize found day to the granularity navigated by.
fn settle(day: &impl DayRecord, unit: Granularity, direction: Direction) -> DateAddress {
    let date = day.date();
    match unit {
        Granularity::Year => DateAddress::new(date.year(), 1, 1, 1),
        Granularity::Month => DateAddress::new(date.year(), date.month(), 1, 1),
        Granularity::Index | Granularity::Day => DateAddress::from_date(date, 1),
        Granularity::Part => match direction {
            Direction::Forward => DateAddress::from_date(date, 1),
            Direction::Backward => DateAddress::from_date(date, day.count()),
        },
    }
}
