//! Calendar span covered by the daily series.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;

/// A run of calendar days from `start` to `end`.
///
/// With `end_inclusive` the last day is part of the span; otherwise the span
/// is half-open and `end` itself has no slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub end_inclusive: bool,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate, end_inclusive: bool) -> Self {
        Self {
            start,
            end,
            end_inclusive,
        }
    }

    /// Span from the earliest to the latest of `dates`.
    pub fn covering<I>(dates: I, end_inclusive: bool) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for d in dates {
            bounds = Some(match bounds {
                None => (d, d),
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
            });
        }
        let (start, end) = bounds.ok_or(LedgerError::EmptyLedger)?;
        Ok(Self::new(start, end, end_inclusive))
    }

    /// Number of day slots.
    pub fn len_days(&self) -> usize {
        let diff = (self.end - self.start).num_days();
        let n = if self.end_inclusive { diff + 1 } else { diff };
        n.max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len_days() == 0
    }

    /// Slot index for `date`, or `None` when the date has no slot.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if date < self.start {
            return None;
        }
        let idx = (date - self.start).num_days() as usize;
        (idx < self.len_days()).then_some(idx)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.index_of(date).is_some()
    }

    /// Every day with a slot, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.len_days()).map(move |i| self.start + Duration::days(i as i64))
    }
}

impl fmt::Display for DateSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = if self.end_inclusive { "..=" } else { ".." };
        write!(f, "{}{}{}", self.start, op, self.end)
    }
}
