//! Resolution of the two consecutive comparison weeks.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::EngineError;

pub const WINDOW_DAYS: i64 = 7;
/// Days covered by both windows together.
pub const SPAN_DAYS: usize = 14;

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        let len = (self.end - self.start).num_days() + 1;
        (0..len.max(0)).map(move |offset| start + Duration::days(offset))
    }
}

/// Week 1 immediately precedes week 2; week 2 ends on the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowPair {
    pub week1: DateRange,
    pub week2: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Week {
    One,
    Two,
}

impl WindowPair {
    /// Windows for `anchor` without any validation.
    pub fn ending_on(anchor: NaiveDate) -> Self {
        let week2_end = anchor;
        let week2_start = week2_end - Duration::days(WINDOW_DAYS - 1);
        let week1_end = week2_start - Duration::days(1);
        let week1_start = week1_end - Duration::days(WINDOW_DAYS - 1);
        Self {
            week1: DateRange {
                start: week1_start,
                end: week1_end,
            },
            week2: DateRange {
                start: week2_start,
                end: week2_end,
            },
        }
    }

    /// The whole 14-day span, week 1 first.
    pub fn span(&self) -> DateRange {
        DateRange {
            start: self.week1.start,
            end: self.week2.end,
        }
    }

    pub fn week_of(&self, date: NaiveDate) -> Option<Week> {
        if self.week1.contains(date) {
            Some(Week::One)
        } else if self.week2.contains(date) {
            Some(Week::Two)
        } else {
            None
        }
    }

    /// Position of `date` inside [`Self::span`], 0..14.
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        let offset = (date - self.week1.start).num_days();
        usize::try_from(offset).ok().filter(|idx| *idx < SPAN_DAYS)
    }
}

/// Range of anchor dates that leave two full weeks of history, or `None` when
/// the dataset covers fewer than 14 days.
pub fn valid_anchor_range(min: NaiveDate, max: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = first_anchor(min)?;
    (first <= max).then_some((first, max))
}

fn first_anchor(min: NaiveDate) -> Option<NaiveDate> {
    min.checked_add_signed(Duration::days(SPAN_DAYS as i64 - 1))
}

/// Resolve and validate the comparison windows for `anchor` against the
/// dataset's `(min, max)` date range.
pub fn resolve_windows(
    anchor: NaiveDate,
    date_range: Option<(NaiveDate, NaiveDate)>,
) -> Result<WindowPair, EngineError> {
    let (min, max) = date_range.ok_or(EngineError::NoData)?;
    // Checked before any date arithmetic on `anchor`, which may be any
    // parseable date.
    let first = first_anchor(min);
    if first.map_or(true, |first| anchor < first) || anchor > max {
        return Err(EngineError::InsufficientHistory {
            anchor,
            min_anchor: first.unwrap_or(NaiveDate::MAX),
            max_anchor: max,
        });
    }
    Ok(WindowPair::ending_on(anchor))
}
