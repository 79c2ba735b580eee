//! Time windows and query date ranges.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Active window of a schedule.
///
/// Overlap between windows uses the half-open test, so windows that only
/// touch at an endpoint do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// ## Summary
    /// Creates a window, requiring `start < end`.
    ///
    /// ## Errors
    /// Returns a validation error when the window is empty or inverted.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// ## Errors
    /// Returns a validation error when `start >= end`.
    pub fn validate(&self) -> CoreResult<()> {
        if self.start >= self.end {
            return Err(CoreError::ValidationError(format!(
                "schedule window start {} must be before end {}",
                self.start, self.end
            )));
        }
        Ok(())
    }

    /// `a.start < b.end AND b.start < a.end`
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    #[must_use]
    pub fn start_date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    #[must_use]
    pub fn end_date(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Wall-clock start time of every occurrence.
    #[must_use]
    pub fn start_time(&self) -> NaiveTime {
        self.start.time()
    }

    /// Wall-clock end time of every occurrence.
    #[must_use]
    pub fn end_time(&self) -> NaiveTime {
        self.end.time()
    }

    /// The calendar days covered by this window.
    #[must_use]
    pub fn dates(&self) -> DateRange {
        DateRange::new(self.start_date(), self.end_date())
    }

    /// Whether any calendar day of the window falls inside `range`.
    #[must_use]
    pub fn intersects(&self, range: DateRange) -> bool {
        !self.dates().intersect(range).is_empty()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Inclusive range of calendar dates used by projection queries.
///
/// A range whose `start` is after its `end` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.start > self.end
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        }
    }

    /// Number of days in the range, zero when empty.
    #[must_use]
    pub fn num_days(self) -> i64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    /// Midnight UTC at the start of the range.
    #[must_use]
    pub fn start_timestamp(self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC on the day after the range ends, or `None` at the end of
    /// the representable calendar.
    #[must_use]
    pub fn end_exclusive_timestamp(self) -> Option<DateTime<Utc>> {
        self.end
            .checked_add_days(Days::new(1))
            .map(|day| day.and_time(NaiveTime::MIN).and_utc())
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}
