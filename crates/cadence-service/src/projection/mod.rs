//! Projections: concrete occurrences derived on demand from schedules.
//!
//! The read path is `expand` (candidate dates of one schedule) followed by
//! `resolve` (exception overlay), fanned out over schedules by `query`.

pub mod expand;
pub mod query;
pub mod resolve;

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use cadence_core::recurrence::RecurrenceKind;

const TIME_FORMAT: &str = "%H:%M:%S";

/// How a projection relates to its schedule's regular occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectionStatus {
    Normal,
    /// Same date, different times.
    Retimed { start: NaiveTime, end: NaiveTime },
    /// Relocated from `from` to `to`.
    Moved {
        from: NaiveDate,
        to: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    },
}

impl ProjectionStatus {
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for ProjectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("NORMAL"),
            Self::Retimed { start, end } => write!(
                f,
                "MODIFIED: Time {}-{}",
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            ),
            Self::Moved {
                from,
                to,
                start,
                end,
            } => write!(
                f,
                "MODIFIED: Date {from} → {to} Time {}-{}",
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            ),
        }
    }
}

impl Serialize for ProjectionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single concrete calendar occurrence. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub date: NaiveDate,
    pub event_id: Uuid,
    pub schedule_id: Uuid,
    pub event_name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub recurrence_type: RecurrenceKind,
    pub status: ProjectionStatus,
    pub notes: Option<String>,
}

impl Projection {
    /// Ordering used for merged query results.
    #[must_use]
    pub fn cmp_chronological(&self, other: &Self) -> Ordering {
        (self.date, self.start_time, self.end_time, self.schedule_id).cmp(&(
            other.date,
            other.start_time,
            other.end_time,
            other.schedule_id,
        ))
    }
}

/// Stable sort into `(date, start_time, end_time, schedule_id)` order.
pub fn sort_projections(projections: &mut [Projection]) {
    projections.sort_by(Projection::cmp_chronological);
}
