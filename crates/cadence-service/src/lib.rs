//! Recurrence projection engine.
//!
//! Expands schedules into occurrences, overlays per-date exceptions and
//! guards schedule writes against overlapping windows. Storage goes through
//! the [`store::ScheduleStore`] seam.

pub mod error;
pub mod event;
pub mod exception;
pub mod projection;
pub mod schedule;
pub mod store;
