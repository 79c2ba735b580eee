//! Conversion between database rows and `cadence-core` records.

pub mod event;
pub mod exception;
pub mod schedule;
