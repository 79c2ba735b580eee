//! Core domain types for the cadence recurrence engine.
//!
//! Nothing in this crate touches a database: it defines recurrence rules,
//! time windows, the event/schedule/exception records and the errors raised
//! while validating them.

pub mod config;
pub mod error;
pub mod model;
pub mod recurrence;
pub mod window;
