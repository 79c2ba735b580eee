//! Postgres mapping for events, schedules and schedule exceptions.
//!
//! Tables are provisioned outside this crate; only the diesel mapping lives
//! here.

pub mod db;
pub mod error;
pub mod model;
