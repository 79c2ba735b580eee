pub mod event;
pub mod exception;
pub mod schedule;
