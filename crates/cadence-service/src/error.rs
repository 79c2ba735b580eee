use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use cadence_core::error::CoreError;
use cadence_db::error::DbError;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(CoreError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(
        "Scheduling conflict: event {event_id} window [{start}, {end}) overlaps schedule {conflicting_schedule_id} [{conflicting_start}, {conflicting_end})"
    )]
    SchedulingConflict {
        event_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        conflicting_schedule_id: Uuid,
        conflicting_start: DateTime<Utc>,
        conflicting_end: DateTime<Utc>,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),

    #[error("Diesel error: {0}")]
    DieselError(#[from] diesel::result::Error),
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ValidationError(msg) => Self::ValidationError(msg),
            CoreError::NotFound(msg) => Self::NotFound(msg),
            CoreError::InvariantViolation(msg) => Self::InvariantViolation(msg),
            other @ CoreError::InvalidConfiguration(_) => Self::CoreError(other),
        }
    }
}

impl ServiceError {
    #[must_use]
    pub const fn is_scheduling_conflict(&self) -> bool {
        matches!(self, Self::SchedulingConflict { .. })
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
