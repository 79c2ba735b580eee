use chrono::{DateTime, Utc};
use uuid::Uuid;

use cadence_core::model::{NewException, ScheduleException};

use crate::model::exception::{ExceptionChangeset, ExceptionRecord, NewExceptionRecord};

impl From<ExceptionRecord> for ScheduleException {
    fn from(row: ExceptionRecord) -> Self {
        Self {
            id: row.id,
            schedule_id: row.schedule_id,
            exception_date: row.exception_date,
            kind: row.exception_type.into(),
            modified_date: row.modified_date,
            modified_start: row.modified_start,
            modified_end: row.modified_end,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[must_use]
pub fn build_new_exception(
    new: &NewException,
    id: Uuid,
    now: DateTime<Utc>,
) -> NewExceptionRecord<'_> {
    NewExceptionRecord {
        id,
        schedule_id: new.schedule_id,
        exception_date: new.exception_date,
        exception_type: new.kind.into(),
        modified_date: new.modified_date,
        modified_start: new.modified_start,
        modified_end: new.modified_end,
        notes: new.notes.as_deref(),
        created_at: now,
        updated_at: now,
    }
}

#[must_use]
pub fn build_exception_changeset(
    exception: &ScheduleException,
    now: DateTime<Utc>,
) -> ExceptionChangeset<'_> {
    ExceptionChangeset {
        exception_type: exception.kind.into(),
        modified_date: exception.modified_date,
        modified_start: exception.modified_start,
        modified_end: exception.modified_end,
        notes: exception.notes.as_deref(),
        updated_at: now,
    }
}
