//! Per-date overrides of a schedule: cancellations, retimes and moves.

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use cadence_core::model::{ExceptionUpdate, NewException, ScheduleException};

use crate::error::{ServiceError, ServiceResult};
use crate::store::ScheduleStore;

/// ## Summary
/// Validates and stores an exception.
///
/// ## Errors
/// Returns `ValidationError` for a malformed exception, `NotFound` for an
/// unknown schedule and `Conflict` when the date already has an exception.
#[tracing::instrument(skip(store, new), fields(schedule_id = %new.schedule_id, date = %new.exception_date, kind = %new.kind))]
pub async fn create_exception<S: ScheduleStore>(
    store: &S,
    new: NewException,
) -> ServiceResult<ScheduleException> {
    if let Err(err) = new.validate() {
        tracing::warn!(error = %err, "Rejected invalid exception");
        return Err(err.into());
    }
    let exception = store.insert_exception(new).await?;
    tracing::debug!(exception_id = %exception.id, "Exception created");
    Ok(exception)
}

/// ## Errors
/// Returns `NotFound` when the exception does not exist.
pub async fn get_exception<S: ScheduleStore>(
    store: &S,
    id: Uuid,
) -> ServiceResult<ScheduleException> {
    store
        .get_exception(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("exception {id}")))
}

/// ## Errors
/// Returns an error if the store read fails.
pub async fn list_exceptions<S: ScheduleStore>(
    store: &S,
    schedule_id: Uuid,
) -> ServiceResult<Vec<ScheduleException>> {
    store.list_exceptions(schedule_id).await
}

/// ## Errors
/// Returns `NotFound` or `ValidationError` for a malformed merged exception.
#[tracing::instrument(skip(store, update))]
pub async fn update_exception<S: ScheduleStore>(
    store: &S,
    id: Uuid,
    update: ExceptionUpdate,
) -> ServiceResult<ScheduleException> {
    store.update_exception(id, update).await
}

/// ## Errors
/// Returns `NotFound` when the exception does not exist.
#[tracing::instrument(skip(store))]
pub async fn delete_exception<S: ScheduleStore>(store: &S, id: Uuid) -> ServiceResult<()> {
    store.delete_exception(id).await
}

/// ## Summary
/// Cancels the occurrence on `date`.
///
/// ## Errors
/// See [`create_exception`].
pub async fn cancel_occurrence<S: ScheduleStore>(
    store: &S,
    schedule_id: Uuid,
    date: NaiveDate,
    notes: Option<String>,
) -> ServiceResult<ScheduleException> {
    let mut new = NewException::cancel(schedule_id, date);
    new.notes = notes;
    create_exception(store, new).await
}

/// ## Summary
/// Keeps the occurrence on `date` but changes its times. A missing bound
/// keeps the schedule's own time.
///
/// ## Errors
/// See [`create_exception`].
pub async fn retime_occurrence<S: ScheduleStore>(
    store: &S,
    schedule_id: Uuid,
    date: NaiveDate,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    notes: Option<String>,
) -> ServiceResult<ScheduleException> {
    let mut new = NewException::retime(schedule_id, date, start, end);
    new.notes = notes;
    create_exception(store, new).await
}

/// ## Summary
/// Relocates the occurrence on `from` to `to`, optionally with new times.
///
/// ## Errors
/// See [`create_exception`].
pub async fn move_occurrence<S: ScheduleStore>(
    store: &S,
    schedule_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    notes: Option<String>,
) -> ServiceResult<ScheduleException> {
    let mut new = NewException::relocate(schedule_id, from, to).with_times(start, end);
    new.notes = notes;
    create_exception(store, new).await
}
