//! Schedule lifecycle. Every write path goes through the store, which runs
//! the overlap guard under the event lock.

pub mod guard;
pub mod transition;

use uuid::Uuid;

use cadence_core::model::{NewSchedule, Schedule, ScheduleUpdate};

use crate::error::{ServiceError, ServiceResult};
use crate::store::ScheduleStore;

/// ## Summary
/// Validates and inserts a schedule.
///
/// ## Errors
/// Returns `ValidationError` for a malformed window or rule,
/// `NotFound` for an unknown event, and `SchedulingConflict` when the
/// window overlaps a sibling schedule.
#[tracing::instrument(skip(store, new), fields(event_id = %new.event_id))]
pub async fn create_schedule<S: ScheduleStore>(
    store: &S,
    new: NewSchedule,
) -> ServiceResult<Schedule> {
    if let Err(err) = new.validate() {
        tracing::warn!(error = %err, "Rejected invalid schedule");
        return Err(err.into());
    }
    let schedule = store.insert_schedule(new).await?;
    tracing::info!(schedule_id = %schedule.id, window = %schedule.window, "Schedule created");
    Ok(schedule)
}

/// ## Errors
/// Returns `NotFound` when the schedule does not exist.
pub async fn get_schedule<S: ScheduleStore>(store: &S, id: Uuid) -> ServiceResult<Schedule> {
    store
        .get_schedule(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("schedule {id}")))
}

/// ## Summary
/// Lists an event's schedules ordered by window start. Unknown events have
/// no schedules.
///
/// ## Errors
/// Returns an error if the store read fails.
pub async fn list_schedules<S: ScheduleStore>(
    store: &S,
    event_id: Uuid,
) -> ServiceResult<Vec<Schedule>> {
    store.list_schedules(event_id).await
}

/// ## Summary
/// Applies a partial update. Changing the window re-runs the overlap guard
/// against every other schedule of the event.
///
/// ## Errors
/// Returns `ValidationError`, `NotFound` or `SchedulingConflict`.
#[tracing::instrument(skip(store, update))]
pub async fn update_schedule<S: ScheduleStore>(
    store: &S,
    id: Uuid,
    update: ScheduleUpdate,
) -> ServiceResult<Schedule> {
    if let Some(window) = &update.window {
        window.validate()?;
    }
    if let Some(rule) = &update.rule {
        rule.validate()?;
    }
    let schedule = store.update_schedule(id, update).await?;
    tracing::info!(window = %schedule.window, "Schedule updated");
    Ok(schedule)
}

/// ## Summary
/// Deletes a schedule together with its exceptions.
///
/// ## Errors
/// Returns `NotFound` when the schedule does not exist.
#[tracing::instrument(skip(store))]
pub async fn delete_schedule<S: ScheduleStore>(store: &S, id: Uuid) -> ServiceResult<()> {
    store.delete_schedule(id).await?;
    tracing::info!("Schedule deleted");
    Ok(())
}
