//! Event lifecycle.

use uuid::Uuid;

use cadence_core::model::{Event, EventUpdate, NewEvent};

use crate::error::{ServiceError, ServiceResult};
use crate::store::ScheduleStore;

/// ## Summary
/// Creates an event. The status defaults to `active`.
///
/// ## Errors
/// Returns `ValidationError` if the name is blank.
#[tracing::instrument(skip(store, new), fields(name = %new.name))]
pub async fn create_event<S: ScheduleStore>(store: &S, new: NewEvent) -> ServiceResult<Event> {
    new.validate()?;
    let event = store.insert_event(new).await?;
    tracing::info!(event_id = %event.id, "Event created");
    Ok(event)
}

/// ## Errors
/// Returns `NotFound` when the event does not exist.
pub async fn get_event<S: ScheduleStore>(store: &S, id: Uuid) -> ServiceResult<Event> {
    store
        .get_event(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {id}")))
}

/// ## Errors
/// Returns an error if the store read fails.
pub async fn list_events<S: ScheduleStore>(store: &S) -> ServiceResult<Vec<Event>> {
    store.list_events().await
}

/// ## Errors
/// Returns `NotFound` or `ValidationError`.
#[tracing::instrument(skip(store, update))]
pub async fn update_event<S: ScheduleStore>(
    store: &S,
    id: Uuid,
    update: EventUpdate,
) -> ServiceResult<Event> {
    let event = store.update_event(id, update).await?;
    tracing::debug!(status = %event.status, "Event updated");
    Ok(event)
}

/// ## Summary
/// Deletes an event with its schedules and their exceptions.
///
/// ## Errors
/// Returns `NotFound` when the event does not exist.
#[tracing::instrument(skip(store))]
pub async fn delete_event<S: ScheduleStore>(store: &S, id: Uuid) -> ServiceResult<()> {
    store.delete_event(id).await?;
    tracing::info!("Event deleted");
    Ok(())
}
