//! The projection read path.

use uuid::Uuid;

use cadence_core::window::DateRange;

use super::resolve::ExceptionResolver;
use super::{Projection, sort_projections};
use crate::error::ServiceResult;
use crate::store::{ProjectionSnapshot, ScheduleStore, SnapshotScope};

/// ## Summary
/// Projections of one event over `range`, ordered by date and time.
///
/// Unknown events and empty or non-intersecting ranges yield an empty list.
///
/// ## Errors
/// Returns an error if the snapshot cannot be read.
#[tracing::instrument(skip(store), fields(range = %range))]
pub async fn get_event_projections<S: ScheduleStore>(
    store: &S,
    event_id: Uuid,
    range: DateRange,
) -> ServiceResult<Vec<Projection>> {
    load_and_project(store, SnapshotScope::Event(event_id), range).await
}

/// ## Summary
/// Projections of every event over `range`, annotated with event names.
///
/// ## Errors
/// Returns an error if the snapshot cannot be read.
#[tracing::instrument(skip(store), fields(range = %range))]
pub async fn get_events_detailed<S: ScheduleStore>(
    store: &S,
    range: DateRange,
) -> ServiceResult<Vec<Projection>> {
    load_and_project(store, SnapshotScope::AllEvents, range).await
}

async fn load_and_project<S: ScheduleStore>(
    store: &S,
    scope: SnapshotScope,
    range: DateRange,
) -> ServiceResult<Vec<Projection>> {
    if range.is_empty() {
        return Ok(Vec::new());
    }
    let snapshot = store.load_snapshot(scope, range).await?;
    let projections = project_snapshot(&snapshot, range);
    tracing::debug!(
        schedules = snapshot.schedules.len(),
        projections = projections.len(),
        "Projections resolved"
    );
    Ok(projections)
}

/// Resolves every schedule of `snapshot` over `range` and merges the results
/// in `(date, start_time, end_time, schedule_id)` order.
#[must_use]
pub fn project_snapshot(snapshot: &ProjectionSnapshot, range: DateRange) -> Vec<Projection> {
    let mut projections: Vec<Projection> = snapshot
        .schedules
        .iter()
        .filter(|entry| entry.schedule.window.intersects(range))
        .flat_map(|entry| {
            ExceptionResolver::new(
                &entry.schedule,
                &entry.event_name,
                snapshot.exceptions_for(entry.schedule.id),
            )
            .resolve(range)
        })
        .collect();
    sort_projections(&mut projections);
    projections
}
