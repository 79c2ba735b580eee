//! Overlap guard for schedules of one event.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cadence_core::model::Schedule;
use cadence_core::window::TimeWindow;

use crate::error::{ServiceError, ServiceResult};
use crate::store::ScheduleStore;

/// First sibling whose window overlaps `candidate`, skipping `exclude`.
#[must_use]
pub fn find_conflict<'a>(
    siblings: &'a [Schedule],
    candidate: &TimeWindow,
    exclude: Option<Uuid>,
) -> Option<&'a Schedule> {
    siblings
        .iter()
        .filter(|sibling| Some(sibling.id) != exclude)
        .find(|sibling| sibling.window.overlaps(candidate))
}

/// ## Summary
/// Rejects `candidate` if it overlaps any sibling other than `exclude`.
///
/// Callers must hold the event's write lock while `siblings` is read and
/// until the write that follows commits.
///
/// ## Errors
/// Returns `SchedulingConflict` naming the first overlapping schedule.
pub fn ensure_no_overlap(
    event_id: Uuid,
    siblings: &[Schedule],
    candidate: &TimeWindow,
    exclude: Option<Uuid>,
) -> ServiceResult<()> {
    match find_conflict(siblings, candidate, exclude) {
        None => Ok(()),
        Some(existing) => {
            tracing::warn!(
                %event_id,
                conflicting_schedule_id = %existing.id,
                window = %candidate,
                "Rejected overlapping schedule window"
            );
            Err(ServiceError::SchedulingConflict {
                event_id,
                start: candidate.start,
                end: candidate.end,
                conflicting_schedule_id: existing.id,
                conflicting_start: existing.window.start,
                conflicting_end: existing.window.end,
            })
        }
    }
}

/// ## Summary
/// Reports whether `[start, end)` would overlap an existing schedule of the
/// event, ignoring `exclude`.
///
/// Advisory only: the answer can be stale by the time a write runs. Writes
/// are guarded again inside the store.
///
/// ## Errors
/// Returns an error if the schedules cannot be read.
#[tracing::instrument(skip(store))]
pub async fn check_schedule_overlap<S: ScheduleStore>(
    store: &S,
    event_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    exclude: Option<Uuid>,
) -> ServiceResult<bool> {
    let siblings = store.list_schedules(event_id).await?;
    let candidate = TimeWindow { start, end };
    let conflict = find_conflict(&siblings, &candidate, exclude);
    tracing::debug!(overlaps = conflict.is_some(), "Checked schedule overlap");
    Ok(conflict.is_some())
}
