//! Moving an event onto a new recurrence configuration.

use serde_json::Value as JsonValue;
use uuid::Uuid;

use cadence_core::model::NewSchedule;
use cadence_core::recurrence::RecurrenceRule;
use cadence_core::window::TimeWindow;

use crate::error::ServiceResult;
use crate::store::ScheduleStore;

/// Parameters of a schedule transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub event_id: Uuid,
    pub window: TimeWindow,
    pub rule: RecurrenceRule,
    pub description: Option<String>,
    pub metadata: Option<JsonValue>,
}

impl TransitionRequest {
    #[must_use]
    pub const fn new(event_id: Uuid, window: TimeWindow, rule: RecurrenceRule) -> Self {
        Self {
            event_id,
            window,
            rule,
            description: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl From<TransitionRequest> for NewSchedule {
    fn from(request: TransitionRequest) -> Self {
        Self {
            event_id: request.event_id,
            description: request.description,
            window: request.window,
            rule: request.rule,
            metadata: request.metadata,
        }
    }
}

/// ## Summary
/// Atomically checks the new window against the event's schedules and
/// creates the schedule.
///
/// Existing schedules are left untouched. Callers end the previous schedule
/// first; a previous window reaching into the new one makes the transition
/// fail.
///
/// ## Errors
/// Returns `NotFound` for an unknown event, `ValidationError` for a
/// malformed request and `SchedulingConflict` on overlap. A failed
/// transition writes nothing.
#[tracing::instrument(skip(store, request), fields(event_id = %request.event_id, window = %request.window))]
pub async fn transition_event_schedule<S: ScheduleStore>(
    store: &S,
    request: TransitionRequest,
) -> ServiceResult<Uuid> {
    let new = NewSchedule::from(request);
    new.validate()?;
    match store.insert_schedule(new).await {
        Ok(schedule) => {
            tracing::info!(schedule_id = %schedule.id, "Event transitioned to new schedule");
            Ok(schedule.id)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Schedule transition rejected");
            Err(err)
        }
    }
}
