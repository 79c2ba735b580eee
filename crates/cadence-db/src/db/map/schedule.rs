use chrono::{DateTime, Utc};
use uuid::Uuid;

use cadence_core::model::{NewSchedule, Schedule};
use cadence_core::recurrence::RecurrenceRule;
use cadence_core::window::TimeWindow;

use crate::error::{DbError, DbResult};
use crate::model::schedule::{NewScheduleRecord, ScheduleChangeset, ScheduleRecord};

impl TryFrom<ScheduleRecord> for Schedule {
    type Error = DbError;

    fn try_from(row: ScheduleRecord) -> DbResult<Self> {
        let rule: RecurrenceRule =
            serde_json::from_value(row.recurrence).map_err(|e| DbError::MalformedRow {
                table: "schedule",
                reason: format!("schedule {} has an invalid recurrence: {e}", row.id),
            })?;

        Ok(Self {
            id: row.id,
            event_id: row.event_id,
            description: row.description,
            window: TimeWindow {
                start: row.start_at,
                end: row.end_at,
            },
            rule,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// ## Summary
/// Builds the insert row for a new schedule.
///
/// ## Errors
/// Returns an error if the recurrence rule cannot be serialized.
pub fn build_new_schedule(
    new: &NewSchedule,
    id: Uuid,
    now: DateTime<Utc>,
) -> DbResult<NewScheduleRecord<'_>> {
    Ok(NewScheduleRecord {
        id,
        event_id: new.event_id,
        description: new.description.as_deref(),
        start_at: new.window.start,
        end_at: new.window.end,
        recurrence: serde_json::to_value(new.rule)?,
        metadata: new.metadata.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// ## Summary
/// Builds a changeset writing every mutable column of `schedule`.
///
/// ## Errors
/// Returns an error if the recurrence rule cannot be serialized.
pub fn build_schedule_changeset(
    schedule: &Schedule,
    now: DateTime<Utc>,
) -> DbResult<ScheduleChangeset<'_>> {
    Ok(ScheduleChangeset {
        description: schedule.description.as_deref(),
        start_at: schedule.window.start,
        end_at: schedule.window.end,
        recurrence: serde_json::to_value(schedule.rule)?,
        metadata: schedule.metadata.clone(),
        updated_at: now,
    })
}
