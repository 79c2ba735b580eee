use chrono::{DateTime, Utc};
use uuid::Uuid;

use cadence_core::model::{Event, NewEvent};

use crate::model::event::{EventChangeset, EventRecord, NewEventRecord};

impl From<EventRecord> for Event {
    fn from(row: EventRecord) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            priority: row.priority,
            status: row.status,
            metadata: row.metadata,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// ## Summary
/// Builds the insert row for a new event.
#[must_use]
pub fn build_new_event(new: &NewEvent, id: Uuid, now: DateTime<Utc>) -> NewEventRecord<'_> {
    NewEventRecord {
        id,
        name: &new.name,
        description: new.description.as_deref(),
        category: new.category.as_deref(),
        priority: new.priority,
        status: new.status_or_default(),
        metadata: new.metadata.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// ## Summary
/// Builds a changeset writing every mutable column of `event`.
#[must_use]
pub fn build_event_changeset(event: &Event, now: DateTime<Utc>) -> EventChangeset<'_> {
    EventChangeset {
        name: &event.name,
        description: event.description.as_deref(),
        category: event.category.as_deref(),
        priority: event.priority,
        status: &event.status,
        metadata: event.metadata.clone(),
        updated_at: now,
    }
}
