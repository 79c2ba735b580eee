use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::db::schema;

/// Schedule row. `recurrence` holds the JSON form of a `RecurrenceRule`.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::schedule)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(super::event::EventRecord, foreign_key = event_id))]
pub struct ScheduleRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub recurrence: JsonValue,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for creating new schedules
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::schedule)]
pub struct NewScheduleRecord<'a> {
    pub id: Uuid,
    pub event_id: Uuid,
    pub description: Option<&'a str>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub recurrence: JsonValue,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::schedule)]
#[diesel(treat_none_as_null = true)]
pub struct ScheduleChangeset<'a> {
    pub description: Option<&'a str>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub recurrence: JsonValue,
    pub metadata: Option<JsonValue>,
    pub updated_at: DateTime<Utc>,
}
