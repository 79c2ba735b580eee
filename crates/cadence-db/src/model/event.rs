use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::db::schema;

/// Event row
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::event)]
#[diesel(check_for_backend(Pg))]
pub struct EventRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<i32>,
    pub status: String,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for creating new events
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::event)]
pub struct NewEventRecord<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub priority: Option<i32>,
    pub status: &'a str,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full-row changeset; `None` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::event)]
#[diesel(treat_none_as_null = true)]
pub struct EventChangeset<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub priority: Option<i32>,
    pub status: &'a str,
    pub metadata: Option<JsonValue>,
    pub updated_at: DateTime<Utc>,
}
