//! Query composition for `event`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::event;
use crate::model::event::{EventChangeset, EventRecord, NewEventRecord};

/// ## Summary
/// Returns a query to select all events.
#[must_use]
pub fn all() -> event::BoxedQuery<'static, diesel::pg::Pg> {
    event::table.into_boxed()
}

/// ## Summary
/// Returns a query to find an event by ID.
#[must_use]
pub fn by_id(id: Uuid) -> event::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(event::id.eq(id))
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<EventRecord>> {
    by_id(id)
        .select(EventRecord::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists every event, oldest first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list(conn: &mut DbConnection<'_>) -> QueryResult<Vec<EventRecord>> {
    all()
        .order((event::created_at.asc(), event::id.asc()))
        .select(EventRecord::as_select())
        .load(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(conn: &mut DbConnection<'_>, row: &NewEventRecord<'_>) -> QueryResult<EventRecord> {
    diesel::insert_into(event::table)
        .values(row)
        .returning(EventRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails or the event is gone.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &EventChangeset<'_>,
) -> QueryResult<EventRecord> {
    diesel::update(event::table.find(id))
        .set(changes)
        .returning(EventRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Deletes the event row only; callers remove dependents first.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(event::table.find(id)).execute(conn).await
}
