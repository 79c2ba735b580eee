//! Query composition for `schedule`.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::{event, schedule};
use crate::model::schedule::{NewScheduleRecord, ScheduleChangeset, ScheduleRecord};

/// ## Summary
/// Returns a query to select all schedules.
#[must_use]
pub fn all() -> schedule::BoxedQuery<'static, diesel::pg::Pg> {
    schedule::table.into_boxed()
}

/// ## Summary
/// Returns a query to find the schedules of one event.
#[must_use]
pub fn by_event(event_id: Uuid) -> schedule::BoxedQuery<'static, diesel::pg::Pg> {
    all().filter(schedule::event_id.eq(event_id))
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<ScheduleRecord>> {
    schedule::table
        .find(id)
        .select(ScheduleRecord::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Summary
/// Lists the schedules of an event ordered by window start.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_event(
    conn: &mut DbConnection<'_>,
    event_id: Uuid,
) -> QueryResult<Vec<ScheduleRecord>> {
    by_event(event_id)
        .order((schedule::start_at.asc(), schedule::id.asc()))
        .select(ScheduleRecord::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads schedules whose window touches `[range_start, range_end_exclusive)`,
/// paired with the owning event's name.
///
/// `range_end_exclusive = None` leaves the range open-ended.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn load_intersecting(
    conn: &mut DbConnection<'_>,
    event_id: Option<Uuid>,
    range_start: DateTime<Utc>,
    range_end_exclusive: Option<DateTime<Utc>>,
) -> QueryResult<Vec<(ScheduleRecord, String)>> {
    let mut query = schedule::table
        .inner_join(event::table)
        .filter(schedule::end_at.ge(range_start))
        .select((ScheduleRecord::as_select(), event::name))
        .order((schedule::start_at.asc(), schedule::id.asc()))
        .into_boxed();

    if let Some(end) = range_end_exclusive {
        query = query.filter(schedule::start_at.lt(end));
    }
    if let Some(event_id) = event_id {
        query = query.filter(schedule::event_id.eq(event_id));
    }

    query.load::<(ScheduleRecord, String)>(conn).await
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    row: &NewScheduleRecord<'_>,
) -> QueryResult<ScheduleRecord> {
    diesel::insert_into(schedule::table)
        .values(row)
        .returning(ScheduleRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails or the schedule is gone.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &ScheduleChangeset<'_>,
) -> QueryResult<ScheduleRecord> {
    diesel::update(schedule::table.find(id))
        .set(changes)
        .returning(ScheduleRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn ids_for_event(conn: &mut DbConnection<'_>, event_id: Uuid) -> QueryResult<Vec<Uuid>> {
    by_event(event_id).select(schedule::id).load(conn).await
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(schedule::table.find(id)).execute(conn).await
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_for_event(conn: &mut DbConnection<'_>, event_id: Uuid) -> QueryResult<usize> {
    diesel::delete(schedule::table.filter(schedule::event_id.eq(event_id)))
        .execute(conn)
        .await
}
