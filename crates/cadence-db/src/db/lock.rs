//! Per-event write serialization.
//!
//! Schedule writes lock the owning event row with `SELECT ... FOR UPDATE`
//! before reading sibling schedules. Two writers for the same event then
//! run their overlap check and write one after the other; writers for
//! different events do not contend.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::event;
use crate::model::event::EventRecord;

/// ## Summary
/// Locks the event row until the surrounding transaction ends.
///
/// ## Returns
/// The locked event, or `None` when the event does not exist.
///
/// ## Errors
/// Returns a database error if the query fails.
#[tracing::instrument(skip(conn))]
pub async fn lock_event(
    conn: &mut DbConnection<'_>,
    event_id: Uuid,
) -> QueryResult<Option<EventRecord>> {
    let locked = event::table
        .find(event_id)
        .select(EventRecord::as_select())
        .for_update()
        .first(conn)
        .await
        .optional()?;
    tracing::trace!(found = locked.is_some(), "Event row lock acquired");
    Ok(locked)
}
