//! Query composition for `schedule_exception`.

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::schema::schedule_exception;
use crate::model::exception::{ExceptionChangeset, ExceptionRecord, NewExceptionRecord};

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn get(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<Option<ExceptionRecord>> {
    schedule_exception::table
        .find(id)
        .select(ExceptionRecord::as_select())
        .first(conn)
        .await
        .optional()
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_schedule(
    conn: &mut DbConnection<'_>,
    schedule_id: Uuid,
) -> QueryResult<Vec<ExceptionRecord>> {
    schedule_exception::table
        .filter(schedule_exception::schedule_id.eq(schedule_id))
        .order(schedule_exception::exception_date.asc())
        .select(ExceptionRecord::as_select())
        .load(conn)
        .await
}

/// ## Summary
/// Loads the exceptions of several schedules at once.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn list_for_schedules(
    conn: &mut DbConnection<'_>,
    schedule_ids: &[Uuid],
) -> QueryResult<Vec<ExceptionRecord>> {
    if schedule_ids.is_empty() {
        return Ok(Vec::new());
    }

    schedule_exception::table
        .filter(schedule_exception::schedule_id.eq_any(schedule_ids))
        .order((
            schedule_exception::schedule_id.asc(),
            schedule_exception::exception_date.asc(),
        ))
        .select(ExceptionRecord::as_select())
        .load(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails, including a unique
/// violation on `(schedule_id, exception_date)`.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    row: &NewExceptionRecord<'_>,
) -> QueryResult<ExceptionRecord> {
    diesel::insert_into(schedule_exception::table)
        .values(row)
        .returning(ExceptionRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails or the exception is gone.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &ExceptionChangeset<'_>,
) -> QueryResult<ExceptionRecord> {
    diesel::update(schedule_exception::table.find(id))
        .set(changes)
        .returning(ExceptionRecord::as_returning())
        .get_result(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::delete(schedule_exception::table.find(id))
        .execute(conn)
        .await
}

/// ## Errors
/// Returns an error if the database operation fails.
pub async fn delete_for_schedules(
    conn: &mut DbConnection<'_>,
    schedule_ids: &[Uuid],
) -> QueryResult<usize> {
    if schedule_ids.is_empty() {
        return Ok(0);
    }

    diesel::delete(
        schedule_exception::table.filter(schedule_exception::schedule_id.eq_any(schedule_ids)),
    )
    .execute(conn)
    .await
}
