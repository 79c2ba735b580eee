//! Transaction helpers for schedule reads and writes.
//!
//! Writes use diesel-async's `AsyncConnection::transaction` directly, taking
//! the per-event lock (see [`crate::db::lock`]) as their first statement:
//!
//! ```rust,ignore
//! use diesel_async::scoped_futures::ScopedFutureExt;
//!
//! conn.transaction::<_, ServiceError, _>(|tx| async move {
//!     lock::lock_event(tx, event_id).await?;
//!     // overlap check + write
//!     Ok(())
//! }.scope_boxed()).await?;
//! ```
//!
//! Projection reads call [`begin_snapshot`] first so schedules and their
//! exceptions are observed from one snapshot.

use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;

/// ## Summary
/// Switches the current transaction to a read-only repeatable-read snapshot.
///
/// Must be the first statement executed in the transaction.
///
/// ## Errors
/// Returns an error if the statement fails, e.g. when a query already ran.
pub async fn begin_snapshot(conn: &mut DbConnection<'_>) -> diesel::QueryResult<()> {
    diesel::sql_query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(conn)
        .await?;
    Ok(())
}
