//! Postgres store built on the `cadence-db` query layer.
//!
//! Every write runs in one transaction. Schedule writes lock the owning
//! event row first, then re-read sibling schedules and run the overlap
//! guard before writing. Projection reads run in a read-only
//! repeatable-read snapshot.

use std::collections::HashMap;

use chrono::Utc;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::AsyncConnection;
use diesel_async::scoped_futures::ScopedFutureExt;
use uuid::Uuid;

use cadence_core::config::Settings;
use cadence_core::model::{
    Event, EventUpdate, ExceptionUpdate, NewEvent, NewException, NewSchedule, Schedule,
    ScheduleException, ScheduleUpdate,
};
use cadence_core::window::DateRange;
use cadence_db::db::DbProvider;
use cadence_db::db::connection::{DbConnection, DbPool, create_pool_from_config};
use cadence_db::db::map::event::{build_event_changeset, build_new_event};
use cadence_db::db::map::exception::{build_exception_changeset, build_new_exception};
use cadence_db::db::map::schedule::{build_new_schedule, build_schedule_changeset};
use cadence_db::db::{lock, query, transaction};

use super::{ProjectionSnapshot, ScheduleStore, SnapshotSchedule, SnapshotScope};
use crate::error::{ServiceError, ServiceResult};
use crate::schedule::guard;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// ## Summary
    /// Builds a connection pool from `settings.database` and wraps it.
    ///
    /// ## Errors
    /// Returns an error if the pool size is invalid or the pool cannot be built.
    pub async fn connect(settings: &Settings) -> ServiceResult<Self> {
        let pool = create_pool_from_config(&settings.database).await?;
        Ok(Self::new(pool))
    }

    #[must_use]
    pub const fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn connection(&self) -> ServiceResult<DbConnection<'_>> {
        Ok(self.pool.get_connection().await?)
    }
}

async fn load_siblings(conn: &mut DbConnection<'_>, event_id: Uuid) -> ServiceResult<Vec<Schedule>> {
    let rows = query::schedule::list_for_event(conn, event_id).await?;
    rows.into_iter()
        .map(|row| Schedule::try_from(row).map_err(ServiceError::from))
        .collect()
}

fn not_found(kind: &str, id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("{kind} {id}"))
}

fn map_exception_write_error(err: DieselError, new: &NewException) -> ServiceError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ServiceError::Conflict(format!(
                "schedule {} already has an exception on {}",
                new.schedule_id, new.exception_date
            ))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            not_found("schedule", new.schedule_id)
        }
        other => other.into(),
    }
}

impl ScheduleStore for PgStore {
    #[tracing::instrument(skip(self, new), fields(name = %new.name))]
    async fn insert_event(&self, new: NewEvent) -> ServiceResult<Event> {
        new.validate()?;
        let mut conn = self.connection().await?;
        let row = build_new_event(&new, Uuid::now_v7(), Utc::now());
        let record = query::event::insert(&mut conn, &row).await?;
        tracing::debug!(event_id = %record.id, "Event inserted");
        Ok(Event::from(record))
    }

    async fn get_event(&self, id: Uuid) -> ServiceResult<Option<Event>> {
        let mut conn = self.connection().await?;
        Ok(query::event::get(&mut conn, id).await?.map(Event::from))
    }

    async fn list_events(&self) -> ServiceResult<Vec<Event>> {
        let mut conn = self.connection().await?;
        let rows = query::event::list(&mut conn).await?;
        Ok(rows.into_iter().map(Event::from).collect())
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_event(&self, id: Uuid, update: EventUpdate) -> ServiceResult<Event> {
        let mut conn = self.connection().await?;
        let record = conn
            .transaction::<_, ServiceError, _>(|tx| {
                async move {
                    let current = lock::lock_event(tx, id)
                        .await?
                        .ok_or_else(|| not_found("event", id))?;
                    let merged = update.apply_to(&Event::from(current))?;
                    let changes = build_event_changeset(&merged, Utc::now());
                    Ok(query::event::update(tx, id, &changes).await?)
                }
                .scope_boxed()
            })
            .await?;
        Ok(Event::from(record))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_event(&self, id: Uuid) -> ServiceResult<()> {
        let mut conn = self.connection().await?;
        conn.transaction::<_, ServiceError, _>(|tx| {
            async move {
                if lock::lock_event(tx, id).await?.is_none() {
                    return Err(not_found("event", id));
                }
                let schedule_ids = query::schedule::ids_for_event(tx, id).await?;
                let exceptions = query::exception::delete_for_schedules(tx, &schedule_ids).await?;
                let schedules = query::schedule::delete_for_event(tx, id).await?;
                query::event::delete(tx, id).await?;
                tracing::debug!(schedules, exceptions, "Event deleted with dependents");
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_schedule(&self, id: Uuid) -> ServiceResult<Option<Schedule>> {
        let mut conn = self.connection().await?;
        query::schedule::get(&mut conn, id)
            .await?
            .map(|row| Schedule::try_from(row).map_err(ServiceError::from))
            .transpose()
    }

    async fn list_schedules(&self, event_id: Uuid) -> ServiceResult<Vec<Schedule>> {
        let mut conn = self.connection().await?;
        load_siblings(&mut conn, event_id).await
    }

    #[tracing::instrument(skip(self, new), fields(event_id = %new.event_id, window = %new.window))]
    async fn insert_schedule(&self, new: NewSchedule) -> ServiceResult<Schedule> {
        new.validate()?;
        let mut conn = self.connection().await?;
        let record = conn
            .transaction::<_, ServiceError, _>(|tx| {
                async move {
                    if lock::lock_event(tx, new.event_id).await?.is_none() {
                        return Err(not_found("event", new.event_id));
                    }
                    let siblings = load_siblings(tx, new.event_id).await?;
                    guard::ensure_no_overlap(new.event_id, &siblings, &new.window, None)?;
                    let row = build_new_schedule(&new, Uuid::now_v7(), Utc::now())?;
                    Ok(query::schedule::insert(tx, &row).await?)
                }
                .scope_boxed()
            })
            .await?;
        tracing::debug!(schedule_id = %record.id, "Schedule inserted");
        Ok(Schedule::try_from(record)?)
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_schedule(&self, id: Uuid, update: ScheduleUpdate) -> ServiceResult<Schedule> {
        let mut conn = self.connection().await?;
        let owner = query::schedule::get(&mut conn, id)
            .await?
            .ok_or_else(|| not_found("schedule", id))?
            .event_id;

        let record = conn
            .transaction::<_, ServiceError, _>(|tx| {
                async move {
                    lock::lock_event(tx, owner).await?;
                    // Re-read under the lock; the schedule may have been removed.
                    let current = query::schedule::get(tx, id)
                        .await?
                        .ok_or_else(|| not_found("schedule", id))?;
                    let merged = update.apply_to(&Schedule::try_from(current)?)?;
                    let siblings = load_siblings(tx, owner).await?;
                    guard::ensure_no_overlap(owner, &siblings, &merged.window, Some(id))?;
                    let changes = build_schedule_changeset(&merged, Utc::now())?;
                    Ok(query::schedule::update(tx, id, &changes).await?)
                }
                .scope_boxed()
            })
            .await?;
        Ok(Schedule::try_from(record)?)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_schedule(&self, id: Uuid) -> ServiceResult<()> {
        let mut conn = self.connection().await?;
        conn.transaction::<_, ServiceError, _>(|tx| {
            async move {
                let ids = [id];
                query::exception::delete_for_schedules(tx, &ids).await?;
                if query::schedule::delete(tx, id).await? == 0 {
                    return Err(not_found("schedule", id));
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    async fn get_exception(&self, id: Uuid) -> ServiceResult<Option<ScheduleException>> {
        let mut conn = self.connection().await?;
        Ok(query::exception::get(&mut conn, id)
            .await?
            .map(ScheduleException::from))
    }

    async fn list_exceptions(&self, schedule_id: Uuid) -> ServiceResult<Vec<ScheduleException>> {
        let mut conn = self.connection().await?;
        let rows = query::exception::list_for_schedule(&mut conn, schedule_id).await?;
        Ok(rows.into_iter().map(ScheduleException::from).collect())
    }

    #[tracing::instrument(skip(self, new), fields(schedule_id = %new.schedule_id, date = %new.exception_date))]
    async fn insert_exception(&self, new: NewException) -> ServiceResult<ScheduleException> {
        new.validate()?;
        let mut conn = self.connection().await?;
        let record = conn
            .transaction::<_, ServiceError, _>(|tx| {
                async move {
                    if query::schedule::get(tx, new.schedule_id).await?.is_none() {
                        return Err(not_found("schedule", new.schedule_id));
                    }
                    let row = build_new_exception(&new, Uuid::now_v7(), Utc::now());
                    query::exception::insert(tx, &row)
                        .await
                        .map_err(|err| map_exception_write_error(err, &new))
                }
                .scope_boxed()
            })
            .await?;
        Ok(ScheduleException::from(record))
    }

    #[tracing::instrument(skip(self, update))]
    async fn update_exception(
        &self,
        id: Uuid,
        update: ExceptionUpdate,
    ) -> ServiceResult<ScheduleException> {
        let mut conn = self.connection().await?;
        let record = conn
            .transaction::<_, ServiceError, _>(|tx| {
                async move {
                    let current = query::exception::get(tx, id)
                        .await?
                        .ok_or_else(|| not_found("exception", id))?;
                    let merged = update.apply_to(&ScheduleException::from(current))?;
                    let changes = build_exception_changeset(&merged, Utc::now());
                    Ok(query::exception::update(tx, id, &changes).await?)
                }
                .scope_boxed()
            })
            .await?;
        Ok(ScheduleException::from(record))
    }

    async fn delete_exception(&self, id: Uuid) -> ServiceResult<()> {
        let mut conn = self.connection().await?;
        if query::exception::delete(&mut conn, id).await? == 0 {
            return Err(not_found("exception", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn load_snapshot(
        &self,
        scope: SnapshotScope,
        range: DateRange,
    ) -> ServiceResult<ProjectionSnapshot> {
        let mut conn = self.connection().await?;
        let (rows, exception_rows) = conn
            .transaction::<_, ServiceError, _>(|tx| {
                async move {
                    transaction::begin_snapshot(tx).await?;
                    let rows = query::schedule::load_intersecting(
                        tx,
                        scope.event_id(),
                        range.start_timestamp(),
                        range.end_exclusive_timestamp(),
                    )
                    .await?;
                    let ids: Vec<Uuid> = rows.iter().map(|(row, _)| row.id).collect();
                    let exception_rows = query::exception::list_for_schedules(tx, &ids).await?;
                    Ok((rows, exception_rows))
                }
                .scope_boxed()
            })
            .await?;

        let mut snapshot = ProjectionSnapshot {
            schedules: Vec::with_capacity(rows.len()),
            exceptions: HashMap::new(),
        };
        for (row, event_name) in rows {
            snapshot.schedules.push(SnapshotSchedule {
                schedule: Schedule::try_from(row)?,
                event_name,
            });
        }
        for row in exception_rows {
            snapshot
                .exceptions
                .entry(row.schedule_id)
                .or_default()
                .push(ScheduleException::from(row));
        }
        tracing::debug!(
            schedules = snapshot.schedules.len(),
            exceptions = snapshot.exceptions.values().map(Vec::len).sum::<usize>(),
            "Projection snapshot loaded"
        );
        Ok(snapshot)
    }
}
