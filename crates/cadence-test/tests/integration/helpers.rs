#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]
//! Test helpers for integration tests.
//!
//! Provides:
//! - date/time shorthands for January 2024 fixtures
//! - seeding of events and schedules through the service layer
//! - an isolated Postgres schema per test when a database is configured

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use cadence_test::component::db::connection::create_pool;
use cadence_test::component::event;
use cadence_test::component::model::{Event, NewEvent, NewSchedule, Schedule};
use cadence_test::component::projection::Projection;
use cadence_test::component::recurrence::RecurrenceRule;
use cadence_test::component::schedule;
use cadence_test::component::store::{PgStore, ScheduleStore};
use cadence_test::component::window::{DateRange, TimeWindow};

pub use cadence_test::component::store::MemoryStore;

pub const TEST_DATABASE_URL_VAR: &str = "CADENCE_TEST_DATABASE_URL";

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

/// A day of January 2024.
pub fn jan(day: u32) -> NaiveDate {
    date(2024, 1, day)
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time")
}

pub fn at(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0).expect("valid time"))
}

/// Window from `first` 09:00 to `last` 10:00 UTC.
pub fn window(first: NaiveDate, last: NaiveDate) -> TimeWindow {
    TimeWindow::new(at(first, 9), at(last, 10)).expect("valid window")
}

pub fn range(start: NaiveDate, end: NaiveDate) -> DateRange {
    DateRange::new(start, end)
}

pub fn daily() -> RecurrenceRule {
    RecurrenceRule::daily(1).expect("valid rule")
}

pub async fn seed_event<S: ScheduleStore>(store: &S, name: &str) -> Event {
    event::create_event(store, NewEvent::new(name))
        .await
        .expect("Failed to seed event")
}

pub async fn seed_schedule<S: ScheduleStore>(
    store: &S,
    event_id: Uuid,
    window: TimeWindow,
    rule: RecurrenceRule,
) -> Schedule {
    schedule::create_schedule(store, NewSchedule::new(event_id, window, rule))
        .await
        .expect("Failed to seed schedule")
}

/// Daily 09:00-10:00 schedule over `[first, last]`.
pub async fn seed_daily<S: ScheduleStore>(
    store: &S,
    event_id: Uuid,
    first: NaiveDate,
    last: NaiveDate,
) -> Schedule {
    seed_schedule(store, event_id, window(first, last), daily()).await
}

pub fn dates_of(projections: &[Projection]) -> Vec<NaiveDate> {
    projections.iter().map(|p| p.date).collect()
}

pub fn on(projections: &[Projection], day: NaiveDate) -> Vec<&Projection> {
    projections.iter().filter(|p| p.date == day).collect()
}

/// A private Postgres schema holding the store's tables.
///
/// Created per test and removed by [`PgTestSchema::teardown`].
pub struct PgTestSchema {
    admin: AsyncPgConnection,
    schema: String,
    pub store: PgStore,
}

impl PgTestSchema {
    /// ## Summary
    /// Creates the schema and tables, or returns `None` when no test database
    /// is configured.
    ///
    /// ## Errors
    /// Returns an error if the database is configured but unreachable.
    pub async fn create() -> anyhow::Result<Option<Self>> {
        let Ok(base_url) = std::env::var(TEST_DATABASE_URL_VAR) else {
            eprintln!("[PgTestSchema] {TEST_DATABASE_URL_VAR} not set, skipping");
            return Ok(None);
        };

        let schema = format!("cadence_test_{}", Uuid::new_v4().simple());
        let mut admin = AsyncPgConnection::establish(&base_url).await?;
        diesel::sql_query(format!("CREATE SCHEMA {schema}"))
            .execute(&mut admin)
            .await?;
        for statement in table_ddl(&schema) {
            diesel::sql_query(statement).execute(&mut admin).await?;
        }

        let separator = if base_url.contains('?') { '&' } else { '?' };
        let url = format!("{base_url}{separator}options=-c%20search_path%3D{schema}");
        let pool = create_pool(&url, 4).await?;
        tracing::debug!(%schema, "Created test schema");

        Ok(Some(Self {
            admin,
            schema,
            store: PgStore::new(pool),
        }))
    }

    /// Counts rows of `table` inside this schema.
    pub async fn count(&mut self, table: &str) -> anyhow::Result<i64> {
        #[derive(diesel::QueryableByName)]
        struct Count {
            #[diesel(sql_type = diesel::sql_types::BigInt)]
            n: i64,
        }

        let row: Count = diesel::sql_query(format!(
            "SELECT COUNT(*) AS n FROM {}.{table}",
            self.schema
        ))
        .get_result(&mut self.admin)
        .await?;
        Ok(row.n)
    }

    /// ## Errors
    /// Returns an error if the schema cannot be dropped.
    pub async fn teardown(self) -> anyhow::Result<()> {
        let Self {
            mut admin,
            schema,
            store,
        } = self;
        drop(store);
        diesel::sql_query(format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&mut admin)
            .await?;
        Ok(())
    }
}

fn table_ddl(schema: &str) -> Vec<String> {
    vec![
        format!(
            "CREATE TABLE {schema}.event (
                id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT,
                category TEXT,
                priority INTEGER,
                status TEXT NOT NULL DEFAULT 'active',
                metadata JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ),
        format!(
            "CREATE TABLE {schema}.schedule (
                id UUID PRIMARY KEY,
                event_id UUID NOT NULL REFERENCES {schema}.event(id) ON DELETE CASCADE,
                description TEXT,
                start_at TIMESTAMPTZ NOT NULL,
                end_at TIMESTAMPTZ NOT NULL,
                recurrence JSONB NOT NULL,
                metadata JSONB,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                CHECK (start_at < end_at)
            )"
        ),
        format!("CREATE INDEX ON {schema}.schedule (event_id, start_at)"),
        format!(
            "CREATE TABLE {schema}.schedule_exception (
                id UUID PRIMARY KEY,
                schedule_id UUID NOT NULL REFERENCES {schema}.schedule(id) ON DELETE CASCADE,
                exception_date DATE NOT NULL,
                exception_type TEXT NOT NULL CHECK (exception_type IN ('cancelled', 'modified')),
                modified_date DATE,
                modified_start TIME,
                modified_end TIME,
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (schedule_id, exception_date)
            )"
        ),
    ]
}
