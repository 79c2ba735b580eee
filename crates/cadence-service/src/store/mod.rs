//! Storage seam for events, schedules and exceptions.
//!
//! Implementations own write serialization: schedule inserts and updates
//! re-read the owning event's schedules and run the overlap guard while
//! holding a per-event lock, so two overlapping writers for one event can
//! never both commit.

pub mod memory;
pub mod postgres;

use std::collections::HashMap;
use std::future::Future;

use uuid::Uuid;

use cadence_core::model::{
    Event, EventUpdate, ExceptionUpdate, NewEvent, NewException, NewSchedule, Schedule,
    ScheduleException, ScheduleUpdate,
};
use cadence_core::window::DateRange;

use crate::error::ServiceResult;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Which events a projection snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotScope {
    Event(Uuid),
    AllEvents,
}

impl SnapshotScope {
    #[must_use]
    pub const fn event_id(self) -> Option<Uuid> {
        match self {
            Self::Event(id) => Some(id),
            Self::AllEvents => None,
        }
    }
}

/// A schedule joined with its event's name.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSchedule {
    pub schedule: Schedule,
    pub event_name: String,
}

/// Schedules intersecting a range plus all of their exceptions, read at a
/// single point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionSnapshot {
    pub schedules: Vec<SnapshotSchedule>,
    pub exceptions: HashMap<Uuid, Vec<ScheduleException>>,
}

impl ProjectionSnapshot {
    #[must_use]
    pub fn exceptions_for(&self, schedule_id: Uuid) -> &[ScheduleException] {
        self.exceptions
            .get(&schedule_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Persistence operations used by the service layer.
///
/// Lookups of a missing id return `Ok(None)`; updates and deletes of a
/// missing id return `ServiceError::NotFound`.
pub trait ScheduleStore: Send + Sync {
    fn insert_event(&self, new: NewEvent) -> impl Future<Output = ServiceResult<Event>> + Send;

    fn get_event(&self, id: Uuid) -> impl Future<Output = ServiceResult<Option<Event>>> + Send;

    fn list_events(&self) -> impl Future<Output = ServiceResult<Vec<Event>>> + Send;

    fn update_event(
        &self,
        id: Uuid,
        update: EventUpdate,
    ) -> impl Future<Output = ServiceResult<Event>> + Send;

    /// Removes the event with all of its schedules and their exceptions.
    fn delete_event(&self, id: Uuid) -> impl Future<Output = ServiceResult<()>> + Send;

    fn get_schedule(&self, id: Uuid)
    -> impl Future<Output = ServiceResult<Option<Schedule>>> + Send;

    /// Schedules of one event ordered by window start.
    fn list_schedules(
        &self,
        event_id: Uuid,
    ) -> impl Future<Output = ServiceResult<Vec<Schedule>>> + Send;

    /// Inserts a schedule after checking it against its siblings under the
    /// event lock.
    ///
    /// Fails with `SchedulingConflict` on overlap and `NotFound` when the
    /// event is missing.
    fn insert_schedule(
        &self,
        new: NewSchedule,
    ) -> impl Future<Output = ServiceResult<Schedule>> + Send;

    /// Applies `update`, re-running the overlap guard (excluding the schedule
    /// itself) under the event lock.
    fn update_schedule(
        &self,
        id: Uuid,
        update: ScheduleUpdate,
    ) -> impl Future<Output = ServiceResult<Schedule>> + Send;

    /// Removes the schedule and its exceptions.
    fn delete_schedule(&self, id: Uuid) -> impl Future<Output = ServiceResult<()>> + Send;

    fn get_exception(
        &self,
        id: Uuid,
    ) -> impl Future<Output = ServiceResult<Option<ScheduleException>>> + Send;

    /// Exceptions of one schedule ordered by exception date.
    fn list_exceptions(
        &self,
        schedule_id: Uuid,
    ) -> impl Future<Output = ServiceResult<Vec<ScheduleException>>> + Send;

    /// Fails with `Conflict` when the schedule already has an exception on
    /// the same date.
    fn insert_exception(
        &self,
        new: NewException,
    ) -> impl Future<Output = ServiceResult<ScheduleException>> + Send;

    fn update_exception(
        &self,
        id: Uuid,
        update: ExceptionUpdate,
    ) -> impl Future<Output = ServiceResult<ScheduleException>> + Send;

    fn delete_exception(&self, id: Uuid) -> impl Future<Output = ServiceResult<()>> + Send;

    /// Reads every schedule in `scope` whose window touches `range`, joined
    /// with event names, together with their exceptions.
    fn load_snapshot(
        &self,
        scope: SnapshotScope,
        range: DateRange,
    ) -> impl Future<Output = ServiceResult<ProjectionSnapshot>> + Send;
}
