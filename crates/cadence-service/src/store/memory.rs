//! In-process store backed by ordered maps.
//!
//! Schedule writes for one event are serialized by a per-event async mutex
//! held across the sibling read, the overlap check and the write. Readers
//! take the state lock once, so a snapshot never sees half of a write.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use cadence_core::model::{
    DEFAULT_EVENT_STATUS, Event, EventUpdate, ExceptionUpdate, NewEvent, NewException,
    NewSchedule, Schedule, ScheduleException, ScheduleUpdate,
};
use cadence_core::window::DateRange;

use super::{ProjectionSnapshot, ScheduleStore, SnapshotSchedule, SnapshotScope};
use crate::error::{ServiceError, ServiceResult};
use crate::schedule::guard;

#[derive(Debug, Default)]
struct MemoryState {
    events: BTreeMap<Uuid, Event>,
    schedules: BTreeMap<Uuid, Schedule>,
    exceptions: BTreeMap<Uuid, ScheduleException>,
}

impl MemoryState {
    fn schedules_of(&self, event_id: Uuid) -> Vec<Schedule> {
        let mut schedules: Vec<Schedule> = self
            .schedules
            .values()
            .filter(|schedule| schedule.event_id == event_id)
            .cloned()
            .collect();
        schedules.sort_by_key(|schedule| (schedule.window.start, schedule.id));
        schedules
    }

    fn remove_schedule(&mut self, schedule_id: Uuid) {
        self.schedules.remove(&schedule_id);
        self.exceptions
            .retain(|_, exception| exception.schedule_id != schedule_id);
    }
}

/// Store for tests and embedding without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    event_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn event_lock(&self, event_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.event_locks.lock().await;
        Arc::clone(locks.entry(event_id).or_default())
    }

    async fn schedule_owner(&self, schedule_id: Uuid) -> ServiceResult<Uuid> {
        self.state
            .read()
            .await
            .schedules
            .get(&schedule_id)
            .map(|schedule| schedule.event_id)
            .ok_or_else(|| schedule_not_found(schedule_id))
    }
}

fn event_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("event {id}"))
}

fn schedule_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("schedule {id}"))
}

fn exception_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("exception {id}"))
}

impl ScheduleStore for MemoryStore {
    async fn insert_event(&self, new: NewEvent) -> ServiceResult<Event> {
        new.validate()?;
        let now = Utc::now();
        let event = Event {
            id: Uuid::now_v7(),
            status: new
                .status
                .unwrap_or_else(|| DEFAULT_EVENT_STATUS.to_string()),
            name: new.name,
            description: new.description,
            category: new.category,
            priority: new.priority,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .events
            .insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> ServiceResult<Option<Event>> {
        Ok(self.state.read().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> ServiceResult<Vec<Event>> {
        let mut events: Vec<Event> = self.state.read().await.events.values().cloned().collect();
        events.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn update_event(&self, id: Uuid, update: EventUpdate) -> ServiceResult<Event> {
        let mut state = self.state.write().await;
        let slot = state.events.get_mut(&id).ok_or_else(|| event_not_found(id))?;
        let mut merged = update.apply_to(slot)?;
        merged.updated_at = Utc::now();
        slot.clone_from(&merged);
        Ok(merged)
    }

    async fn delete_event(&self, id: Uuid) -> ServiceResult<()> {
        let lock = self.event_lock(id).await;
        let _writer = lock.lock().await;

        let mut state = self.state.write().await;
        if state.events.remove(&id).is_none() {
            return Err(event_not_found(id));
        }
        let owned: Vec<Uuid> = state
            .schedules
            .values()
            .filter(|schedule| schedule.event_id == id)
            .map(|schedule| schedule.id)
            .collect();
        for schedule_id in owned {
            state.remove_schedule(schedule_id);
        }
        Ok(())
    }

    async fn get_schedule(&self, id: Uuid) -> ServiceResult<Option<Schedule>> {
        Ok(self.state.read().await.schedules.get(&id).cloned())
    }

    async fn list_schedules(&self, event_id: Uuid) -> ServiceResult<Vec<Schedule>> {
        Ok(self.state.read().await.schedules_of(event_id))
    }

    async fn insert_schedule(&self, new: NewSchedule) -> ServiceResult<Schedule> {
        new.validate()?;
        let lock = self.event_lock(new.event_id).await;
        let _writer = lock.lock().await;

        let siblings = {
            let state = self.state.read().await;
            if !state.events.contains_key(&new.event_id) {
                return Err(event_not_found(new.event_id));
            }
            state.schedules_of(new.event_id)
        };
        guard::ensure_no_overlap(new.event_id, &siblings, &new.window, None)?;

        let now = Utc::now();
        let schedule = Schedule {
            id: Uuid::now_v7(),
            event_id: new.event_id,
            description: new.description,
            window: new.window,
            rule: new.rule,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        };
        self.state
            .write()
            .await
            .schedules
            .insert(schedule.id, schedule.clone());
        Ok(schedule)
    }

    async fn update_schedule(&self, id: Uuid, update: ScheduleUpdate) -> ServiceResult<Schedule> {
        let event_id = self.schedule_owner(id).await?;
        let lock = self.event_lock(event_id).await;
        let _writer = lock.lock().await;

        let (current, siblings) = {
            let state = self.state.read().await;
            let current = state
                .schedules
                .get(&id)
                .cloned()
                .ok_or_else(|| schedule_not_found(id))?;
            (current, state.schedules_of(event_id))
        };
        let mut merged = update.apply_to(&current)?;
        guard::ensure_no_overlap(event_id, &siblings, &merged.window, Some(id))?;
        merged.updated_at = Utc::now();

        let mut state = self.state.write().await;
        let slot = state
            .schedules
            .get_mut(&id)
            .ok_or_else(|| schedule_not_found(id))?;
        slot.clone_from(&merged);
        Ok(merged)
    }

    async fn delete_schedule(&self, id: Uuid) -> ServiceResult<()> {
        let event_id = self.schedule_owner(id).await?;
        let lock = self.event_lock(event_id).await;
        let _writer = lock.lock().await;

        let mut state = self.state.write().await;
        if !state.schedules.contains_key(&id) {
            return Err(schedule_not_found(id));
        }
        state.remove_schedule(id);
        Ok(())
    }

    async fn get_exception(&self, id: Uuid) -> ServiceResult<Option<ScheduleException>> {
        Ok(self.state.read().await.exceptions.get(&id).cloned())
    }

    async fn list_exceptions(&self, schedule_id: Uuid) -> ServiceResult<Vec<ScheduleException>> {
        let mut exceptions: Vec<ScheduleException> = self
            .state
            .read()
            .await
            .exceptions
            .values()
            .filter(|exception| exception.schedule_id == schedule_id)
            .cloned()
            .collect();
        exceptions.sort_by_key(|exception| exception.exception_date);
        Ok(exceptions)
    }

    async fn insert_exception(&self, new: NewException) -> ServiceResult<ScheduleException> {
        new.validate()?;
        let mut state = self.state.write().await;
        if !state.schedules.contains_key(&new.schedule_id) {
            return Err(schedule_not_found(new.schedule_id));
        }
        if state.exceptions.values().any(|existing| {
            existing.schedule_id == new.schedule_id
                && existing.exception_date == new.exception_date
        }) {
            return Err(ServiceError::Conflict(format!(
                "schedule {} already has an exception on {}",
                new.schedule_id, new.exception_date
            )));
        }

        let now = Utc::now();
        let exception = ScheduleException {
            id: Uuid::now_v7(),
            schedule_id: new.schedule_id,
            exception_date: new.exception_date,
            kind: new.kind,
            modified_date: new.modified_date,
            modified_start: new.modified_start,
            modified_end: new.modified_end,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        state.exceptions.insert(exception.id, exception.clone());
        Ok(exception)
    }

    async fn update_exception(
        &self,
        id: Uuid,
        update: ExceptionUpdate,
    ) -> ServiceResult<ScheduleException> {
        let mut state = self.state.write().await;
        let slot = state
            .exceptions
            .get_mut(&id)
            .ok_or_else(|| exception_not_found(id))?;
        let mut merged = update.apply_to(slot)?;
        merged.updated_at = Utc::now();
        slot.clone_from(&merged);
        Ok(merged)
    }

    async fn delete_exception(&self, id: Uuid) -> ServiceResult<()> {
        self.state
            .write()
            .await
            .exceptions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| exception_not_found(id))
    }

    async fn load_snapshot(
        &self,
        scope: SnapshotScope,
        range: DateRange,
    ) -> ServiceResult<ProjectionSnapshot> {
        let state = self.state.read().await;
        let mut snapshot = ProjectionSnapshot::default();

        for schedule in state.schedules.values() {
            if scope.event_id().is_some_and(|id| id != schedule.event_id)
                || !schedule.window.intersects(range)
            {
                continue;
            }
            let Some(event) = state.events.get(&schedule.event_id) else {
                continue;
            };
            snapshot.schedules.push(SnapshotSchedule {
                schedule: schedule.clone(),
                event_name: event.name.clone(),
            });
        }
        snapshot
            .schedules
            .sort_by_key(|entry| (entry.schedule.window.start, entry.schedule.id));

        for exception in state.exceptions.values() {
            if snapshot
                .schedules
                .iter()
                .any(|entry| entry.schedule.id == exception.schedule_id)
            {
                snapshot
                    .exceptions
                    .entry(exception.schedule_id)
                    .or_default()
                    .push(exception.clone());
            }
        }
        for exceptions in snapshot.exceptions.values_mut() {
            exceptions.sort_by_key(|exception| exception.exception_date);
        }
        Ok(snapshot)
    }
}
