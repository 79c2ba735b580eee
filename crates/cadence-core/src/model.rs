//! Event, schedule and exception records plus their write payloads.
//!
//! Update payloads only carry the fields to change. Nullable fields use
//! `Option<Option<T>>` so that `Some(None)` clears the stored value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::recurrence::RecurrenceRule;
use crate::window::TimeWindow;

pub const DEFAULT_EVENT_STATUS: &str = "active";

/// Logical entity owning any number of time-disjoint schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<String>,
    pub metadata: Option<JsonValue>,
}

impl NewEvent {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// ## Errors
    /// Returns a validation error if the name is blank.
    pub fn validate(&self) -> CoreResult<()> {
        validate_event_name(&self.name)
    }

    /// Status to store, falling back to [`DEFAULT_EVENT_STATUS`].
    #[must_use]
    pub fn status_or_default(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_EVENT_STATUS)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
    pub priority: Option<Option<i32>>,
    pub status: Option<String>,
    pub metadata: Option<Option<JsonValue>>,
}

impl EventUpdate {
    /// ## Summary
    /// Returns `event` with this update merged in. `updated_at` is left for
    /// the store to stamp.
    ///
    /// ## Errors
    /// Returns a validation error if the merged name is blank.
    pub fn apply_to(&self, event: &Event) -> CoreResult<Event> {
        let mut merged = event.clone();
        if let Some(name) = &self.name {
            merged.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            merged.description.clone_from(description);
        }
        if let Some(category) = &self.category {
            merged.category.clone_from(category);
        }
        if let Some(priority) = self.priority {
            merged.priority = priority;
        }
        if let Some(status) = &self.status {
            merged.status.clone_from(status);
        }
        if let Some(metadata) = &self.metadata {
            merged.metadata.clone_from(metadata);
        }
        validate_event_name(&merged.name)?;
        Ok(merged)
    }
}

fn validate_event_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError(
            "event name must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// One recurrence configuration of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub event_id: Uuid,
    pub description: Option<String>,
    pub window: TimeWindow,
    pub rule: RecurrenceRule,
    pub metadata: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSchedule {
    pub event_id: Uuid,
    pub description: Option<String>,
    pub window: TimeWindow,
    pub rule: RecurrenceRule,
    pub metadata: Option<JsonValue>,
}

impl NewSchedule {
    #[must_use]
    pub fn new(event_id: Uuid, window: TimeWindow, rule: RecurrenceRule) -> Self {
        Self {
            event_id,
            description: None,
            window,
            rule,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// ## Errors
    /// Returns a validation error for an inverted window or a malformed rule.
    pub fn validate(&self) -> CoreResult<()> {
        self.window.validate()?;
        self.rule.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleUpdate {
    pub description: Option<Option<String>>,
    pub window: Option<TimeWindow>,
    pub rule: Option<RecurrenceRule>,
    pub metadata: Option<Option<JsonValue>>,
}

impl ScheduleUpdate {
    /// ## Summary
    /// Returns `schedule` with this update merged in.
    ///
    /// ## Errors
    /// Returns a validation error if the merged window or rule is invalid.
    pub fn apply_to(&self, schedule: &Schedule) -> CoreResult<Schedule> {
        let mut merged = schedule.clone();
        if let Some(description) = &self.description {
            merged.description.clone_from(description);
        }
        if let Some(window) = self.window {
            merged.window = window;
        }
        if let Some(rule) = self.rule {
            merged.rule = rule;
        }
        if let Some(metadata) = &self.metadata {
            merged.metadata.clone_from(metadata);
        }
        merged.window.validate()?;
        merged.rule.validate()?;
        Ok(merged)
    }

    /// Whether applying this update can move the schedule in time.
    #[must_use]
    pub const fn changes_window(&self) -> bool {
        self.window.is_some()
    }
}

/// Exception type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionKind {
    Cancelled,
    Modified,
}

impl ExceptionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for ExceptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExceptionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "cancelled" => Ok(Self::Cancelled),
            "modified" => Ok(Self::Modified),
            other => Err(CoreError::ValidationError(format!(
                "unknown exception type '{other}'"
            ))),
        }
    }
}

/// Per-date override of a schedule's occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub exception_date: NaiveDate,
    pub kind: ExceptionKind,
    pub modified_date: Option<NaiveDate>,
    pub modified_start: Option<NaiveTime>,
    pub modified_end: Option<NaiveTime>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleException {
    /// Destination date when this exception relocates its occurrence.
    #[must_use]
    pub fn move_target(&self) -> Option<NaiveDate> {
        match (self.kind, self.modified_date) {
            (ExceptionKind::Modified, Some(target)) if target != self.exception_date => Some(target),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_move(&self) -> bool {
        self.move_target().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewException {
    pub schedule_id: Uuid,
    pub exception_date: NaiveDate,
    pub kind: ExceptionKind,
    pub modified_date: Option<NaiveDate>,
    pub modified_start: Option<NaiveTime>,
    pub modified_end: Option<NaiveTime>,
    pub notes: Option<String>,
}

impl NewException {
    #[must_use]
    pub const fn cancel(schedule_id: Uuid, date: NaiveDate) -> Self {
        Self {
            schedule_id,
            exception_date: date,
            kind: ExceptionKind::Cancelled,
            modified_date: None,
            modified_start: None,
            modified_end: None,
            notes: None,
        }
    }

    #[must_use]
    pub const fn retime(
        schedule_id: Uuid,
        date: NaiveDate,
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Self {
        Self {
            schedule_id,
            exception_date: date,
            kind: ExceptionKind::Modified,
            modified_date: None,
            modified_start: start,
            modified_end: end,
            notes: None,
        }
    }

    #[must_use]
    pub const fn relocate(schedule_id: Uuid, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            schedule_id,
            exception_date: from,
            kind: ExceptionKind::Modified,
            modified_date: Some(to),
            modified_start: None,
            modified_end: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_times(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.modified_start = start;
        self.modified_end = end;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// ## Errors
    /// Returns a validation error when a cancellation carries modification
    /// fields or the modified times are inverted.
    pub fn validate(&self) -> CoreResult<()> {
        validate_exception_shape(
            self.kind,
            self.modified_date,
            self.modified_start,
            self.modified_end,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionUpdate {
    pub kind: Option<ExceptionKind>,
    pub modified_date: Option<Option<NaiveDate>>,
    pub modified_start: Option<Option<NaiveTime>>,
    pub modified_end: Option<Option<NaiveTime>>,
    pub notes: Option<Option<String>>,
}

impl ExceptionUpdate {
    /// ## Summary
    /// Returns `exception` with this update merged in.
    ///
    /// ## Errors
    /// Returns a validation error if the merged exception is malformed.
    pub fn apply_to(&self, exception: &ScheduleException) -> CoreResult<ScheduleException> {
        let mut merged = exception.clone();
        if let Some(kind) = self.kind {
            merged.kind = kind;
        }
        if let Some(modified_date) = self.modified_date {
            merged.modified_date = modified_date;
        }
        if let Some(modified_start) = self.modified_start {
            merged.modified_start = modified_start;
        }
        if let Some(modified_end) = self.modified_end {
            merged.modified_end = modified_end;
        }
        if let Some(notes) = &self.notes {
            merged.notes.clone_from(notes);
        }
        validate_exception_shape(
            merged.kind,
            merged.modified_date,
            merged.modified_start,
            merged.modified_end,
        )?;
        Ok(merged)
    }
}

fn validate_exception_shape(
    kind: ExceptionKind,
    modified_date: Option<NaiveDate>,
    modified_start: Option<NaiveTime>,
    modified_end: Option<NaiveTime>,
) -> CoreResult<()> {
    if kind == ExceptionKind::Cancelled
        && (modified_date.is_some() || modified_start.is_some() || modified_end.is_some())
    {
        return Err(CoreError::ValidationError(
            "cancelled exceptions must not carry modified date or times".to_string(),
        ));
    }
    if let (Some(start), Some(end)) = (modified_start, modified_end)
        && start >= end
    {
        return Err(CoreError::ValidationError(format!(
            "modified start {start} must be before modified end {end}"
        )));
    }
    Ok(())
}
