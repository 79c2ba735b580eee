//! Applies a schedule's exceptions to its candidate dates.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveTime};

use cadence_core::model::{ExceptionKind, Schedule, ScheduleException};
use cadence_core::window::DateRange;

use super::expand::DateExpander;
use super::{Projection, ProjectionStatus};

/// Resolves the projections of one schedule.
///
/// A move is live only when its source date is a real candidate of the
/// schedule. A live move is emitted at its destination whenever the
/// destination lies in the query range, and it displaces anything else the
/// schedule would produce on that destination date.
#[derive(Debug)]
pub struct ExceptionResolver<'a> {
    schedule: &'a Schedule,
    event_name: &'a str,
    expander: DateExpander,
    by_date: BTreeMap<NaiveDate, &'a ScheduleException>,
    moves: Vec<(&'a ScheduleException, NaiveDate)>,
    destinations: BTreeSet<NaiveDate>,
}

impl<'a> ExceptionResolver<'a> {
    #[must_use]
    pub fn new(
        schedule: &'a Schedule,
        event_name: &'a str,
        exceptions: &'a [ScheduleException],
    ) -> Self {
        let expander = DateExpander::new(schedule);
        let mut by_date = BTreeMap::new();
        let mut moves = Vec::new();
        let mut destinations = BTreeSet::new();

        for exception in exceptions
            .iter()
            .filter(|exception| exception.schedule_id == schedule.id)
        {
            by_date.insert(exception.exception_date, exception);
            if let Some(target) = exception.move_target() {
                if expander.occurs_on(exception.exception_date) {
                    moves.push((exception, target));
                    destinations.insert(target);
                } else {
                    tracing::trace!(
                        schedule_id = %schedule.id,
                        source = %exception.exception_date,
                        "Ignoring move from a date the schedule never produces"
                    );
                }
            }
        }
        moves.sort_by_key(|(exception, _)| exception.exception_date);

        Self {
            schedule,
            event_name,
            expander,
            by_date,
            moves,
            destinations,
        }
    }

    /// Projections of this schedule inside `range`, ordered by
    /// `(date, start_time, end_time, source date)`.
    #[must_use]
    pub fn resolve(&self, range: DateRange) -> Vec<Projection> {
        let mut resolved: Vec<(Projection, NaiveDate)> = Vec::new();

        for occurrence in self.expander.expand(range) {
            let date = occurrence.date;
            if self.destinations.contains(&date) {
                continue;
            }
            match self.by_date.get(&date) {
                None => resolved.push((self.project(date, ProjectionStatus::Normal, None), date)),
                Some(exception) => match exception.kind {
                    ExceptionKind::Cancelled => {}
                    ExceptionKind::Modified if exception.is_move() => {}
                    ExceptionKind::Modified => {
                        let (start, end) = self.times_for(exception);
                        let status = ProjectionStatus::Retimed { start, end };
                        resolved.push((self.project(date, status, exception.notes.clone()), date));
                    }
                },
            }
        }

        for (exception, target) in &self.moves {
            if !range.contains(*target) {
                continue;
            }
            let (start, end) = self.times_for(exception);
            let status = ProjectionStatus::Moved {
                from: exception.exception_date,
                to: *target,
                start,
                end,
            };
            resolved.push((
                self.project(*target, status, exception.notes.clone()),
                exception.exception_date,
            ));
        }

        resolved.sort_by(|(a, a_source), (b, b_source)| {
            (a.date, a.start_time, a.end_time, *a_source).cmp(&(
                b.date,
                b.start_time,
                b.end_time,
                *b_source,
            ))
        });
        resolved.into_iter().map(|(projection, _)| projection).collect()
    }

    fn times_for(&self, exception: &ScheduleException) -> (NaiveTime, NaiveTime) {
        (
            exception
                .modified_start
                .unwrap_or_else(|| self.schedule.window.start_time()),
            exception
                .modified_end
                .unwrap_or_else(|| self.schedule.window.end_time()),
        )
    }

    fn project(&self, date: NaiveDate, status: ProjectionStatus, notes: Option<String>) -> Projection {
        let (start_time, end_time) = match status {
            ProjectionStatus::Normal => (
                self.schedule.window.start_time(),
                self.schedule.window.end_time(),
            ),
            ProjectionStatus::Retimed { start, end } | ProjectionStatus::Moved { start, end, .. } => {
                (start, end)
            }
        };
        Projection {
            date,
            event_id: self.schedule.event_id,
            schedule_id: self.schedule.id,
            event_name: self.event_name.to_owned(),
            start_time,
            end_time,
            recurrence_type: self.schedule.rule.kind(),
            status,
            notes,
        }
    }
}

/// ## Summary
/// Convenience wrapper resolving `schedule` over `range` in one call.
#[must_use]
pub fn resolve_schedule(
    schedule: &Schedule,
    event_name: &str,
    exceptions: &[ScheduleException],
    range: DateRange,
) -> Vec<Projection> {
    ExceptionResolver::new(schedule, event_name, exceptions).resolve(range)
}
