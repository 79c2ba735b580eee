//! Candidate occurrence dates of a single schedule.
//!
//! Every rule is measured from the schedule's anchor, the calendar date of
//! its window start. Stepping is closed-form per rule so a long query range
//! never walks day by day.

use std::iter::FusedIterator;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};

use cadence_core::model::Schedule;
use cadence_core::recurrence::RecurrenceRule;
use cadence_core::window::{DateRange, TimeWindow};

/// A rule with its optional components filled in from the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cadence {
    Daily { interval: i64 },
    /// `weekday` counts from Sunday = 0.
    Weekly { interval: i64, weekday: u32 },
    Monthly { interval: i64, day: u32 },
    Yearly { interval: i64, month: u32, day: u32 },
}

impl Cadence {
    fn resolve(rule: &RecurrenceRule, anchor: NaiveDate) -> Self {
        // Stored rules are validated; the clamp keeps hand-built literals from
        // dividing by zero.
        let interval = i64::from(rule.interval().max(1));
        match *rule {
            RecurrenceRule::Daily { .. } => Self::Daily { interval },
            RecurrenceRule::Weekly { day_of_week, .. } => Self::Weekly {
                interval,
                weekday: day_of_week
                    .map_or_else(|| anchor.weekday().num_days_from_sunday(), u32::from),
            },
            RecurrenceRule::Monthly { day_of_month, .. } => Self::Monthly {
                interval,
                day: day_of_month.map_or_else(|| anchor.day(), u32::from),
            },
            RecurrenceRule::Yearly {
                month,
                day_of_month,
                ..
            } => Self::Yearly {
                interval,
                month: month.map_or_else(|| anchor.month(), u32::from),
                day: day_of_month.map_or_else(|| anchor.day(), u32::from),
            },
        }
    }
}

/// One candidate occurrence with its wall-clock bounds.
///
/// When the end time is not after the start time the occurrence runs past
/// midnight and `end` lands on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Expands one schedule's recurrence rule into dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateExpander {
    anchor: NaiveDate,
    last: NaiveDate,
    cadence: Cadence,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl DateExpander {
    #[must_use]
    pub fn new(schedule: &Schedule) -> Self {
        Self::from_parts(&schedule.window, &schedule.rule)
    }

    #[must_use]
    pub fn from_parts(window: &TimeWindow, rule: &RecurrenceRule) -> Self {
        let anchor = window.start_date();
        Self {
            anchor,
            last: window.end_date(),
            cadence: Cadence::resolve(rule, anchor),
            start_time: window.start_time(),
            end_time: window.end_time(),
        }
    }

    /// Calendar days the schedule is active on.
    #[must_use]
    pub const fn active_dates(&self) -> DateRange {
        DateRange::new(self.anchor, self.last)
    }

    /// Whether `date` satisfies the rule, ignoring the window end.
    #[must_use]
    pub fn matches(&self, date: NaiveDate) -> bool {
        if date < self.anchor {
            return false;
        }
        let offset = (date - self.anchor).num_days();
        match self.cadence {
            Cadence::Daily { interval } => offset % interval == 0,
            Cadence::Weekly { interval, weekday } => {
                date.weekday().num_days_from_sunday() == weekday && (offset / 7) % interval == 0
            }
            Cadence::Monthly { interval, day } => {
                date.day() == day && (month_index(date) - month_index(self.anchor)) % interval == 0
            }
            Cadence::Yearly {
                interval,
                month,
                day,
            } => {
                date.month() == month
                    && date.day() == day
                    && i64::from(date.year() - self.anchor.year()) % interval == 0
            }
        }
    }

    /// Whether the schedule produces a candidate on `date`.
    #[must_use]
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        date <= self.last && self.matches(date)
    }

    /// Pairs `date` with the schedule's times.
    #[must_use]
    pub fn occurrence(&self, date: NaiveDate) -> Occurrence {
        let start = date.and_time(self.start_time);
        let end_date = if self.end_time > self.start_time {
            date
        } else {
            date.succ_opt().unwrap_or(date)
        };
        Occurrence {
            date,
            start,
            end: end_date.and_time(self.end_time),
        }
    }

    /// Candidates inside `range`, ascending.
    #[must_use]
    pub fn expand(&self, range: DateRange) -> Occurrences {
        let effective = range.intersect(self.active_dates());
        Occurrences {
            expander: *self,
            cursor: (!effective.is_empty()).then_some(effective.start),
            until: effective.end,
        }
    }

    /// First candidate in `[from, until]`.
    #[must_use]
    pub fn next_on_or_after(&self, from: NaiveDate, until: NaiveDate) -> Option<NaiveDate> {
        let from = from.max(self.anchor);
        let until = until.min(self.last);
        if from > until {
            return None;
        }
        let found = match self.cadence {
            Cadence::Daily { interval } => {
                let offset = round_up((from - self.anchor).num_days(), interval);
                add_days(self.anchor, offset)?
            }
            Cadence::Weekly { interval, weekday } => {
                let candidate = weekday_on_or_after(from, weekday)?;
                let block = (candidate - self.anchor).num_days() / 7;
                if block % interval == 0 {
                    candidate
                } else {
                    let block_start = add_days(self.anchor, round_up(block, interval) * 7)?;
                    weekday_on_or_after(block_start, weekday)?
                }
            }
            Cadence::Monthly { interval, day } => {
                return self.next_monthly(from, until, interval, day);
            }
            Cadence::Yearly {
                interval,
                month,
                day,
            } => return self.next_yearly(from, until, interval, month, day),
        };
        (found <= until).then_some(found)
    }

    fn next_monthly(
        &self,
        from: NaiveDate,
        until: NaiveDate,
        interval: i64,
        day: u32,
    ) -> Option<NaiveDate> {
        let anchor_month = month_index(self.anchor);
        let mut offset = month_index(from) - anchor_month;
        if from.day() > day {
            offset += 1;
        }
        offset = round_up(offset, interval);
        loop {
            let (year, month) = split_month_index(anchor_month + offset)?;
            if NaiveDate::from_ymd_opt(year, month, 1)? > until {
                return None;
            }
            // Months too short for `day` are skipped, never clamped.
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return (date <= until).then_some(date);
            }
            offset += interval;
        }
    }

    fn next_yearly(
        &self,
        from: NaiveDate,
        until: NaiveDate,
        interval: i64,
        month: u32,
        day: u32,
    ) -> Option<NaiveDate> {
        let mut offset = i64::from(from.year() - self.anchor.year());
        if (from.month(), from.day()) > (month, day) {
            offset += 1;
        }
        offset = round_up(offset, interval);
        loop {
            let year = i32::try_from(i64::from(self.anchor.year()) + offset).ok()?;
            if NaiveDate::from_ymd_opt(year, 1, 1)? > until {
                return None;
            }
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return (date <= until).then_some(date);
            }
            offset += interval;
        }
    }
}

/// Iterator over a schedule's candidates within a range.
#[derive(Debug, Clone)]
pub struct Occurrences {
    expander: DateExpander,
    cursor: Option<NaiveDate>,
    until: NaiveDate,
}

impl Iterator for Occurrences {
    type Item = Occurrence;

    fn next(&mut self) -> Option<Occurrence> {
        let from = self.cursor?;
        match self.expander.next_on_or_after(from, self.until) {
            Some(date) => {
                self.cursor = date.succ_opt();
                Some(self.expander.occurrence(date))
            }
            None => {
                self.cursor = None;
                None
            }
        }
    }
}

impl FusedIterator for Occurrences {}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn split_month_index(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// Smallest multiple of `step` that is `>= value`, for non-negative `value`.
const fn round_up(value: i64, step: i64) -> i64 {
    let rem = value % step;
    if rem == 0 { value } else { value + step - rem }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::try_from(days).ok()?))
}

fn weekday_on_or_after(date: NaiveDate, weekday: u32) -> Option<NaiveDate> {
    let current = date.weekday().num_days_from_sunday();
    let delta = (weekday + 7 - current) % 7;
    date.checked_add_days(Days::new(u64::from(delta)))
}
