//! Recurrence rule definitions.
//!
//! A [`RecurrenceRule`] is one of four shapes. Optional fields fall back to
//! the matching component of the owning schedule's start date when the rule
//! is expanded. Rules are validated when constructed through the helper
//! constructors and whenever they are deserialized.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Recurrence rule attached to a schedule.
///
/// Serialized as a tagged JSON object, e.g.
/// `{"type":"weekly","interval":2,"dayOfWeek":1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    try_from = "RawRecurrenceRule"
)]
pub enum RecurrenceRule {
    Daily {
        interval: u32,
    },
    Weekly {
        interval: u32,
        /// 0 = Sunday .. 6 = Saturday
        #[serde(skip_serializing_if = "Option::is_none")]
        day_of_week: Option<u8>,
    },
    Monthly {
        interval: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        day_of_month: Option<u8>,
    },
    Yearly {
        interval: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        month: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        day_of_month: Option<u8>,
    },
}

/// Discriminant of a [`RecurrenceRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RecurrenceRule {
    /// ## Summary
    /// Builds a daily rule firing every `interval` days.
    ///
    /// ## Errors
    /// Returns a validation error if `interval` is zero.
    pub fn daily(interval: u32) -> CoreResult<Self> {
        let rule = Self::Daily { interval };
        rule.validate()?;
        Ok(rule)
    }

    /// ## Summary
    /// Builds a weekly rule firing every `interval` weeks on `day_of_week`
    /// (0 = Sunday), or on the schedule's start weekday when `None`.
    ///
    /// ## Errors
    /// Returns a validation error if `interval` is zero or `day_of_week > 6`.
    pub fn weekly(interval: u32, day_of_week: Option<u8>) -> CoreResult<Self> {
        let rule = Self::Weekly {
            interval,
            day_of_week,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// ## Summary
    /// Builds a monthly rule firing every `interval` months on `day_of_month`,
    /// or on the schedule's start day when `None`.
    ///
    /// ## Errors
    /// Returns a validation error if `interval` is zero or `day_of_month` is
    /// outside `1..=31`.
    pub fn monthly(interval: u32, day_of_month: Option<u8>) -> CoreResult<Self> {
        let rule = Self::Monthly {
            interval,
            day_of_month,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// ## Summary
    /// Builds a yearly rule firing every `interval` years on `month`/`day_of_month`.
    ///
    /// ## Errors
    /// Returns a validation error if `interval` is zero, a component is out of
    /// range, or the month never contains the requested day.
    pub fn yearly(interval: u32, month: Option<u8>, day_of_month: Option<u8>) -> CoreResult<Self> {
        let rule = Self::Yearly {
            interval,
            month,
            day_of_month,
        };
        rule.validate()?;
        Ok(rule)
    }

    #[must_use]
    pub const fn kind(&self) -> RecurrenceKind {
        match self {
            Self::Daily { .. } => RecurrenceKind::Daily,
            Self::Weekly { .. } => RecurrenceKind::Weekly,
            Self::Monthly { .. } => RecurrenceKind::Monthly,
            Self::Yearly { .. } => RecurrenceKind::Yearly,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        match self {
            Self::Daily { interval }
            | Self::Weekly { interval, .. }
            | Self::Monthly { interval, .. }
            | Self::Yearly { interval, .. } => *interval,
        }
    }

    /// ## Summary
    /// Checks every parameter of the rule against its allowed range.
    ///
    /// ## Errors
    /// Returns `CoreError::ValidationError` naming the first offending field.
    pub fn validate(&self) -> CoreResult<()> {
        if self.interval() == 0 {
            return Err(invalid(format!(
                "{} interval must be a positive integer",
                self.kind()
            )));
        }

        match *self {
            Self::Daily { .. } => {}
            Self::Weekly { day_of_week, .. } => {
                if let Some(dow) = day_of_week
                    && dow > 6
                {
                    return Err(invalid(format!(
                        "dayOfWeek must be between 0 and 6, got {dow}"
                    )));
                }
            }
            Self::Monthly { day_of_month, .. } => check_day_of_month(day_of_month)?,
            Self::Yearly {
                month,
                day_of_month,
                ..
            } => {
                check_day_of_month(day_of_month)?;
                if let Some(m) = month
                    && !(1..=12).contains(&m)
                {
                    return Err(invalid(format!("month must be between 1 and 12, got {m}")));
                }
                if let (Some(m), Some(d)) = (month, day_of_month)
                    && chrono::NaiveDate::from_ymd_opt(2000, u32::from(m), u32::from(d)).is_none()
                {
                    // 2000 is a leap year, so Feb 29 passes here.
                    return Err(invalid(format!("month {m} never has a day {d}")));
                }
            }
        }
        Ok(())
    }
}

fn check_day_of_month(day_of_month: Option<u8>) -> CoreResult<()> {
    match day_of_month {
        Some(dom) if !(1..=31).contains(&dom) => Err(invalid(format!(
            "dayOfMonth must be between 1 and 31, got {dom}"
        ))),
        _ => Ok(()),
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::ValidationError(message)
}

/// Wire form accepted during deserialization. Wide integer types let
/// negative or oversized values surface as validation errors instead of
/// opaque type errors.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
enum RawRecurrenceRule {
    Daily {
        interval: i64,
    },
    Weekly {
        interval: i64,
        #[serde(default)]
        day_of_week: Option<i64>,
    },
    Monthly {
        interval: i64,
        #[serde(default)]
        day_of_month: Option<i64>,
    },
    Yearly {
        interval: i64,
        #[serde(default)]
        month: Option<i64>,
        #[serde(default)]
        day_of_month: Option<i64>,
    },
}

fn narrow_interval(value: i64) -> CoreResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| invalid(format!("interval must be a positive integer, got {value}")))
}

fn narrow_field(name: &str, value: Option<i64>) -> CoreResult<Option<u8>> {
    value
        .map(|v| u8::try_from(v).map_err(|_err| invalid(format!("{name} out of range: {v}"))))
        .transpose()
}

impl TryFrom<RawRecurrenceRule> for RecurrenceRule {
    type Error = CoreError;

    fn try_from(raw: RawRecurrenceRule) -> CoreResult<Self> {
        match raw {
            RawRecurrenceRule::Daily { interval } => Self::daily(narrow_interval(interval)?),
            RawRecurrenceRule::Weekly {
                interval,
                day_of_week,
            } => Self::weekly(
                narrow_interval(interval)?,
                narrow_field("dayOfWeek", day_of_week)?,
            ),
            RawRecurrenceRule::Monthly {
                interval,
                day_of_month,
            } => Self::monthly(
                narrow_interval(interval)?,
                narrow_field("dayOfMonth", day_of_month)?,
            ),
            RawRecurrenceRule::Yearly {
                interval,
                month,
                day_of_month,
            } => Self::yearly(
                narrow_interval(interval)?,
                narrow_field("month", month)?,
                narrow_field("dayOfMonth", day_of_month)?,
            ),
        }
    }
}
