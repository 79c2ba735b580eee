//! Database enum types with Diesel serialization.
//!
//! Each enum maps a text column guarded by a CHECK constraint and converts
//! to and from its `cadence-core` counterpart.

use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use std::fmt;
use std::io::Write;

use cadence_core::model::ExceptionKind;

/// Exception type.
///
/// Maps to `schedule_exception.exception_type` CHECK constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum ExceptionType {
    Cancelled,
    Modified,
}

impl ToSql<Text, Pg> for ExceptionType {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for ExceptionType {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"cancelled" => Ok(Self::Cancelled),
            b"modified" => Ok(Self::Modified),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

impl ExceptionType {
    /// Returns the database string representation of this exception type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ExceptionKind> for ExceptionType {
    fn from(kind: ExceptionKind) -> Self {
        match kind {
            ExceptionKind::Cancelled => Self::Cancelled,
            ExceptionKind::Modified => Self::Modified,
        }
    }
}

impl From<ExceptionType> for ExceptionKind {
    fn from(value: ExceptionType) -> Self {
        match value {
            ExceptionType::Cancelled => Self::Cancelled,
            ExceptionType::Modified => Self::Modified,
        }
    }
}
