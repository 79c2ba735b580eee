use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::{pg::Pg, prelude::*};
use uuid::Uuid;

use crate::db::{enums::ExceptionType, schema};

/// Schedule exception row, unique per `(schedule_id, exception_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = schema::schedule_exception)]
#[diesel(check_for_backend(Pg))]
#[diesel(belongs_to(super::schedule::ScheduleRecord, foreign_key = schedule_id))]
pub struct ExceptionRecord {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub exception_date: NaiveDate,
    pub exception_type: ExceptionType,
    pub modified_date: Option<NaiveDate>,
    pub modified_start: Option<NaiveTime>,
    pub modified_end: Option<NaiveTime>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert struct for creating new exceptions
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::schedule_exception)]
pub struct NewExceptionRecord<'a> {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub exception_date: NaiveDate,
    pub exception_type: ExceptionType,
    pub modified_date: Option<NaiveDate>,
    pub modified_start: Option<NaiveTime>,
    pub modified_end: Option<NaiveTime>,
    pub notes: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::schedule_exception)]
#[diesel(treat_none_as_null = true)]
pub struct ExceptionChangeset<'a> {
    pub exception_type: ExceptionType,
    pub modified_date: Option<NaiveDate>,
    pub modified_start: Option<NaiveTime>,
    pub modified_end: Option<NaiveTime>,
    pub notes: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}
