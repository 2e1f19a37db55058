mod attendance;
mod locations;
mod payments;
mod reports;
mod students;
pub mod teachers;

pub use attendance::{
    AttendanceRecord, AttendanceStatus, ClassAttendanceRow, StudentRef, SummaryRow,
};
pub use locations::Location;
pub use payments::{MarkPayment, Payment, PaymentStatus, StatusRow};
pub use reports::{DashboardSummary, FinanceFilter, FinanceReport, GradeCount, StatusCount};
pub use students::{NewStudent, Student, StudentFilter, StudentPatch};
pub use teachers::{NewTeacher, Teacher, TeacherPatch};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("Cannot find {0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("Unable to allocate a unique student id")]
    IdSpaceExhausted,
    #[error(transparent)]
    Db(#[from] rusqlite::Error),
}

impl StoreError {
    fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }
}

/// A borrow of the database scoped to one authenticated teacher. Every domain
/// query lives on this type and carries the teacher id in its WHERE clause,
/// so a handler cannot issue an unscoped query by accident. Teacher-account
/// operations (register/login/profile) are the only queries outside it; see
/// `store::teachers`.
pub struct TenantStore<'a> {
    conn: &'a Connection,
    teacher_id: &'a str,
}

impl<'a> TenantStore<'a> {
    pub fn new(conn: &'a Connection, teacher_id: &'a str) -> Self {
        TenantStore { conn, teacher_id }
    }
}

/// Timestamps are fixed-width UTC strings so that lexicographic range
/// comparison in SQL equals chronological comparison.
const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub(crate) fn now_ts() -> String {
    Utc::now().format(TS_FORMAT).to_string()
}

/// Accepts a bare day ("2025-10-07") or a full RFC 3339 timestamp.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let t = raw.trim();
    if let Ok(day) = t.parse::<NaiveDate>() {
        return Some(day);
    }
    DateTime::parse_from_rfc3339(t)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

pub(crate) fn day_start(day: NaiveDate) -> String {
    format!("{}T00:00:00Z", day.format("%Y-%m-%d"))
}

pub(crate) fn day_end(day: NaiveDate) -> String {
    format!("{}T23:59:59Z", day.format("%Y-%m-%d"))
}
