use super::{day_end, day_start, now_ts, parse_day, StoreError, TenantStore};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Present" => Some(AttendanceStatus::Present),
            "Absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub teacher_id: String,
    #[serde(rename = "student")]
    pub student_id: String,
    pub date: String,
    pub status: String,
    pub class_grade: Option<String>,
    pub location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct StudentRef {
    pub id: String,
    pub name: String,
}

/// A day's record for the class view, with the student name attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassAttendanceRow {
    pub id: String,
    pub date: String,
    pub status: String,
    pub class_grade: Option<String>,
    pub location: Option<String>,
    pub student: StudentRef,
}

/// Present/absent tallies for one (grade, location) cell.
#[derive(Debug, Serialize)]
pub struct SummaryRow {
    pub grade: String,
    pub location: String,
    pub present: i64,
    pub absent: i64,
}

const ATTENDANCE_COLS: &str =
    "id, teacher_id, student_id, date, status, class_grade, location, created_at, updated_at";

fn row_to_record(r: &rusqlite::Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: r.get(0)?,
        teacher_id: r.get(1)?,
        student_id: r.get(2)?,
        date: r.get(3)?,
        status: r.get(4)?,
        class_grade: r.get(5)?,
        location: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

/// Normalizes an incoming date (bare day or RFC 3339) to the stored
/// fixed-width timestamp form. A bare day lands on midnight UTC.
fn parse_ts(raw: &str) -> Option<String> {
    let t = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(
            dt.with_timezone(&Utc)
                .format("%Y-%m-%dT%H:%M:%SZ")
                .to_string(),
        );
    }
    parse_day(t).map(day_start)
}

impl TenantStore<'_> {
    /// Plain create: snapshots the student's current grade and location into
    /// the record so reports never need to re-join.
    pub fn create_attendance(
        &self,
        student_id: &str,
        date_raw: &str,
        status: AttendanceStatus,
    ) -> Result<AttendanceRecord, StoreError> {
        let Some(student) = self.get_student(student_id)? else {
            return Err(StoreError::NotFound("student"));
        };
        let Some(date) = parse_ts(date_raw) else {
            return Err(StoreError::validation("invalid date"));
        };

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            teacher_id: self.teacher_id.to_string(),
            student_id: student.id.clone(),
            date,
            status: status.as_str().to_string(),
            class_grade: Some(student.grade),
            location: Some(student.location),
            created_at: now_ts(),
            updated_at: now_ts(),
        };
        self.conn.execute(
            &format!("INSERT INTO attendance({ATTENDANCE_COLS}) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            (
                &record.id,
                &record.teacher_id,
                &record.student_id,
                &record.date,
                &record.status,
                &record.class_grade,
                &record.location,
                &record.created_at,
                &record.updated_at,
            ),
        )?;
        Ok(record)
    }

    /// Upsert keyed by (teacher, student, calendar day): an existing row in
    /// the day's range is overwritten in place, otherwise one is inserted.
    /// Runs in a transaction; there is no unique index behind the day key.
    pub fn mark_attendance(
        &self,
        student_id: &str,
        date_raw: &str,
        status: AttendanceStatus,
        class_grade: Option<String>,
        location: Option<String>,
    ) -> Result<AttendanceRecord, StoreError> {
        let Some(day) = parse_day(date_raw) else {
            return Err(StoreError::validation("invalid date"));
        };
        let (start, end) = (day_start(day), day_end(day));

        let tx = self.conn.unchecked_transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM attendance
                 WHERE teacher_id = ? AND student_id = ? AND date >= ? AND date <= ?",
                (self.teacher_id, student_id, &start, &end),
                |r| r.get(0),
            )
            .optional()?;
        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE attendance SET status = ?, class_grade = ?, location = ?, updated_at = ?
                     WHERE teacher_id = ? AND id = ?",
                    (
                        status.as_str(),
                        &class_grade,
                        &location,
                        now_ts(),
                        self.teacher_id,
                        &id,
                    ),
                )?;
                id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                let ts = now_ts();
                // parse_ts cannot fail here: parse_day already accepted the input.
                let date = parse_ts(date_raw).unwrap_or_else(|| day_start(day));
                tx.execute(
                    &format!(
                        "INSERT INTO attendance({ATTENDANCE_COLS}) VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)"
                    ),
                    (
                        &id,
                        self.teacher_id,
                        student_id,
                        &date,
                        status.as_str(),
                        &class_grade,
                        &location,
                        &ts,
                        &ts,
                    ),
                )?;
                id
            }
        };
        tx.commit()?;

        let record = self
            .conn
            .query_row(
                &format!(
                    "SELECT {ATTENDANCE_COLS} FROM attendance WHERE teacher_id = ? AND id = ?"
                ),
                (self.teacher_id, &id),
                row_to_record,
            )
            .optional()?
            .ok_or(StoreError::NotFound("attendance record"))?;
        Ok(record)
    }

    /// One class (grade, location) on one day, student names attached.
    pub fn class_attendance(
        &self,
        date_raw: &str,
        grade: &str,
        location: &str,
    ) -> Result<Vec<ClassAttendanceRow>, StoreError> {
        let Some(day) = parse_day(date_raw) else {
            return Err(StoreError::validation("invalid date"));
        };
        let (start, end) = (day_start(day), day_end(day));

        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.date, a.status, a.class_grade, a.location, s.id, s.name
             FROM attendance a
             JOIN students s ON s.id = a.student_id AND s.teacher_id = a.teacher_id
             WHERE a.teacher_id = ? AND a.date >= ? AND a.date <= ?
               AND a.class_grade = ? AND a.location = ?",
        )?;
        let rows = stmt
            .query_map(
                (self.teacher_id, &start, &end, grade, location),
                |r| {
                    Ok(ClassAttendanceRow {
                        id: r.get(0)?,
                        date: r.get(1)?,
                        status: r.get(2)?,
                        class_grade: r.get(3)?,
                        location: r.get(4)?,
                        student: StudentRef {
                            id: r.get(5)?,
                            name: r.get(6)?,
                        },
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// One student's history, newest first. An unparseable bound is ignored
    /// rather than rejected; the query just runs unbounded on that side.
    pub fn student_attendance(
        &self,
        student_id: &str,
        start_raw: Option<&str>,
        end_raw: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut sql = format!(
            "SELECT {ATTENDANCE_COLS} FROM attendance WHERE teacher_id = ? AND student_id = ?"
        );
        let mut bounds: Vec<String> = Vec::new();
        if let Some(raw) = start_raw {
            match parse_day(raw) {
                Some(day) => {
                    sql.push_str(" AND date >= ?");
                    bounds.push(day_start(day));
                }
                None => tracing::warn!(start = raw, "ignoring invalid startDate"),
            }
        }
        if let Some(raw) = end_raw {
            match parse_day(raw) {
                Some(day) => {
                    sql.push_str(" AND date <= ?");
                    bounds.push(day_end(day));
                }
                None => tracing::warn!(end = raw, "ignoring invalid endDate"),
            }
        }
        sql.push_str(" ORDER BY date DESC");

        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&self.teacher_id, &student_id];
        for b in &bounds {
            params.push(b);
        }
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(&params[..], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Present/absent tallies per (grade, location) over a day range.
    /// Only rows of active students with a non-empty grade and location
    /// snapshot are counted.
    pub fn attendance_summary(
        &self,
        start_raw: &str,
        end_raw: &str,
    ) -> Result<Vec<SummaryRow>, StoreError> {
        let (Some(start_day), Some(end_day)) = (parse_day(start_raw), parse_day(end_raw)) else {
            return Err(StoreError::validation("invalid start or end date"));
        };
        let (start, end) = (day_start(start_day), day_end(end_day));

        let mut stmt = self.conn.prepare(
            "SELECT a.class_grade, a.location,
                    SUM(CASE WHEN a.status = 'Present' THEN 1 ELSE 0 END),
                    SUM(CASE WHEN a.status = 'Absent' THEN 1 ELSE 0 END)
             FROM attendance a
             JOIN students s ON s.id = a.student_id AND s.teacher_id = a.teacher_id
             WHERE a.teacher_id = ? AND a.date >= ? AND a.date <= ?
               AND a.status IN ('Present', 'Absent')
               AND a.class_grade IS NOT NULL AND a.class_grade != ''
               AND a.location IS NOT NULL AND a.location != ''
               AND s.active = 1
             GROUP BY a.class_grade, a.location
             ORDER BY a.class_grade, a.location",
        )?;
        let rows = stmt
            .query_map((self.teacher_id, &start, &end), |r| {
                Ok(SummaryRow {
                    grade: r.get(0)?,
                    location: r.get(1)?,
                    present: r.get(2)?,
                    absent: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn reset_attendance(&self) -> Result<usize, StoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM attendance WHERE teacher_id = ?",
            [self.teacher_id],
        )?;
        Ok(deleted)
    }
}
