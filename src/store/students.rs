use super::{now_ts, StoreError, TenantStore};
use rusqlite::{ErrorCode, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub teacher_id: String,
    #[serde(rename = "studentId")]
    pub student_no: String,
    pub name: String,
    pub grade: String,
    pub location: String,
    pub contact_phone: Option<String>,
    pub parent_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NewStudent {
    pub name: String,
    pub grade: String,
    pub location: String,
    pub contact_phone: Option<String>,
    pub parent_name: Option<String>,
}

#[derive(Debug, Default)]
pub struct StudentFilter {
    pub grade: Option<String>,
    pub location: Option<String>,
}

/// Patchable fields. The tenant id and the public student number are
/// deliberately absent: a client cannot re-tenant a student or collide
/// public ids through an update.
#[derive(Debug, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub location: Option<String>,
    pub contact_phone: Option<Option<String>>,
    pub parent_name: Option<Option<String>>,
    pub is_active: Option<bool>,
}

const STUDENT_COLS: &str = "id, teacher_id, student_no, name, grade, location, \
                            contact_phone, parent_name, active, created_at, updated_at";

fn row_to_student(r: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: r.get(0)?,
        teacher_id: r.get(1)?,
        student_no: r.get(2)?,
        name: r.get(3)?,
        grade: r.get(4)?,
        location: r.get(5)?,
        contact_phone: r.get(6)?,
        parent_name: r.get(7)?,
        is_active: r.get::<_, i64>(8)? != 0,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

/// Drawn from uuid bytes rather than a dedicated RNG; 9000 candidate ids
/// per tenant.
fn random_student_no() -> String {
    let bytes = *Uuid::new_v4().as_bytes();
    let n = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % 9000;
    (1000 + n).to_string()
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    )
}

impl TenantStore<'_> {
    /// Creates a student with a tenant-unique 4-digit student number.
    /// Allocation is insert-and-catch-duplicate: a colliding insert hits the
    /// (teacher_id, student_no) unique index and is retried with a fresh
    /// number, up to 100 attempts.
    pub fn create_student(&self, new: NewStudent) -> Result<Student, StoreError> {
        let name = new.name.trim();
        let grade = new.grade.trim();
        let location = new.location.trim();
        if name.is_empty() || grade.is_empty() || location.is_empty() {
            return Err(StoreError::validation(
                "name, grade and location are required",
            ));
        }

        for _ in 0..100 {
            let id = Uuid::new_v4().to_string();
            let student_no = random_student_no();
            let ts = now_ts();
            let inserted = self.conn.execute(
                "INSERT INTO students(id, teacher_id, student_no, name, grade, location,
                                      contact_phone, parent_name, active, created_at, updated_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
                (
                    &id,
                    self.teacher_id,
                    &student_no,
                    name,
                    grade,
                    location,
                    &new.contact_phone,
                    &new.parent_name,
                    &ts,
                    &ts,
                ),
            );
            match inserted {
                Ok(_) => {
                    return Ok(Student {
                        id,
                        teacher_id: self.teacher_id.to_string(),
                        student_no,
                        name: name.to_string(),
                        grade: grade.to_string(),
                        location: location.to_string(),
                        contact_phone: new.contact_phone.clone(),
                        parent_name: new.parent_name.clone(),
                        is_active: true,
                        created_at: ts.clone(),
                        updated_at: ts,
                    })
                }
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(StoreError::IdSpaceExhausted)
    }

    /// Active students for this tenant, name order. "All" in a filter slot
    /// means no filter, matching the API's query contract.
    pub fn list_students(&self, filter: &StudentFilter) -> Result<Vec<Student>, StoreError> {
        let mut sql = format!(
            "SELECT {STUDENT_COLS} FROM students WHERE teacher_id = ? AND active = 1"
        );
        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&self.teacher_id];
        if let Some(grade) = filter.grade.as_ref().filter(|g| g.as_str() != "All") {
            sql.push_str(" AND grade = ?");
            params.push(grade);
        }
        if let Some(location) = filter.location.as_ref().filter(|l| l.as_str() != "All") {
            sql.push_str(" AND location = ?");
            params.push(location);
        }
        sql.push_str(" ORDER BY name");

        let mut stmt = self.conn.prepare(&sql)?;
        let students = stmt
            .query_map(&params[..], row_to_student)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    pub fn get_student(&self, id: &str) -> Result<Option<Student>, StoreError> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT {STUDENT_COLS} FROM students WHERE teacher_id = ? AND id = ?"),
                (self.teacher_id, id),
                row_to_student,
            )
            .optional()?;
        Ok(found)
    }

    /// Lookup by the public 4-digit student number (QR-code scans resolve
    /// through this).
    pub fn get_student_by_no(&self, student_no: &str) -> Result<Option<Student>, StoreError> {
        let found = self
            .conn
            .query_row(
                &format!(
                    "SELECT {STUDENT_COLS} FROM students WHERE teacher_id = ? AND student_no = ?"
                ),
                (self.teacher_id, student_no),
                row_to_student,
            )
            .optional()?;
        Ok(found)
    }

    pub fn update_student(&self, id: &str, patch: StudentPatch) -> Result<Student, StoreError> {
        let Some(mut student) = self.get_student(id)? else {
            return Err(StoreError::NotFound("student"));
        };
        if let Some(v) = patch.name {
            student.name = v;
        }
        if let Some(v) = patch.grade {
            student.grade = v;
        }
        if let Some(v) = patch.location {
            student.location = v;
        }
        if let Some(v) = patch.contact_phone {
            student.contact_phone = v;
        }
        if let Some(v) = patch.parent_name {
            student.parent_name = v;
        }
        if let Some(v) = patch.is_active {
            student.is_active = v;
        }
        student.updated_at = now_ts();
        self.conn.execute(
            "UPDATE students SET name = ?, grade = ?, location = ?, contact_phone = ?,
                                 parent_name = ?, active = ?, updated_at = ?
             WHERE teacher_id = ? AND id = ?",
            (
                &student.name,
                &student.grade,
                &student.location,
                &student.contact_phone,
                &student.parent_name,
                student.is_active as i64,
                &student.updated_at,
                self.teacher_id,
                id,
            ),
        )?;
        Ok(student)
    }

    /// Soft delete: payment and attendance history stays queryable.
    pub fn deactivate_student(&self, id: &str) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE students SET active = 0, updated_at = ? WHERE teacher_id = ? AND id = ?",
            (now_ts(), self.teacher_id, id),
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("student"));
        }
        Ok(())
    }

    pub fn deactivate_all_students(&self) -> Result<usize, StoreError> {
        let changed = self.conn.execute(
            "UPDATE students SET active = 0, updated_at = ? WHERE teacher_id = ? AND active = 1",
            (now_ts(), self.teacher_id),
        )?;
        Ok(changed)
    }

    /// Permanently removes this tenant's inactive students. Payment and
    /// attendance rows referencing them are kept as history.
    pub fn purge_inactive_students(&self) -> Result<usize, StoreError> {
        let deleted = self.conn.execute(
            "DELETE FROM students WHERE teacher_id = ? AND active = 0",
            [self.teacher_id],
        )?;
        Ok(deleted)
    }
}
