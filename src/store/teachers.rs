//! Teacher accounts are the tenants themselves, so these queries are the only
//! ones that run outside `TenantStore`.

use super::{now_ts, StoreError};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub institute_name: String,
    pub location: String,
    pub created_at: String,
}

pub struct NewTeacher {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub institute_name: String,
    pub location: String,
}

#[derive(Debug, Default)]
pub struct TeacherPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub institute_name: Option<String>,
    pub location: Option<String>,
}

fn row_to_teacher(r: &rusqlite::Row<'_>) -> rusqlite::Result<Teacher> {
    Ok(Teacher {
        id: r.get(0)?,
        first_name: r.get(1)?,
        last_name: r.get(2)?,
        email: r.get(3)?,
        institute_name: r.get(4)?,
        location: r.get(5)?,
        created_at: r.get(6)?,
    })
}

const TEACHER_COLS: &str =
    "id, first_name, last_name, email, institute_name, location, created_at";

pub fn create(conn: &Connection, new: NewTeacher) -> Result<Teacher, StoreError> {
    let email = new.email.trim().to_lowercase();
    let exists: Option<i64> = conn
        .query_row("SELECT 1 FROM teachers WHERE email = ?", [&email], |r| {
            r.get(0)
        })
        .optional()?;
    if exists.is_some() {
        return Err(StoreError::Conflict(
            "A teacher with this email already exists.".to_string(),
        ));
    }

    let id = Uuid::new_v4().to_string();
    let created_at = now_ts();
    conn.execute(
        "INSERT INTO teachers(id, first_name, last_name, email, password_hash,
                              institute_name, location, created_at)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &id,
            new.first_name.trim(),
            new.last_name.trim(),
            &email,
            &new.password_hash,
            new.institute_name.trim(),
            new.location.trim(),
            &created_at,
        ),
    )?;

    Ok(Teacher {
        id,
        first_name: new.first_name.trim().to_string(),
        last_name: new.last_name.trim().to_string(),
        email,
        institute_name: new.institute_name.trim().to_string(),
        location: new.location.trim().to_string(),
        created_at,
    })
}

/// Lookup for login: profile plus the stored password hash.
pub fn find_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<(Teacher, String)>, StoreError> {
    let email = email.trim().to_lowercase();
    let found = conn
        .query_row(
            &format!("SELECT {TEACHER_COLS}, password_hash FROM teachers WHERE email = ?"),
            [&email],
            |r| {
                let teacher = row_to_teacher(r)?;
                let hash: String = r.get(7)?;
                Ok((teacher, hash))
            },
        )
        .optional()?;
    Ok(found)
}

pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Teacher>, StoreError> {
    let found = conn
        .query_row(
            &format!("SELECT {TEACHER_COLS} FROM teachers WHERE id = ?"),
            [id],
            row_to_teacher,
        )
        .optional()?;
    Ok(found)
}

pub fn update_profile(
    conn: &Connection,
    id: &str,
    patch: TeacherPatch,
) -> Result<Teacher, StoreError> {
    let Some(mut teacher) = find_by_id(conn, id)? else {
        return Err(StoreError::NotFound("teacher"));
    };
    if let Some(v) = patch.first_name {
        teacher.first_name = v.trim().to_string();
    }
    if let Some(v) = patch.last_name {
        teacher.last_name = v.trim().to_string();
    }
    if let Some(v) = patch.institute_name {
        teacher.institute_name = v.trim().to_string();
    }
    if let Some(v) = patch.location {
        teacher.location = v.trim().to_string();
    }
    conn.execute(
        "UPDATE teachers SET first_name = ?, last_name = ?, institute_name = ?, location = ?
         WHERE id = ?",
        (
            &teacher.first_name,
            &teacher.last_name,
            &teacher.institute_name,
            &teacher.location,
            id,
        ),
    )?;
    Ok(teacher)
}
