use super::{now_ts, StoreError, TenantStore};
use rusqlite::{ErrorCode, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

/// Locations are referenced by name (not id) from students and attendance
/// snapshots, so deleting one does not touch the rows that mention it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub teacher_id: String,
    pub name: String,
    pub created_at: String,
}

impl TenantStore<'_> {
    pub fn list_locations(&self) -> Result<Vec<Location>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, teacher_id, name, created_at FROM locations
             WHERE teacher_id = ? ORDER BY name",
        )?;
        let locations = stmt
            .query_map([self.teacher_id], |r| {
                Ok(Location {
                    id: r.get(0)?,
                    teacher_id: r.get(1)?,
                    name: r.get(2)?,
                    created_at: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(locations)
    }

    pub fn create_location(&self, name: &str) -> Result<Location, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::validation("name is required"));
        }
        let id = Uuid::new_v4().to_string();
        let created_at = now_ts();
        let inserted = self.conn.execute(
            "INSERT INTO locations(id, teacher_id, name, created_at) VALUES(?, ?, ?, ?)",
            (&id, self.teacher_id, name, &created_at),
        );
        match inserted {
            Ok(_) => Ok(Location {
                id,
                teacher_id: self.teacher_id.to_string(),
                name: name.to_string(),
                created_at,
            }),
            Err(e) if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => Err(
                StoreError::Conflict(format!("A location named \"{name}\" already exists.")),
            ),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_location(&self, id: &str) -> Result<(), StoreError> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM locations WHERE teacher_id = ? AND id = ?",
                (self.teacher_id, id),
                |r| r.get(0),
            )
            .optional()?;
        if found.is_none() {
            return Err(StoreError::NotFound("location"));
        }
        self.conn.execute(
            "DELETE FROM locations WHERE teacher_id = ? AND id = ?",
            (self.teacher_id, id),
        )?;
        Ok(())
    }
}
