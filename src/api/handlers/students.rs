use crate::api::{error::ApiError, AppState, Tenant};
use crate::store::{NewStudent, StoreError, Student, StudentFilter, StudentPatch, TenantStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    grade: String,
    #[serde(default)]
    location: String,
    contact_phone: Option<String>,
    parent_name: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Json(body): Json<CreateStudentBody>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let student = store.create_student(NewStudent {
        name: body.name,
        grade: body.grade,
        location: body.location,
        contact_phone: body.contact_phone,
        parent_name: body.parent_name,
    })?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    grade: Option<String>,
    location: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let students = store.list_students(&StudentFilter {
        grade: query.grade,
        location: query.location,
    })?;
    Ok(Json(students))
}

pub async fn get(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Path(id): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let student = store
        .get_student(&id)?
        .ok_or(StoreError::NotFound("student"))?;
    Ok(Json(student))
}

pub async fn get_by_student_no(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Path(student_no): Path<String>,
) -> Result<Json<Student>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let student = store
        .get_student_by_no(&student_no)?
        .ok_or(StoreError::NotFound("student"))?;
    Ok(Json(student))
}

/// Whitelisted patch. `teacherId` and `studentId` are not fields of this body,
/// so they are dropped before the update ever sees them.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentBody {
    name: Option<String>,
    grade: Option<String>,
    location: Option<String>,
    contact_phone: Option<String>,
    parent_name: Option<String>,
    is_active: Option<bool>,
}

pub async fn update(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Path(id): Path<String>,
    Json(body): Json<UpdateStudentBody>,
) -> Result<Json<Student>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let student = store.update_student(
        &id,
        StudentPatch {
            name: body.name,
            grade: body.grade,
            location: body.location,
            contact_phone: body.contact_phone.map(Some),
            parent_name: body.parent_name.map(Some),
            is_active: body.is_active,
        },
    )?;
    Ok(Json(student))
}

pub async fn deactivate(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    store.deactivate_student(&id)?;
    Ok(Json(json!({ "message": "Deactivated Student" })))
}

pub async fn reset(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let modified = store.deactivate_all_students()?;
    Ok(Json(json!({
        "message": format!(
            "Successfully deactivated all students. Updated {modified} student records."
        ),
        "modifiedCount": modified,
    })))
}

pub async fn purge_inactive(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let deleted = store.purge_inactive_students()?;
    Ok(Json(json!({
        "message": format!("Removed {deleted} inactive student records."),
        "deletedCount": deleted,
    })))
}
