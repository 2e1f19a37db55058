use crate::api::{error::ApiError, AppState, Tenant};
use crate::store::{
    AttendanceRecord, AttendanceStatus, ClassAttendanceRow, SummaryRow, TenantStore,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

fn parse_status(raw: &str) -> Result<AttendanceStatus, ApiError> {
    AttendanceStatus::parse(raw)
        .ok_or_else(|| ApiError::bad_request("status must be Present or Absent"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    student_id: Option<String>,
    date: Option<String>,
    status: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<AttendanceRecord>), ApiError> {
    let (Some(student_id), Some(date), Some(status_raw)) =
        (body.student_id, body.date, body.status)
    else {
        return Err(ApiError::bad_request(
            "studentId, date and status are required.",
        ));
    };
    let status = parse_status(&status_raw)?;

    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let record = store.create_attendance(&student_id, &date, status)?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
    student_id: Option<String>,
    date: Option<String>,
    status: Option<String>,
    class_grade: Option<String>,
    location: Option<String>,
}

pub async fn mark(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Json(body): Json<MarkBody>,
) -> Result<(StatusCode, Json<AttendanceRecord>), ApiError> {
    let (Some(student_id), Some(date), Some(status_raw)) =
        (body.student_id, body.date, body.status)
    else {
        return Err(ApiError::bad_request(
            "studentId, date and status are required.",
        ));
    };
    let status = parse_status(&status_raw)?;

    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let record =
        store.mark_attendance(&student_id, &date, status, body.class_grade, body.location)?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[derive(Deserialize)]
pub struct ClassQuery {
    date: Option<String>,
    grade: Option<String>,
    location: Option<String>,
}

pub async fn class_view(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Query(query): Query<ClassQuery>,
) -> Result<Json<Vec<ClassAttendanceRow>>, ApiError> {
    let (Some(date), Some(grade), Some(location)) = (query.date, query.grade, query.location)
    else {
        return Err(ApiError::bad_request(
            "Please provide date, grade, and location",
        ));
    };
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let rows = store.class_attendance(&date, &grade, &location)?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

pub async fn student_history(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Path(id): Path<String>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let records =
        store.student_attendance(&id, query.start_date.as_deref(), query.end_date.as_deref())?;
    Ok(Json(records))
}

pub async fn summary(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<SummaryRow>>, ApiError> {
    let (Some(start), Some(end)) = (query.start_date, query.end_date) else {
        return Err(ApiError::bad_request("Start/end date required."));
    };
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let rows = store.attendance_summary(&start, &end)?;
    Ok(Json(rows))
}

pub async fn reset(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let deleted = store.reset_attendance()?;
    Ok(Json(json!({
        "message": format!("Reset attendance. Deleted {deleted} records."),
        "deletedCount": deleted,
    })))
}
