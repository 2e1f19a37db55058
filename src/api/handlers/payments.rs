use crate::api::{error::ApiError, AppState, Tenant};
use crate::store::{
    MarkPayment, Payment, PaymentStatus, StatusRow, StudentFilter, TenantStore,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct StatusListQuery {
    month: Option<String>,
    year: Option<i64>,
    grade: Option<String>,
    location: Option<String>,
}

pub async fn status_list(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Query(query): Query<StatusListQuery>,
) -> Result<Json<Vec<StatusRow>>, ApiError> {
    let (Some(month), Some(year)) = (query.month, query.year) else {
        return Err(ApiError::bad_request("Month and Year are required."));
    };
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let rows = store.payment_status_list(
        &month,
        year,
        &StudentFilter {
            grade: query.grade,
            location: query.location,
        },
    )?;
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkBody {
    student_id: Option<String>,
    month: Option<String>,
    year: Option<i64>,
    status: Option<String>,
    amount: Option<f64>,
}

pub async fn mark(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Json(body): Json<MarkBody>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let (Some(student_id), Some(month), Some(year), Some(status_raw)) =
        (body.student_id, body.month, body.year, body.status)
    else {
        return Err(ApiError::bad_request(
            "studentId, month, year and status are required.",
        ));
    };
    let Some(status) = PaymentStatus::parse(&status_raw) else {
        return Err(ApiError::bad_request(
            "status must be one of Paid, Pending, Overdue",
        ));
    };

    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let payment = store.mark_payment(MarkPayment {
        student_id,
        month,
        year,
        status,
        amount: body.amount,
    })?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn reset(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let deleted = store.reset_payments()?;
    Ok(Json(json!({
        "message": format!(
            "Successfully reset finance data. Deleted {deleted} payment records."
        ),
        "deletedCount": deleted,
    })))
}

/// Billing history for one student. Works for deactivated (and even purged)
/// students: history outlives the student row.
pub async fn student_history(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Path(id): Path<String>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let payments = store.payments_for_student(&id)?;
    Ok(Json(payments))
}
