use crate::api::{error::ApiError, AppState, Tenant};
use crate::store::{DashboardSummary, FinanceFilter, FinanceReport, TenantStore};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct FinanceQuery {
    month: Option<String>,
    year: Option<String>,
    grade: Option<String>,
    location: Option<String>,
}

pub async fn finance(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Query(query): Query<FinanceQuery>,
) -> Result<Json<FinanceReport>, ApiError> {
    // Year arrives as a string so "All" can ride in the same slot.
    let year = match query.year.as_deref() {
        None | Some("All") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::bad_request("year must be a number or \"All\""))?,
        ),
    };
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let report = store.finance_report(&FinanceFilter {
        month: query.month,
        year,
        grade: query.grade,
        location: query.location,
    })?;
    Ok(Json(report))
}

pub async fn dashboard(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
) -> Result<Json<DashboardSummary>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    Ok(Json(store.dashboard()?))
}
