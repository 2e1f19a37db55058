use crate::api::{error::ApiError, AppState, Tenant};
use crate::store::{Location, TenantStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

pub async fn list(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
) -> Result<Json<Vec<Location>>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    Ok(Json(store.list_locations()?))
}

#[derive(Deserialize)]
pub struct CreateLocationBody {
    #[serde(default)]
    name: String,
}

pub async fn create(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Json(body): Json<CreateLocationBody>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    let location = store.create_location(&body.name)?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn remove(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let store = TenantStore::new(&conn, &teacher_id);
    store.delete_location(&id)?;
    Ok(Json(json!({ "message": "Deleted Location" })))
}
