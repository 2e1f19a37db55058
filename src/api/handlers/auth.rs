use crate::api::{error::ApiError, AppState, Tenant};
use crate::auth;
use crate::store::teachers::{self, NewTeacher};
use crate::store::TeacherPatch;
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    institute_name: String,
    #[serde(default)]
    location: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let required = [
        &body.first_name,
        &body.last_name,
        &body.email,
        &body.password,
        &body.institute_name,
        &body.location,
    ];
    if required.iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::bad_request("All fields are required."));
    }

    let password_hash = auth::hash_password(&body.password)?;
    let teacher = {
        let conn = state.db.lock();
        teachers::create(
            &conn,
            NewTeacher {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                password_hash,
                institute_name: body.institute_name,
                location: body.location,
            },
        )?
    };
    let token = auth::issue_token(&teacher.id, &state.config.jwt_secret)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Teacher registered successfully",
            "token": token,
            "teacher": teacher,
        })),
    ))
}

#[derive(Deserialize)]
pub struct LoginBody {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError> {
    let found = {
        let conn = state.db.lock();
        teachers::find_by_email(&conn, &body.email)?
    };
    // A wrong email and a wrong password read the same to the client.
    let Some((teacher, hash)) = found else {
        return Err(ApiError::unauthorized("Invalid email or password."));
    };
    if !auth::verify_password(&body.password, &hash) {
        return Err(ApiError::unauthorized("Invalid email or password."));
    }
    let token = auth::issue_token(&teacher.id, &state.config.jwt_secret)?;

    Ok(Json(json!({ "token": token, "teacher": teacher })))
}

pub async fn me(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let teacher = teachers::find_by_id(&conn, &teacher_id)?
        .ok_or_else(|| ApiError::not_found("Teacher account not found."))?;
    Ok(Json(json!(teacher)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileBody {
    first_name: Option<String>,
    last_name: Option<String>,
    institute_name: Option<String>,
    location: Option<String>,
}

pub async fn update_profile(
    State(state): State<AppState>,
    Tenant(teacher_id): Tenant,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db.lock();
    let teacher = teachers::update_profile(
        &conn,
        &teacher_id,
        TeacherPatch {
            first_name: body.first_name,
            last_name: body.last_name,
            institute_name: body.institute_name,
            location: body.location,
        },
    )?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "teacher": teacher,
    })))
}
