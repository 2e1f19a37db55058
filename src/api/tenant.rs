use super::{error::ApiError, AppState};
use crate::auth;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};

/// The authenticated tenant (teacher) id, established from the bearer token.
/// Every protected handler takes this extractor; rejection is a 401.
pub struct Tenant(pub String);

impl FromRequestParts<AppState> for Tenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::unauthorized("Authentication required. No token provided.")
            })?;

        match auth::verify_token(token, &state.config.jwt_secret) {
            Some(teacher_id) => Ok(Tenant(teacher_id)),
            None => Err(ApiError::unauthorized(
                "Invalid or expired token. Please login again.",
            )),
        }
    }
}
