#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tutiond::{
    api::{self, AppState},
    config::Config,
    db,
};

/// Full application router over a fresh in-memory database.
pub fn test_app() -> Router {
    let conn = db::open_in_memory().expect("open in-memory db");
    let config = Config {
        db_path: ":memory:".into(),
        jwt_secret: "test-secret".to_string(),
        port: 0,
        cors_origins: Vec::new(),
    };
    api::router(AppState::new(conn, config))
}

pub async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(v) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(v.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let resp = app.clone().oneshot(req).await.expect("send request");
    let status = resp.status();
    let bytes = resp
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse response json")
    };
    (status, value)
}

/// Registers a teacher account and returns its bearer token.
pub async fn register_teacher(app: &Router, email: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "firstName": "Nadeesha",
            "lastName": "Perera",
            "email": email,
            "password": "pw-123456",
            "instituteName": "Sunrise Tuition",
            "location": "Colombo",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["token"].as_str().expect("token").to_string()
}

/// Creates a student and returns the response document.
pub async fn create_student(
    app: &Router,
    token: &str,
    name: &str,
    grade: &str,
    location: &str,
) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/api/students",
        Some(token),
        Some(json!({ "name": name, "grade": grade, "location": location })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create student failed: {body}");
    body
}
