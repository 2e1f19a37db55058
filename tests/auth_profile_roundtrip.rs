mod test_support;

use axum::http::StatusCode;
use serde_json::json;
use test_support::{register_teacher, request, test_app};

#[tokio::test]
async fn register_login_me_roundtrip() {
    let app = test_app();
    let token = register_teacher(&app, "amara@example.com").await;

    let (status, me) = request(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"].as_str(), Some("amara@example.com"));
    assert_eq!(me["firstName"].as_str(), Some("Nadeesha"));
    assert_eq!(me["instituteName"].as_str(), Some("Sunrise Tuition"));
    assert!(
        me.get("password").is_none() && me.get("passwordHash").is_none(),
        "profile must not leak the password hash: {me}"
    );

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "amara@example.com", "password": "pw-123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["teacher"]["email"].as_str(), Some("amara@example.com"));
}

#[tokio::test]
async fn duplicate_email_rejected() {
    let app = test_app();
    let _ = register_teacher(&app, "amara@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "firstName": "Other",
            "lastName": "Teacher",
            "email": "amara@example.com",
            "password": "pw-different",
            "instituteName": "Elsewhere",
            "location": "Kandy",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"].as_str(),
        Some("A teacher with this email already exists.")
    );
}

#[tokio::test]
async fn wrong_password_and_unknown_email_read_the_same() {
    let app = test_app();
    let _ = register_teacher(&app, "amara@example.com").await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "amara@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let wrong_pw_message = body["message"].as_str().map(|s| s.to_string());

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"].as_str().map(|s| s.to_string()), wrong_pw_message);
}

#[tokio::test]
async fn profile_update_is_whitelisted() {
    let app = test_app();
    let token = register_teacher(&app, "amara@example.com").await;

    let (status, body) = request(
        &app,
        "PUT",
        "/api/auth/update",
        Some(&token),
        Some(json!({
            "instituteName": "Sunrise Tuition Center",
            "location": "Galle",
            "email": "hijack@example.com",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    assert_eq!(
        body["teacher"]["instituteName"].as_str(),
        Some("Sunrise Tuition Center")
    );
    assert_eq!(body["teacher"]["location"].as_str(), Some("Galle"));
    // Email is not a patchable field.
    assert_eq!(body["teacher"]["email"].as_str(), Some("amara@example.com"));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = test_app();

    let (status, body) = request(&app, "GET", "/api/students", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"].as_str(),
        Some("Authentication required. No token provided.")
    );

    let (status, body) =
        request(&app, "GET", "/api/students", Some("not-a-real-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"].as_str(),
        Some("Invalid or expired token. Please login again.")
    );
}
