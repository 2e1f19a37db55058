mod test_support;

use axum::http::StatusCode;
use serde_json::json;
use test_support::{create_student, register_teacher, request, test_app};

async fn mark_day(
    app: &axum::Router,
    token: &str,
    student_id: &str,
    date: &str,
    status: &str,
) -> (StatusCode, serde_json::Value) {
    request(
        app,
        "POST",
        "/api/attendance/mark",
        Some(token),
        Some(json!({ "studentId": student_id, "date": date, "status": status })),
    )
    .await
}

#[tokio::test]
async fn marking_the_same_day_twice_keeps_one_record() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;
    let student = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let id = student["id"].as_str().expect("id");

    let (status, first) = mark_day(&app, &token, id, "2026-02-10", "Present").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, second) = mark_day(&app, &token, id, "2026-02-10", "Absent").await;
    assert_eq!(status, StatusCode::CREATED);

    assert_eq!(first["id"], second["id"], "expected an in-place overwrite");
    assert_eq!(second["status"].as_str(), Some("Absent"));

    let (_, history) = request(
        &app,
        "GET",
        &format!("/api/attendance/student/{id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(history.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn an_rfc3339_time_resolves_to_the_same_day() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;
    let student = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let id = student["id"].as_str().expect("id");

    let (_, first) = mark_day(&app, &token, id, "2026-02-10", "Present").await;
    let (_, second) = mark_day(&app, &token, id, "2026-02-10T14:30:00Z", "Absent").await;
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn different_days_get_different_records() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;
    let student = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let id = student["id"].as_str().expect("id");

    mark_day(&app, &token, id, "2026-02-10", "Present").await;
    mark_day(&app, &token, id, "2026-02-11", "Present").await;

    let (_, history) = request(
        &app,
        "GET",
        &format!("/api/attendance/student/{id}"),
        Some(&token),
        None,
    )
    .await;
    let history = history.as_array().expect("array");
    assert_eq!(history.len(), 2);
    // Newest first.
    assert!(history[0]["date"].as_str() > history[1]["date"].as_str());
}

#[tokio::test]
async fn plain_create_snapshots_grade_and_location() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;
    let student = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let id = student["id"].as_str().expect("id");

    let (status, record) = request(
        &app,
        "POST",
        "/api/attendance",
        Some(&token),
        Some(json!({ "studentId": id, "date": "2026-02-10", "status": "Present" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["classGrade"].as_str(), Some("Grade 6"));
    assert_eq!(record["location"].as_str(), Some("Main Hall"));
    assert_eq!(record["student"].as_str(), Some(id));
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;
    let student = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let id = student["id"].as_str().expect("id");

    let (status, _) = mark_day(&app, &token, id, "not-a-date", "Present").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = mark_day(&app, &token, id, "2026-02-10", "Sleeping").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = request(
        &app,
        "POST",
        "/api/attendance",
        Some(&token),
        Some(json!({ "studentId": "no-such-student", "date": "2026-02-10", "status": "Present" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
