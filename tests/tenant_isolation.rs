mod test_support;

use axum::http::StatusCode;
use serde_json::json;
use test_support::{create_student, register_teacher, request, test_app};

#[tokio::test]
async fn listings_only_show_the_callers_students() {
    let app = test_app();
    let alice = register_teacher(&app, "alice@example.com").await;
    let bob = register_teacher(&app, "bob@example.com").await;

    create_student(&app, &alice, "Amal", "Grade 6", "Main Hall").await;
    create_student(&app, &alice, "Bimal", "Grade 6", "Main Hall").await;
    create_student(&app, &bob, "Chamari", "Grade 6", "Main Hall").await;

    let (_, alices) = request(&app, "GET", "/api/students", Some(&alice), None).await;
    assert_eq!(alices.as_array().map(|a| a.len()), Some(2));
    let (_, bobs) = request(&app, "GET", "/api/students", Some(&bob), None).await;
    assert_eq!(bobs.as_array().map(|a| a.len()), Some(1));
    assert_eq!(bobs[0]["name"].as_str(), Some("Chamari"));
}

#[tokio::test]
async fn foreign_ids_read_as_not_found() {
    let app = test_app();
    let alice = register_teacher(&app, "alice@example.com").await;
    let bob = register_teacher(&app, "bob@example.com").await;

    let student = create_student(&app, &alice, "Amal", "Grade 6", "Main Hall").await;
    let id = student["id"].as_str().expect("id");
    let student_no = student["studentId"].as_str().expect("studentId");

    let (status, _) =
        request(&app, "GET", &format!("/api/students/{id}"), Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/students/studentId/{student_no}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "PATCH",
        &format!("/api/students/{id}"),
        Some(&bob),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/students/{id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A forged id in a payment mark reads the same way.
    let (status, _) = request(
        &app,
        "POST",
        "/api/payments/mark",
        Some(&bob),
        Some(json!({ "studentId": id, "month": "January", "year": 2026, "status": "Paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn resets_only_touch_the_callers_data() {
    let app = test_app();
    let alice = register_teacher(&app, "alice@example.com").await;
    let bob = register_teacher(&app, "bob@example.com").await;

    let a = create_student(&app, &alice, "Amal", "Grade 6", "Main Hall").await;
    let b = create_student(&app, &bob, "Chamari", "Grade 6", "Main Hall").await;
    for (token, student) in [(&alice, &a), (&bob, &b)] {
        let id = student["id"].as_str().expect("id");
        let (status, _) = request(
            &app,
            "POST",
            "/api/payments/mark",
            Some(token),
            Some(json!({ "studentId": id, "month": "January", "year": 2026, "status": "Paid", "amount": 4000 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = request(&app, "DELETE", "/api/payments/reset", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"].as_i64(), Some(1));

    // Bob's record is untouched.
    let bob_id = b["id"].as_str().expect("id");
    let (_, payments) = request(
        &app,
        "GET",
        &format!("/api/payments/student/{bob_id}"),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(payments.as_array().map(|a| a.len()), Some(1));
}

#[tokio::test]
async fn each_tenant_can_use_the_same_location_name() {
    let app = test_app();
    let alice = register_teacher(&app, "alice@example.com").await;
    let bob = register_teacher(&app, "bob@example.com").await;

    for token in [&alice, &bob] {
        let (status, _) = request(
            &app,
            "POST",
            "/api/locations",
            Some(token),
            Some(json!({ "name": "Main Hall" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, alices) = request(&app, "GET", "/api/locations", Some(&alice), None).await;
    assert_eq!(alices.as_array().map(|a| a.len()), Some(1));
}
