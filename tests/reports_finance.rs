mod test_support;

use axum::http::StatusCode;
use serde_json::json;
use test_support::{create_student, register_teacher, request, test_app};

async fn mark_paid(
    app: &axum::Router,
    token: &str,
    student_id: &str,
    month: &str,
    year: i64,
    status: &str,
    amount: f64,
) {
    let (code, body) = request(
        app,
        "POST",
        "/api/payments/mark",
        Some(token),
        Some(json!({
            "studentId": student_id,
            "month": month,
            "year": year,
            "status": status,
            "amount": amount,
        })),
    )
    .await;
    assert_eq!(code, StatusCode::CREATED, "mark failed: {body}");
}

#[tokio::test]
async fn report_counts_only_paid_payments() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;

    let amal = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let bimal = create_student(&app, &token, "Bimal", "Grade 6", "Main Hall").await;
    let amal_id = amal["id"].as_str().expect("id");
    let bimal_id = bimal["id"].as_str().expect("id");

    mark_paid(&app, &token, amal_id, "January", 2026, "Paid", 5000.0).await;
    mark_paid(&app, &token, bimal_id, "January", 2026, "Overdue", 5000.0).await;

    let (status, report) =
        request(&app, "GET", "/api/reports/finance", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["grandTotal"]["totalIncome"].as_f64(), Some(5000.0));
    assert_eq!(report["grandTotal"]["totalStudentsPaid"].as_i64(), Some(1));

    let breakdown = report["breakdown"].as_array().expect("breakdown");
    assert_eq!(breakdown.len(), 1);
    assert_eq!(breakdown[0]["month"].as_str(), Some("January"));
    assert_eq!(breakdown[0]["grade"].as_str(), Some("Grade 6"));
    assert_eq!(breakdown[0]["location"].as_str(), Some("Main Hall"));
    assert_eq!(breakdown[0]["studentsPaid"].as_i64(), Some(1));
}

#[tokio::test]
async fn breakdown_groups_by_period_grade_and_location() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;

    let amal = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let bimal = create_student(&app, &token, "Bimal", "Grade 6", "Main Hall").await;
    let chamari = create_student(&app, &token, "Chamari", "Grade 7", "Annex").await;

    mark_paid(&app, &token, amal["id"].as_str().expect("id"), "January", 2026, "Paid", 5000.0)
        .await;
    mark_paid(&app, &token, bimal["id"].as_str().expect("id"), "January", 2026, "Paid", 5000.0)
        .await;
    mark_paid(
        &app,
        &token,
        chamari["id"].as_str().expect("id"),
        "January",
        2026,
        "Paid",
        6000.0,
    )
    .await;
    mark_paid(&app, &token, amal["id"].as_str().expect("id"), "February", 2026, "Paid", 5000.0)
        .await;

    let (_, report) = request(&app, "GET", "/api/reports/finance", Some(&token), None).await;
    let breakdown = report["breakdown"].as_array().expect("breakdown");
    assert_eq!(breakdown.len(), 3);
    assert_eq!(report["grandTotal"]["totalIncome"].as_f64(), Some(21000.0));
    assert_eq!(report["grandTotal"]["totalStudentsPaid"].as_i64(), Some(4));

    let g6_jan = breakdown
        .iter()
        .find(|r| r["month"] == "January" && r["grade"] == "Grade 6")
        .expect("grade 6 january cell");
    assert_eq!(g6_jan["totalIncome"].as_f64(), Some(10000.0));
    assert_eq!(g6_jan["studentsPaid"].as_i64(), Some(2));
}

#[tokio::test]
async fn filters_narrow_the_report_and_all_is_a_wildcard() {
    let app = test_app();
    let token = register_teacher(&app, "t@example.com").await;

    let amal = create_student(&app, &token, "Amal", "Grade 6", "Main Hall").await;
    let chamari = create_student(&app, &token, "Chamari", "Grade 7", "Annex").await;
    mark_paid(&app, &token, amal["id"].as_str().expect("id"), "January", 2026, "Paid", 5000.0)
        .await;
    mark_paid(
        &app,
        &token,
        chamari["id"].as_str().expect("id"),
        "January",
        2026,
        "Paid",
        6000.0,
    )
    .await;

    let (_, narrowed) = request(
        &app,
        "GET",
        "/api/reports/finance?grade=Grade%207&month=January&year=2026",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(narrowed["grandTotal"]["totalIncome"].as_f64(), Some(6000.0));
    assert_eq!(narrowed["breakdown"].as_array().map(|a| a.len()), Some(1));

    let (_, wild) = request(
        &app,
        "GET",
        "/api/reports/finance?grade=All&location=All&month=All",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(wild["grandTotal"]["totalIncome"].as_f64(), Some(11000.0));
}

#[tokio::test]
async fn report_is_tenant_scoped() {
    let app = test_app();
    let alice = register_teacher(&app, "alice@example.com").await;
    let bob = register_teacher(&app, "bob@example.com").await;

    let a = create_student(&app, &alice, "Amal", "Grade 6", "Main Hall").await;
    let b = create_student(&app, &bob, "Chamari", "Grade 6", "Main Hall").await;
    mark_paid(&app, &alice, a["id"].as_str().expect("id"), "January", 2026, "Paid", 5000.0).await;
    mark_paid(&app, &bob, b["id"].as_str().expect("id"), "January", 2026, "Paid", 9000.0).await;

    let (_, alices) = request(&app, "GET", "/api/reports/finance", Some(&alice), None).await;
    assert_eq!(alices["grandTotal"]["totalIncome"].as_f64(), Some(5000.0));
}
