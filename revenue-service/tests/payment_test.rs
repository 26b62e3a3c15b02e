//! Payment settlement tests for revenue-service.

mod common;

use common::{TestApp, decimal};
use revenue_service::models::Profile;
use rust_decimal::Decimal;
use serde_json::json;

/// File an assessment for the taxpayer and return its id.
async fn file_assessment(app: &TestApp, taxpayer: &Profile, income: &str) -> String {
    let response = app
        .post_json(
            "/assessments",
            taxpayer,
            &json!({
                "tax_type": "personal_income",
                "period": "2024-Q3",
                "taxable_income": income
            }),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    body["assessment_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn settle_marks_paid_and_records_one_payment() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let assessment_id = file_assessment(&app, &taxpayer, "100000").await;

    let response = app
        .post_json(
            &format!("/assessments/{}/payments", assessment_id),
            &taxpayer,
            &json!({"amount": "15000"}),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let payment: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(decimal(&payment["amount"]), Decimal::from(15_000));
    assert!(
        payment["receipt_reference"]
            .as_str()
            .unwrap()
            .starts_with("RCPT-")
    );

    let fetched = app
        .get(&format!("/assessments/{}", assessment_id), &taxpayer)
        .await;
    let fetched: serde_json::Value = fetched.json().await.expect("Invalid JSON");
    assert_eq!(fetched["status"], "paid");

    let payments = app
        .db
        .list_payments_for_taxpayer(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert_eq!(payments.len(), 1);

    let inbox = app
        .db
        .list_notifications_for_user(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert!(inbox.iter().any(|n| n.title == "Payment Successful"));

    app.cleanup().await;
}

#[tokio::test]
async fn settling_twice_fails_the_second_attempt() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let assessment_id = file_assessment(&app, &taxpayer, "10000").await;

    let first = app
        .post_json(
            &format!("/assessments/{}/payments", assessment_id),
            &taxpayer,
            &json!({"amount": "1500"}),
        )
        .await;
    assert_eq!(first.status(), reqwest::StatusCode::CREATED);

    let second = app
        .post_json(
            &format!("/assessments/{}/payments", assessment_id),
            &taxpayer,
            &json!({"amount": "1500"}),
        )
        .await;
    assert_eq!(second.status(), reqwest::StatusCode::CONFLICT);

    let payments = app
        .db
        .list_payments_for_taxpayer(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert_eq!(payments.len(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn concurrent_settles_have_exactly_one_winner() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let assessment_id = file_assessment(&app, &taxpayer, "10000").await;

    let path = format!("/assessments/{}/payments", assessment_id);
    let body_a = json!({"amount": "1500"});
    let body_b = json!({"amount": "1500"});
    let (a, b) = tokio::join!(
        app.post_json(&path, &taxpayer, &body_a),
        app.post_json(&path, &taxpayer, &body_b)
    );

    let statuses = [a.status(), b.status()];
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == reqwest::StatusCode::CREATED)
            .count(),
        1,
        "exactly one settle must win, got {:?}",
        statuses
    );

    let payments = app
        .db
        .list_payments_for_taxpayer(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert_eq!(payments.len(), 1);

    app.cleanup().await;
}

#[tokio::test]
async fn settling_someone_elses_assessment_is_forbidden() {
    let app = TestApp::spawn().await;
    let owner = app.seed_taxpayer().await;
    let intruder = app.seed_taxpayer().await;
    let assessment_id = file_assessment(&app, &owner, "10000").await;

    let response = app
        .post_json(
            &format!("/assessments/{}/payments", assessment_id),
            &intruder,
            &json!({"amount": "1500"}),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    // No partial effects: still open, no payment row
    let fetched = app
        .get(&format!("/assessments/{}", assessment_id), &owner)
        .await;
    let fetched: serde_json::Value = fetched.json().await.expect("Invalid JSON");
    assert_eq!(fetched["status"], "assessed");

    let payments = app
        .db
        .list_payments_for_taxpayer(owner.profile_id)
        .await
        .expect("list failed");
    assert!(payments.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn high_value_settlement_alerts_every_admin() {
    let app = TestApp::spawn().await;
    let admin_one = app.seed_admin().await;
    let admin_two = app.seed_admin().await;
    let taxpayer = app.seed_taxpayer().await;

    // The recorded amount is the caller's, taken verbatim
    let assessment_id = file_assessment(&app, &taxpayer, "100000").await;
    let response = app
        .post_json(
            &format!("/assessments/{}/payments", assessment_id),
            &taxpayer,
            &json!({"amount": "60000"}),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let payment: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(decimal(&payment["amount"]), Decimal::from(60_000));

    for admin in [&admin_one, &admin_two] {
        let inbox = app
            .db
            .list_notifications_for_user(admin.profile_id)
            .await
            .expect("list failed");
        let alerts: Vec<_> = inbox
            .iter()
            .filter(|n| n.title == "High Value Transaction")
            .collect();
        assert_eq!(alerts.len(), 1, "each admin gets exactly one alert");
        assert!(alerts[0].message.contains(&taxpayer.profile_id.to_string()));
    }

    let inbox = app
        .db
        .list_notifications_for_user(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert!(inbox.iter().any(|n| n.title == "Payment Successful"));

    app.cleanup().await;
}

#[tokio::test]
async fn settlement_at_threshold_does_not_alert_admins() {
    let app = TestApp::spawn().await;
    let admin = app.seed_admin().await;
    let taxpayer = app.seed_taxpayer().await;

    let assessment_id = file_assessment(&app, &taxpayer, "100000").await;
    let response = app
        .post_json(
            &format!("/assessments/{}/payments", assessment_id),
            &taxpayer,
            &json!({"amount": "50000"}),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let inbox = app
        .db
        .list_notifications_for_user(admin.profile_id)
        .await
        .expect("list failed");
    assert!(!inbox.iter().any(|n| n.title == "High Value Transaction"));

    app.cleanup().await;
}

#[tokio::test]
async fn payment_history_is_newest_first() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    for income in ["1000", "2000"] {
        let assessment_id = file_assessment(&app, &taxpayer, income).await;
        let response = app
            .post_json(
                &format!("/assessments/{}/payments", assessment_id),
                &taxpayer,
                &json!({"amount": "100"}),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    let response = app.get("/payments", &taxpayer).await;
    let body: Vec<serde_json::Value> = response.json().await.expect("Invalid JSON");
    assert_eq!(body.len(), 2);

    let first = body[0]["created_utc"].as_str().unwrap();
    let second = body[1]["created_utc"].as_str().unwrap();
    assert!(first >= second);

    app.cleanup().await;
}
