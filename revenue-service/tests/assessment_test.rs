//! Assessment engine tests for revenue-service.

mod common;

use chrono::{Days, NaiveDate, Utc};
use common::{TestApp, decimal};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;

#[tokio::test]
async fn self_filing_computes_liability_from_configured_rate() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    // Seeded rate for personal income is 15%
    let response = app
        .post_json(
            "/assessments",
            &taxpayer,
            &json!({
                "tax_type": "personal_income",
                "period": "2024-Q3",
                "taxable_income": "100000"
            }),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");

    assert_eq!(decimal(&body["amount_due"]), Decimal::from(15_000));
    assert_eq!(decimal(&body["tax_rate_applied"]), Decimal::from(15));
    assert_eq!(body["status"], "assessed");

    let today = Utc::now().date_naive();
    let expected_due = today.checked_add_days(Days::new(30)).unwrap();
    let due_date = NaiveDate::from_str(body["due_date"].as_str().unwrap()).unwrap();
    assert_eq!(due_date, expected_due);

    app.cleanup().await;
}

#[tokio::test]
async fn filing_notifies_the_taxpayer() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    let response = app
        .post_json(
            "/assessments",
            &taxpayer,
            &json!({
                "tax_type": "business",
                "period": "2024-FY",
                "taxable_income": "250000"
            }),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let inbox = app
        .db
        .list_notifications_for_user(taxpayer.profile_id)
        .await
        .expect("list failed");
    let issued: Vec<_> = inbox
        .iter()
        .filter(|n| n.title == "New Tax Assessment")
        .collect();
    assert_eq!(issued.len(), 1);
    assert!(issued[0].message.contains("2024-FY"));

    app.cleanup().await;
}

#[tokio::test]
async fn missing_rate_configuration_writes_nothing() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    // Remove the category's rate row entirely
    sqlx::query("DELETE FROM tax_configurations WHERE tax_type = 'withholding'")
        .execute(app.db.pool())
        .await
        .expect("delete failed");

    let response = app
        .post_json(
            "/assessments",
            &taxpayer,
            &json!({
                "tax_type": "withholding",
                "period": "2024-Q2",
                "taxable_income": "10000"
            }),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let rows = app
        .db
        .list_assessments_for_taxpayer(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert!(rows.is_empty());

    // And no notification was issued for the failed filing
    let inbox = app
        .db
        .list_notifications_for_user(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert!(inbox.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn negative_income_is_rejected_before_any_write() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    let response = app
        .post_json(
            "/assessments",
            &taxpayer,
            &json!({
                "tax_type": "personal_income",
                "period": "2024-Q3",
                "taxable_income": "-1"
            }),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::UNPROCESSABLE_ENTITY);

    let rows = app
        .db
        .list_assessments_for_taxpayer(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert!(rows.is_empty());

    app.cleanup().await;
}

#[tokio::test]
async fn taxpayer_cannot_assess_someone_else() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let victim = app.seed_taxpayer().await;

    let response = app
        .post_json(
            "/assessments",
            &taxpayer,
            &json!({
                "taxpayer_id": victim.profile_id,
                "tax_type": "personal_income",
                "period": "2024-Q3",
                "taxable_income": "1"
            }),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    app.cleanup().await;
}

#[tokio::test]
async fn officer_raises_manual_assessment_for_taxpayer() {
    let app = TestApp::spawn().await;
    let officer = app.seed_officer().await;
    let taxpayer = app.seed_taxpayer().await;

    let response = app
        .post_json(
            "/assessments",
            &officer,
            &json!({
                "taxpayer_id": taxpayer.profile_id,
                "tax_type": "business",
                "period": "2023-FY",
                "taxable_income": "80000"
            }),
        )
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(
        body["taxpayer_id"].as_str().unwrap(),
        taxpayer.profile_id.to_string()
    );

    // The assessed taxpayer, not the officer, gets the notice
    let inbox = app
        .db
        .list_notifications_for_user(taxpayer.profile_id)
        .await
        .expect("list failed");
    assert!(inbox.iter().any(|n| n.title == "New Tax Assessment"));

    app.cleanup().await;
}

#[tokio::test]
async fn own_listing_is_ordered_by_due_date_descending() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    for period in ["2024-Q1", "2024-Q2", "2024-Q3"] {
        let response = app
            .post_json(
                "/assessments",
                &taxpayer,
                &json!({
                    "tax_type": "personal_income",
                    "period": period,
                    "taxable_income": "1000"
                }),
            )
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    }

    // Push one row's due date into the past directly
    sqlx::query(
        "UPDATE assessments SET due_date = due_date - INTERVAL '90 days' WHERE period = '2024-Q1'",
    )
    .execute(app.db.pool())
    .await
    .expect("update failed");

    let response = app.get("/assessments", &taxpayer).await;
    let body: Vec<serde_json::Value> = response.json().await.expect("Invalid JSON");
    assert_eq!(body.len(), 3);

    let due_dates: Vec<NaiveDate> = body
        .iter()
        .map(|a| NaiveDate::from_str(a["due_date"].as_str().unwrap()).unwrap())
        .collect();
    let mut sorted = due_dates.clone();
    sorted.sort();
    sorted.reverse();
    assert_eq!(due_dates, sorted);

    app.cleanup().await;
}

#[tokio::test]
async fn open_assessment_past_due_reports_overdue() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    let response = app
        .post_json(
            "/assessments",
            &taxpayer,
            &json!({
                "tax_type": "personal_income",
                "period": "2023-Q4",
                "taxable_income": "5000"
            }),
        )
        .await;
    let created: serde_json::Value = response.json().await.expect("Invalid JSON");
    let id = created["assessment_id"].as_str().unwrap().to_string();

    sqlx::query("UPDATE assessments SET due_date = '2020-01-01' WHERE assessment_id = $1::uuid")
        .bind(&id)
        .execute(app.db.pool())
        .await
        .expect("update failed");

    let response = app.get(&format!("/assessments/{}", id), &taxpayer).await;
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["status"], "overdue");

    // The stored row still says assessed; overdue is a read-time view
    let stored = app
        .db
        .get_assessment(uuid::Uuid::from_str(&id).unwrap())
        .await
        .expect("get failed")
        .expect("missing row");
    assert_eq!(stored.status, "assessed");

    app.cleanup().await;
}

#[tokio::test]
async fn staff_listing_joins_the_owning_taxpayer() {
    let app = TestApp::spawn().await;
    let officer = app.seed_officer().await;
    let taxpayer = app.seed_taxpayer().await;

    let response = app
        .post_json(
            "/assessments",
            &taxpayer,
            &json!({
                "tax_type": "personal_income",
                "period": "2024-Q3",
                "taxable_income": "42"
            }),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let response = app.get("/assessments", &officer).await;
    let body: Vec<serde_json::Value> = response.json().await.expect("Invalid JSON");
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["taxpayer"]["tin"], taxpayer.tin);
    assert_eq!(body[0]["taxpayer"]["name"], taxpayer.name);

    app.cleanup().await;
}
