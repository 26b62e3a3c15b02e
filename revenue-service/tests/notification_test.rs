//! Notification inbox tests for revenue-service.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn inbox_lists_unread_entries_newest_first() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    for period in ["2024-Q1", "2024-Q2"] {
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

    let response = app.get("/notifications", &taxpayer).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Vec<serde_json::Value> = response.json().await.expect("Invalid JSON");
    assert_eq!(body.len(), 2);
    assert!(body.iter().all(|n| n["read"] == false));

    let timestamps: Vec<&str> = body
        .iter()
        .map(|n| n["created_utc"].as_str().unwrap())
        .collect();
    assert!(timestamps[0] >= timestamps[1]);

    app.cleanup().await;
}

#[tokio::test]
async fn recipient_marks_a_notification_read() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    app.post_json(
        "/assessments",
        &taxpayer,
        &json!({
            "tax_type": "personal_income",
            "period": "2024-Q1",
            "taxable_income": "1000"
        }),
    )
    .await;

    let inbox = app.get("/notifications", &taxpayer).await;
    let inbox: Vec<serde_json::Value> = inbox.json().await.expect("Invalid JSON");
    let notification_id = inbox[0]["notification_id"].as_str().unwrap();

    let response = app
        .post_json(
            &format!("/notifications/{}/read", notification_id),
            &taxpayer,
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["read"], true);

    app.cleanup().await;
}

#[tokio::test]
async fn cannot_read_someone_elses_notification() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let snoop = app.seed_taxpayer().await;

    app.post_json(
        "/assessments",
        &taxpayer,
        &json!({
            "tax_type": "personal_income",
            "period": "2024-Q1",
            "taxable_income": "1000"
        }),
    )
    .await;

    let inbox = app.get("/notifications", &taxpayer).await;
    let inbox: Vec<serde_json::Value> = inbox.json().await.expect("Invalid JSON");
    let notification_id = inbox[0]["notification_id"].as_str().unwrap();

    let response = app
        .post_json(
            &format!("/notifications/{}/read", notification_id),
            &snoop,
            &json!({}),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    // The snoop's inbox stays empty
    let snoop_inbox = app.get("/notifications", &snoop).await;
    let snoop_inbox: Vec<serde_json::Value> = snoop_inbox.json().await.expect("Invalid JSON");
    assert!(snoop_inbox.is_empty());

    app.cleanup().await;
}
