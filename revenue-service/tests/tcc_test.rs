//! TCC request lifecycle tests for revenue-service.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn first_request_is_pending_and_notifies_staff() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let officer = app.seed_officer().await;
    let admin = app.seed_admin().await;

    let response = app
        .post_json("/tcc-requests", &taxpayer, &json!({}))
        .await;

    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["status"], "pending");

    for staff in [&officer, &admin] {
        let inbox = app
            .db
            .list_notifications_for_user(staff.profile_id)
            .await
            .expect("list failed");
        assert!(inbox.iter().any(|n| n.title == "New TCC Request"));
    }

    app.cleanup().await;
}

#[tokio::test]
async fn no_request_on_record_reads_as_absent() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    let response = app.get("/tcc-requests/me", &taxpayer).await;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    app.cleanup().await;
}

#[tokio::test]
async fn rerequest_after_rejection_reuses_the_same_row() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let officer = app.seed_officer().await;

    let first = app.post_json("/tcc-requests", &taxpayer, &json!({})).await;
    let first: serde_json::Value = first.json().await.expect("Invalid JSON");
    let request_id = first["request_id"].as_str().unwrap().to_string();

    let rejected = app
        .patch_json(
            &format!("/tcc-requests/{}/status", request_id),
            &officer,
            &json!({"status": "rejected"}),
        )
        .await;
    assert_eq!(rejected.status(), reqwest::StatusCode::OK);

    let second = app.post_json("/tcc-requests", &taxpayer, &json!({})).await;
    assert_eq!(second.status(), reqwest::StatusCode::CREATED);
    let second: serde_json::Value = second.json().await.expect("Invalid JSON");
    assert_eq!(second["status"], "pending");

    // Row count for the taxpayer stays one
    let count: i64 =
        sqlx::query_scalar("SELECT count(*) FROM tcc_requests WHERE taxpayer_id = $1")
            .bind(taxpayer.profile_id)
            .fetch_one(app.db.pool())
            .await
            .expect("count failed");
    assert_eq!(count, 1);

    app.cleanup().await;
}

#[tokio::test]
async fn review_outcome_notifies_the_taxpayer() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;
    let officer = app.seed_officer().await;

    let created = app.post_json("/tcc-requests", &taxpayer, &json!({})).await;
    let created: serde_json::Value = created.json().await.expect("Invalid JSON");
    let request_id = created["request_id"].as_str().unwrap();

    let response = app
        .patch_json(
            &format!("/tcc-requests/{}/status", request_id),
            &officer,
            &json!({"status": "approved"}),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let inbox = app
        .db
        .list_notifications_for_user(taxpayer.profile_id)
        .await
        .expect("list failed");
    let outcome = inbox
        .iter()
        .find(|n| n.title == "TCC Request Approved")
        .expect("taxpayer was not notified");
    assert!(outcome.message.contains("approved"));

    app.cleanup().await;
}

#[tokio::test]
async fn taxpayer_cannot_review_requests() {
    let app = TestApp::spawn().await;
    let taxpayer = app.seed_taxpayer().await;

    let created = app.post_json("/tcc-requests", &taxpayer, &json!({})).await;
    let created: serde_json::Value = created.json().await.expect("Invalid JSON");
    let request_id = created["request_id"].as_str().unwrap();

    let response = app
        .patch_json(
            &format!("/tcc-requests/{}/status", request_id),
            &taxpayer,
            &json!({"status": "approved"}),
        )
        .await;
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);

    let listing = app.get("/tcc-requests", &taxpayer).await;
    assert_eq!(listing.status(), reqwest::StatusCode::FORBIDDEN);

    app.cleanup().await;
}

#[tokio::test]
async fn staff_listing_is_newest_first_with_owner_joined() {
    let app = TestApp::spawn().await;
    let officer = app.seed_officer().await;
    let first_taxpayer = app.seed_taxpayer().await;
    let second_taxpayer = app.seed_taxpayer().await;

    app.post_json("/tcc-requests", &first_taxpayer, &json!({}))
        .await;
    app.post_json("/tcc-requests", &second_taxpayer, &json!({}))
        .await;

    let response = app.get("/tcc-requests", &officer).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: Vec<serde_json::Value> = response.json().await.expect("Invalid JSON");
    assert_eq!(body.len(), 2);

    let timestamps: Vec<&str> = body
        .iter()
        .map(|r| r["requested_utc"].as_str().unwrap())
        .collect();
    assert!(timestamps[0] >= timestamps[1]);
    assert!(body.iter().all(|r| r["taxpayer"]["name"].is_string()));

    app.cleanup().await;
}
