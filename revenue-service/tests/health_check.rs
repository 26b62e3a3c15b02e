//! Health and metrics endpoint tests for revenue-service.

mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_reports_ok() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Request failed");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Invalid JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "revenue-service");

    app.cleanup().await;
}

#[tokio::test]
async fn metrics_endpoint_exposes_prometheus_text() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("Request failed");

    assert!(response.status().is_success());
    let body = response.text().await.expect("Invalid body");
    assert!(body.contains("revenue_db_query_duration_seconds"));

    app.cleanup().await;
}

#[tokio::test]
async fn request_without_user_header_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/assessments", app.address))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    app.cleanup().await;
}
