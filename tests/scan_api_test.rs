mod common;

use axum::http::StatusCode;
use common::TestAppBuilder;
use serde_json::{json, Value};

#[tokio::test]
async fn test_scan_works_without_models() {
    let app = TestAppBuilder::new().without_models().build();

    let response = app
        .post("/scan")
        .json(&json!({ "url": "http://192.168.0.10/login" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert_eq!(body["threat_score"], 40);
    assert_eq!(body["threat_level"], "MEDIUM");
    assert_eq!(body["threat_class"], "Suspicious");
    assert_eq!(body["confidence"], 60);
    assert_eq!(body["features"]["has_ip"], true);
    assert_eq!(body["indicators"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_scan_rejects_short_url() {
    let app = TestAppBuilder::new().build();

    let response = app.post("/scan").json(&json!({ "url": "a.io" })).send().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "Please enter a valid URL");
}

#[tokio::test]
async fn test_scan_requires_url() {
    let app = TestAppBuilder::new().build();

    for body in [json!({}), json!({ "url": "   " })] {
        let response = app.post("/scan").json(&body).send().await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await;
        assert_eq!(body["error"], "No URL provided");
    }
}

#[tokio::test]
async fn test_scan_reports_raw_lengths_and_timestamp() {
    let app = TestAppBuilder::new().build();

    let body: Value = app
        .post("/scan")
        .json(&json!({ "url": "https://example.com" }))
        .send()
        .await
        .json()
        .await;

    assert_eq!(body["features"]["path_length"], 0);
    assert_eq!(body["features"]["domain_length"], 11);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_scan_does_not_write_threat_log() {
    let app = TestAppBuilder::new().build();

    app.post("/scan")
        .json(&json!({ "url": "https://wikipedia.org/wiki/Rust" }))
        .send()
        .await;

    assert!(app.threat_log().is_empty());
}
