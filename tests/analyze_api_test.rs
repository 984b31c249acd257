mod common;

use axum::http::StatusCode;
use common::{setup_test_app, TestAppBuilder};
use serde_json::{json, Value};

#[tokio::test]
async fn test_analyze_keyword_url_returns_attack_profile() {
    let app = setup_test_app();

    let response = app
        .post("/analyze")
        .json(&json!({ "url": "http://syn-flood.example.com" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;

    assert_eq!(body["verdict"], "DDoS");
    assert_eq!(body["predicted_label"], "DDoS");
    assert_eq!(body["confidence"], 65.0);
    assert_eq!(body["risk_level"], "Medium");
    assert_eq!(body["attack_type_detected"], "DDoS");

    let flow = &body["mock_flow_data"];
    assert_eq!(flow["url"], "http://syn-flood.example.com");
    assert_eq!(flow["hostname"], "syn-flood.example.com");
    assert_eq!(flow["ip_address"], "93.184.216.34");
    assert_eq!(flow["risk_score"], 0.85);
    assert_eq!(flow["key_features"]["Dst Port"], 80);
    assert_eq!(flow["key_features"]["Protocol"], 6);
    assert!(flow["key_features"]["Tot Fwd Pkts"].as_u64().unwrap() >= 500);
}

#[tokio::test]
async fn test_numeric_attack_on_clean_url_is_malicious() {
    let app = setup_test_app();

    let body: Value = app
        .post("/analyze")
        .json(&json!({ "url": "https://example.com" }))
        .send()
        .await
        .json()
        .await;

    assert_eq!(body["attack_type_detected"], "Benign");
    assert_eq!(body["predicted_label"], "Malicious");
    assert_eq!(body["mock_flow_data"]["key_features"]["Dst Port"], 443);
}

#[tokio::test]
async fn test_benign_prediction_is_low_risk() {
    // First column is absent from the flow, so it is 0.0 and the stump says class "0"
    let app = TestAppBuilder::new()
        .columns(&["Not A Flow Feature", "Protocol"])
        .build();

    let body: Value = app
        .post("/analyze")
        .json(&json!({ "url": "https://example.com" }))
        .send()
        .await
        .json()
        .await;

    assert_eq!(body["verdict"], "Benign");
    assert_eq!(body["confidence"], 70.0);
    assert_eq!(body["risk_level"], "Low");
}

#[tokio::test]
async fn test_empty_url_is_rejected_without_logging() {
    let app = setup_test_app();

    let response = app
        .post("/analyze")
        .json(&json!({ "url": "" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "No URL provided");
    assert!(app.threat_log().is_empty());
}

#[tokio::test]
async fn test_missing_url_field_is_rejected() {
    let app = setup_test_app();

    let response = app.post("/analyze").json(&json!({})).send().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert_eq!(body["error"], "No URL provided");
}

#[tokio::test]
async fn test_oversized_url_is_rejected() {
    let app = setup_test_app();
    let url = format!("https://example.com/{}", "a".repeat(3000));

    let response = app.post("/analyze").json(&json!({ "url": url })).send().await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert!(body["error"].as_str().unwrap().contains("maximum length"));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = setup_test_app();

    let response = app
        .post("/analyze")
        .header("content-type", "application/json")
        .raw_body("{not json")
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON body"));
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_models_not_loaded_returns_503() {
    let app = TestAppBuilder::new().without_models().build();

    let response = app
        .post("/analyze")
        .json(&json!({ "url": "https://example.com" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(app.threat_log().is_empty());
}

#[tokio::test]
async fn test_feature_mismatch_returns_500() {
    let app = TestAppBuilder::new()
        .columns(&["Dst Port", "Protocol", "Flow Duration"])
        .build();

    let response = app
        .post("/analyze")
        .json(&json!({ "url": "https://example.com" }))
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await;
    assert_eq!(
        body["error"],
        "Feature scaling failed - Shape mismatch: Expected 2 features, got 3"
    );
}

#[tokio::test]
async fn test_successful_analysis_appends_csv_row() {
    let app = setup_test_app();

    for url in ["http://syn-flood.example.com", "http://example.com/a,b"] {
        let response = app.post("/analyze").json(&json!({ "url": url })).send().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let log = app.threat_log();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "Timestamp,URL,Resolved_IP,Predicted_Label,Confidence_%,Risk_Level"
    );
    assert!(lines[1].ends_with(",http://syn-flood.example.com,93.184.216.34,DDoS,65.0,Medium"));
    assert!(lines[2].contains(",\"http://example.com/a,b\",93.184.216.34,Malicious,"));
}

#[tokio::test]
async fn test_unresolved_host_uses_placeholder() {
    let app = TestAppBuilder::new().unresolvable().build();

    let body: Value = app
        .post("/analyze")
        .json(&json!({ "url": "http://no-such-host.invalid/login" }))
        .send()
        .await
        .json()
        .await;

    assert_eq!(body["mock_flow_data"]["ip_address"], "0.0.0.0");
    assert_eq!(body["attack_type_detected"], "Brute Force");
    assert!(app.threat_log().contains(",0.0.0.0,"));
}
