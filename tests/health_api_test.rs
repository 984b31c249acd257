mod common;

use axum::http::StatusCode;
use common::{setup_test_app, TestAppBuilder};
use nids_backend_core::models::HealthResponse;
use serde_json::Value;

#[tokio::test]
async fn test_health_when_everything_loaded() {
    let app = setup_test_app();

    let response = app.get("/health").send().await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: HealthResponse = response.json().await;
    assert_eq!(body.status, "healthy");
    assert!(body.model_loaded);
    assert!(body.scaler_loaded);
    assert!(body.features_loaded);
}

#[tokio::test]
async fn test_health_degraded_without_models() {
    let app = TestAppBuilder::new().without_models().build();

    let response = app.get("/health").send().await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: HealthResponse = response.json().await;
    assert_eq!(body.status, "degraded");
    assert!(!body.model_loaded);
    assert!(!body.scaler_loaded);
    assert!(body.features_loaded);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = setup_test_app();

    let response = app.get("/openapi.json").send().await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await;
    assert!(body["paths"]["/analyze"]["post"].is_object());
    assert!(body["paths"]["/health"]["get"].is_object());
    assert!(body["paths"]["/scan"]["post"].is_object());
}

#[tokio::test]
async fn test_cors_reflects_origin_outside_production() {
    let app = setup_test_app();

    let response = app
        .get("/health")
        .header("origin", "http://localhost:3000")
        .send()
        .await;

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = setup_test_app();

    let response = app
        .options("/analyze")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .send()
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["access-control-allow-methods"]
        .to_str()
        .unwrap()
        .contains("POST"));
}

#[tokio::test]
async fn test_cors_whitelist_in_production() {
    let mut config = common::test_config();
    config.environment = nids_backend_core::app_config::Environment::Production;
    config.cors_allowed_origins = vec!["https://dash.example.com".to_string()];
    let app = TestAppBuilder::new().config(config).build();

    let allowed = app
        .get("/health")
        .header("origin", "https://dash.example.com")
        .send()
        .await;
    assert!(allowed.headers().contains_key("access-control-allow-origin"));

    let denied = app
        .get("/health")
        .header("origin", "https://evil.example.com")
        .send()
        .await;
    assert!(!denied.headers().contains_key("access-control-allow-origin"));
}
