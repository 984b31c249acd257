// Common test utilities and helper structs
// Shared across all test files to avoid duplication

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, Response, StatusCode},
    Router,
};
use nids_backend_core::{
    app::AppState,
    app_config::{AppConfig, Environment},
    build_router,
    services::{AnalysisService, ModelArtifacts, StandardScaler, StaticResolver, ThreatLogger},
};
use serde::Serialize;
use serde_json::json;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Two columns the stump model is trained on
pub const TEST_COLUMNS: &[&str] = &["Dst Port", "Protocol"];

/// Unique scratch path under the system temp dir
pub fn temp_path(prefix: &str, extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{}.{}", prefix, Uuid::new_v4().simple(), extension))
}

/// Stump forest JSON: `Dst Port <= 0.0` is class "0", else class "1"
pub fn stump_model_json() -> serde_json::Value {
    json!({
        "type": "random_forest",
        "classes": ["0", "1"],
        "n_features": 2,
        "trees": [
            {
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -2, -2],
                "threshold": [0.0, -2.0, -2.0],
                "value": [[10.0, 10.0], [9.0, 1.0], [2.0, 8.0]]
            },
            {
                "children_left": [-1],
                "children_right": [-1],
                "feature": [-2],
                "threshold": [-2.0],
                "value": [[1.0, 1.0]]
            }
        ]
    })
}

pub fn identity_scaler_json(n: usize) -> serde_json::Value {
    json!({ "mean": vec![0.0; n], "scale": vec![1.0; n] })
}

pub fn stump_artifacts() -> ModelArtifacts {
    let classifier = serde_json::from_value(stump_model_json()).unwrap();
    let scaler: StandardScaler = serde_json::from_value(identity_scaler_json(2)).unwrap();
    ModelArtifacts::new(classifier, scaler).unwrap()
}

/// Write model, scaler and column files into a fresh directory
pub fn write_artifacts(dir: &Path, columns: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("model.json"), stump_model_json().to_string()).unwrap();
    std::fs::write(dir.join("scaler.json"), identity_scaler_json(2).to_string()).unwrap();
    std::fs::write(dir.join("feature_columns.txt"), columns.join("\n")).unwrap();
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::from_env().unwrap();
    config.environment = Environment::Test;
    config.cors_allowed_origins = vec!["*".to_string()];
    config
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub log_path: PathBuf,
}

/// Builder for an in-memory app with injected artifacts and resolver
pub struct TestAppBuilder {
    artifacts: Option<ModelArtifacts>,
    columns: Vec<String>,
    resolved_ip: Option<IpAddr>,
    log_enabled: bool,
    config: AppConfig,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            artifacts: Some(stump_artifacts()),
            columns: TEST_COLUMNS.iter().map(|s| s.to_string()).collect(),
            resolved_ip: Some("93.184.216.34".parse().unwrap()),
            log_enabled: true,
            config: test_config(),
        }
    }

    pub fn without_models(mut self) -> Self {
        self.artifacts = None;
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn unresolvable(mut self) -> Self {
        self.resolved_ip = None;
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> TestApp {
        let log_path = temp_path("threat_log", "csv");
        let service = AnalysisService::new(
            self.artifacts,
            self.columns,
            Arc::new(StaticResolver::new(self.resolved_ip)),
            Arc::new(ThreatLogger::new(&log_path, self.log_enabled)),
            self.config.resolver.unresolved_placeholder.clone(),
        );
        let state = AppState::new(self.config, service);

        TestApp {
            app: build_router(state.clone()),
            state,
            log_path,
        }
    }
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Send a POST request
    pub fn post(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "POST", uri)
    }

    /// Send a GET request
    pub fn get(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "GET", uri)
    }

    pub fn options(&self, uri: &str) -> TestRequest<'_> {
        TestRequest::new(self, "OPTIONS", uri)
    }

    /// Contents of the threat log, empty if never written
    pub fn threat_log(&self) -> String {
        std::fs::read_to_string(&self.log_path).unwrap_or_default()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.log_path);
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: String,
    uri: String,
    headers: Vec<(String, String)>,
    body: Body,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &str, uri: &str) -> Self {
        Self {
            app,
            method: method.to_string(),
            uri: uri.to_string(),
            headers: Vec::new(),
            body: Body::empty(),
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(self, body: &T) -> Self {
        let body_bytes = serde_json::to_vec(body).unwrap();
        self.header("content-type", "application/json")
            .raw_body(body_bytes)
    }

    /// Body sent as-is; pair with `header` for the content type
    pub fn raw_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method.as_str()).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder.body(self.body).unwrap();

        let response = self.app.app.clone().oneshot(request).await.unwrap();

        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    /// Get status code
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.response.headers()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// Get response body as text
    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}

/// Setup the default test application
pub fn setup_test_app() -> TestApp {
    TestAppBuilder::new().build()
}
