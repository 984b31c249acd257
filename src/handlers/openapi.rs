// OpenAPI document served as JSON
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use crate::handlers::{analyze, health, scan};
use crate::models::analysis::{
    AnalyzeRequest, AnalyzeResponse, ErrorResponse, HealthResponse, KeyFeatures, MockFlowData,
    RiskLevel,
};
use crate::services::attack_profile::AttackType;
use crate::utils::url_scanner::{LexicalScanResult, ThreatClass, ThreatLevel, UrlLexicalFeatures};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NIDS Backend API",
        description = "URL threat analysis backed by a network intrusion detection model",
        version = "1.0.0"
    ),
    paths(health::health_check, analyze::analyze_url, scan::scan),
    components(schemas(
        AnalyzeRequest,
        AnalyzeResponse,
        AttackType,
        ErrorResponse,
        HealthResponse,
        KeyFeatures,
        LexicalScanResult,
        MockFlowData,
        RiskLevel,
        ThreatClass,
        ThreatLevel,
        UrlLexicalFeatures
    )),
    tags(
        (name = "Health", description = "Service status"),
        (name = "Analysis", description = "URL threat analysis")
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI specification at /openapi.json
pub async fn serve_openapi_spec() -> Response {
    match ApiDoc::openapi().to_json() {
        Ok(spec) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            spec,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to serialize OpenAPI spec: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        },
    }
}
