// Library exports for the NIDS backend
// Exposes the router and startup helpers for the server binary and tests

pub mod app;
pub mod app_config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use services::{AnalysisService, ModelArtifacts, ModelError};
pub use utils::AnalysisError;

/// Build the full HTTP router with middleware applied
pub fn build_router(state: AppState) -> Router {
    handlers::api_routes()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::dynamic_cors_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load artifacts and wire the analysis service from configuration.
///
/// Fails only when `require_models` is set and the classifier or scaler
/// cannot be loaded; otherwise the service starts degraded.
pub fn initialize_app_state(config: &AppConfig) -> Result<AppState, ModelError> {
    let models = &config.models;

    info!("Loading model artifacts...");
    let artifacts = match ModelArtifacts::load(&models.model_path, &models.scaler_path) {
        Ok(artifacts) => {
            info!("Model and scaler loaded");
            Some(artifacts)
        },
        Err(e) if models.require_models => return Err(e),
        Err(e) => {
            warn!("Model artifacts unavailable, starting degraded: {}", e);
            None
        },
    };

    let feature_columns = match services::load_feature_columns(&models.feature_columns_path) {
        Ok(columns) => {
            info!(count = columns.len(), "Feature columns loaded");
            columns
        },
        Err(e) => {
            warn!("Feature columns unavailable: {}", e);
            Vec::new()
        },
    };

    let resolver = Arc::new(services::DnsResolver::new(Duration::from_millis(
        config.resolver.timeout_ms,
    )));
    let threat_log = Arc::new(services::ThreatLogger::new(
        &config.threat_log.path,
        config.threat_log.enabled,
    ));

    let analysis_service = AnalysisService::new(
        artifacts,
        feature_columns,
        resolver,
        threat_log,
        config.resolver.unresolved_placeholder.clone(),
    );

    Ok(AppState::new(config.clone(), analysis_service))
}
