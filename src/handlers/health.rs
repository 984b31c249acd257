use axum::{extract::State, http::StatusCode, Json};

use crate::app::AppState;
use crate::models::analysis::HealthResponse;

/// Liveness plus artifact status. Always 200 so a degraded instance stays inspectable.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    operation_id = "healthCheck",
    responses(
        (status = 200, description = "Service status and loaded artifacts", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(state.analysis_service.health()))
}
