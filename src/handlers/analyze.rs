// POST /analyze: model-backed URL verdict
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use crate::app::AppState;
use crate::models::analysis::{AnalyzeRequest, AnalyzeResponse, ErrorResponse};
use crate::utils::service_error::AnalysisError;

#[utoipa::path(
    post,
    path = "/analyze",
    tag = "Analysis",
    operation_id = "analyzeUrl",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "URL analyzed", body = AnalyzeResponse),
        (status = 400, description = "Missing, empty or oversized URL", body = ErrorResponse),
        (status = 500, description = "Feature mismatch or prediction failure", body = ErrorResponse),
        (status = 503, description = "Model artifacts are not loaded", body = ErrorResponse)
    )
)]
pub async fn analyze_url(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, AnalysisError> {
    let Json(request) = payload?;
    request.validate()?;

    let response = state
        .analysis_service
        .analyze(request.url.as_deref())
        .await?;

    Ok(Json(response))
}
