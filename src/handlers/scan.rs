// POST /scan: lexical URL scan, no model required
use axum::{extract::rejection::JsonRejection, Json};
use tracing::info;
use validator::Validate;

use crate::models::analysis::{AnalyzeRequest, ErrorResponse};
use crate::services::analysis::validate_url;
use crate::utils::service_error::AnalysisError;
use crate::utils::url_scanner::{scan_url, LexicalScanResult};

#[utoipa::path(
    post,
    path = "/scan",
    tag = "Analysis",
    operation_id = "scanUrl",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Lexical scan result", body = LexicalScanResult),
        (status = 400, description = "URL missing, too long or too short", body = ErrorResponse)
    )
)]
pub async fn scan(
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<LexicalScanResult>, AnalysisError> {
    let Json(request) = payload?;
    request.validate()?;

    let url = validate_url(request.url.as_deref())?;
    let result = scan_url(&url)?;

    info!(
        threat_score = result.threat_score,
        level = ?result.threat_level,
        "Lexical scan completed"
    );

    Ok(Json(result))
}
