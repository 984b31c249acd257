// Error type returned by the analysis endpoints
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::classifier::ModelError;
use crate::utils::url_scanner::ScanError;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("{0}")]
    Validation(String),

    #[error("Model artifacts are not loaded")]
    ModelNotLoaded,

    #[error("{0}")]
    FeatureMismatch(String),

    #[error("Model prediction failed: {0}")]
    Prediction(String),
}

impl AnalysisError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::Validation(_) => StatusCode::BAD_REQUEST,
            AnalysisError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            AnalysisError::FeatureMismatch(_) | AnalysisError::Prediction(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ModelError> for AnalysisError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::FeatureMismatch { .. } => AnalysisError::FeatureMismatch(error.to_string()),
            other => AnalysisError::Prediction(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AnalysisError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| errors.to_string());
        AnalysisError::Validation(message)
    }
}

impl From<JsonRejection> for AnalysisError {
    fn from(rejection: JsonRejection) -> Self {
        AnalysisError::Validation(format!("Invalid JSON body: {}", rejection.body_text()))
    }
}

impl From<ScanError> for AnalysisError {
    fn from(error: ScanError) -> Self {
        AnalysisError::Validation(error.to_string())
    }
}
