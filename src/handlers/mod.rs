// HTTP handlers and route table

pub mod analyze;
pub mod health;
pub mod openapi;
pub mod scan;

use crate::app::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub use analyze::analyze_url;
pub use health::health_check;
pub use scan::scan;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/analyze", post(analyze::analyze_url))
        .route("/scan", post(scan::scan))
        .route("/openapi.json", get(openapi::serve_openapi_spec))
}
