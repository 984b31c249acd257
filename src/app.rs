// Application state shared across handlers
use std::sync::Arc;

use crate::app_config::AppConfig;
use crate::services::AnalysisService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub analysis_service: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(config: AppConfig, analysis_service: AnalysisService) -> Self {
        Self {
            config: Arc::new(config),
            analysis_service: Arc::new(analysis_service),
        }
    }
}
