pub mod analysis;

// Re-export common types
pub use analysis::{
    AnalyzeRequest, AnalyzeResponse, ErrorResponse, HealthResponse, KeyFeatures, MockFlowData,
    RiskLevel,
};
