// Request and response types for URL analysis

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::services::attack_profile::AttackType;
use crate::services::flow_features::FlowFeatures;

/// Longest URL accepted for analysis
pub const MAX_URL_LENGTH: u64 = 2048;

/// Body of `POST /analyze` and `POST /scan`
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AnalyzeRequest {
    /// URL to analyze
    #[validate(length(
        max = "MAX_URL_LENGTH",
        message = "URL exceeds maximum length of 2048 characters"
    ))]
    #[schema(example = "https://example.com")]
    pub url: Option<String>,
}

/// Risk tier derived from the predicted label and confidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Confidence above this percentage is High risk
    pub const HIGH_CONFIDENCE: f64 = 70.0;
    /// Confidence above this percentage is Medium risk
    pub const MEDIUM_CONFIDENCE: f64 = 30.0;

    /// Benign verdicts are always Low; otherwise the tier follows confidence
    pub fn from_prediction(predicted_label: &str, confidence_pct: f64) -> Self {
        if predicted_label.eq_ignore_ascii_case("benign") {
            return RiskLevel::Low;
        }

        if confidence_pct > Self::HIGH_CONFIDENCE {
            RiskLevel::High
        } else if confidence_pct > Self::MEDIUM_CONFIDENCE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Headline flow features echoed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct KeyFeatures {
    #[serde(rename = "Dst Port")]
    pub dst_port: u32,
    #[serde(rename = "Protocol")]
    pub protocol: u32,
    #[serde(rename = "Flow Duration")]
    pub flow_duration: f64,
    #[serde(rename = "Tot Fwd Pkts")]
    pub tot_fwd_pkts: u32,
    #[serde(rename = "Tot Bwd Pkts")]
    pub tot_bwd_pkts: u32,
    #[serde(rename = "Flow Byts/s")]
    pub flow_byts_per_sec: f64,
    #[serde(rename = "Flow Pkts/s")]
    pub flow_pkts_per_sec: f64,
}

impl KeyFeatures {
    pub fn from_flow(features: &FlowFeatures) -> Self {
        let value = |name: &str| features.get(name).unwrap_or(0.0);
        Self {
            dst_port: value("Dst Port") as u32,
            protocol: value("Protocol") as u32,
            flow_duration: round_to(value("Flow Duration"), 2),
            tot_fwd_pkts: value("Tot Fwd Pkts") as u32,
            tot_bwd_pkts: value("Tot Bwd Pkts") as u32,
            flow_byts_per_sec: round_to(value("Flow Byts/s"), 2),
            flow_pkts_per_sec: round_to(value("Flow Pkts/s"), 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MockFlowData {
    pub url: String,
    pub hostname: String,
    pub ip_address: String,
    pub risk_score: f64,
    pub key_features: KeyFeatures,
}

/// Body returned by `POST /analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyzeResponse {
    pub verdict: String,
    pub predicted_label: String,
    /// Probability of the predicted class, in percent
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub attack_type_detected: AttackType,
    pub mock_flow_data: MockFlowData,
}

/// Body returned by `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub features_loaded: bool,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
