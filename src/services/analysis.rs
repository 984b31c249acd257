// URL analysis pipeline
// resolve -> detect profile -> synthesize flow -> scale + classify -> verdict

use chrono::Local;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::models::analysis::{
    round_to, AnalyzeResponse, HealthResponse, KeyFeatures, MockFlowData, RiskLevel,
};
use crate::services::attack_profile::{detect_attack_type, AttackType};
use crate::services::classifier::ModelArtifacts;
use crate::services::flow_features::{generate_flow_features, FlowFeatures};
use crate::services::resolver::{extract_hostname, HostResolver};
use crate::services::threat_log::{ThreatLogEntry, ThreatLogger};
use crate::utils::service_error::AnalysisError;

/// Map the classifier's raw label to a verdict.
///
/// Numeric labels come from integer-encoded training targets: `0` is
/// benign traffic and anything else is an attack whose family is taken
/// from the URL profile.
pub fn map_predicted_label(raw_label: &str, attack_type: AttackType) -> String {
    let is_numeric = !raw_label.is_empty() && raw_label.chars().all(|c| c.is_ascii_digit());
    if !is_numeric {
        return raw_label.to_string();
    }

    if raw_label.trim_start_matches('0').is_empty() {
        "Benign".to_string()
    } else if attack_type == AttackType::Benign {
        "Malicious".to_string()
    } else {
        attack_type.to_string()
    }
}

/// Check the submitted URL before any model work
pub fn validate_url(raw: Option<&str>) -> Result<String, AnalysisError> {
    match raw.map(str::trim) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(AnalysisError::Validation("No URL provided".to_string())),
    }
}

pub struct AnalysisService {
    artifacts: Option<Arc<ModelArtifacts>>,
    feature_columns: Arc<Vec<String>>,
    resolver: Arc<dyn HostResolver>,
    threat_log: Arc<ThreatLogger>,
    unresolved_placeholder: String,
}

impl AnalysisService {
    pub fn new(
        artifacts: Option<ModelArtifacts>,
        feature_columns: Vec<String>,
        resolver: Arc<dyn HostResolver>,
        threat_log: Arc<ThreatLogger>,
        unresolved_placeholder: impl Into<String>,
    ) -> Self {
        Self {
            artifacts: artifacts.map(Arc::new),
            feature_columns: Arc::new(feature_columns),
            resolver,
            threat_log,
            unresolved_placeholder: unresolved_placeholder.into(),
        }
    }

    pub fn models_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    pub fn features_loaded(&self) -> bool {
        !self.feature_columns.is_empty()
    }

    pub fn health(&self) -> HealthResponse {
        let model_loaded = self.models_loaded();
        let features_loaded = self.features_loaded();
        HealthResponse {
            status: if model_loaded && features_loaded {
                "healthy".to_string()
            } else {
                "degraded".to_string()
            },
            model_loaded,
            scaler_loaded: model_loaded,
            features_loaded,
        }
    }

    /// Run the full analysis for one submitted URL
    #[instrument(skip(self), fields(analysis_id = tracing::field::Empty))]
    pub async fn analyze(&self, raw_url: Option<&str>) -> Result<AnalyzeResponse, AnalysisError> {
        let url = validate_url(raw_url)?;
        let artifacts = self
            .artifacts
            .as_ref()
            .ok_or(AnalysisError::ModelNotLoaded)?;

        let analysis_id = Uuid::new_v4();
        tracing::Span::current().record("analysis_id", tracing::field::display(analysis_id));

        let hostname = extract_hostname(&url);
        let ip_address = match self.resolver.resolve(&hostname).await {
            Some(ip) => ip.to_string(),
            None => {
                debug!("Could not resolve {}, using placeholder", hostname);
                self.unresolved_placeholder.clone()
            },
        };

        let (attack_type, risk_score) = detect_attack_type(&url);
        let features = self.synthesize(&url, attack_type, risk_score);
        let vector = features.to_vector(&self.feature_columns);

        let prediction = artifacts.predict(&vector).map_err(|e| {
            error!("Classification failed: {}", e);
            AnalysisError::from(e)
        })?;

        let predicted_label = map_predicted_label(&prediction.label, attack_type);
        let confidence = round_to(prediction.confidence() * 100.0, 2);
        let risk_level = RiskLevel::from_prediction(&predicted_label, confidence);

        info!(
            %attack_type,
            label = %predicted_label,
            confidence,
            risk = %risk_level,
            "URL analyzed"
        );

        self.threat_log
            .log(&ThreatLogEntry {
                id: analysis_id,
                timestamp: Local::now(),
                url: url.clone(),
                resolved_ip: ip_address.clone(),
                predicted_label: predicted_label.clone(),
                confidence,
                risk_level: risk_level.to_string(),
            })
            .await;

        Ok(AnalyzeResponse {
            verdict: predicted_label.clone(),
            predicted_label,
            confidence,
            risk_level,
            attack_type_detected: attack_type,
            mock_flow_data: MockFlowData {
                url,
                hostname,
                ip_address,
                risk_score: round_to(risk_score, 3),
                key_features: KeyFeatures::from_flow(&features),
            },
        })
    }

    fn synthesize(&self, url: &str, attack_type: AttackType, risk_score: f64) -> FlowFeatures {
        let mut rng = rand::thread_rng();
        generate_flow_features(url, attack_type, risk_score, &mut rng)
    }
}
