// Services module for the NIDS backend
// Detection, synthesis, inference and logging

pub mod analysis;
pub mod attack_profile;
pub mod batch_predict;
pub mod classifier;
pub mod flow_features;
pub mod resolver;
pub mod threat_log;

// Re-export commonly used services
pub use analysis::{map_predicted_label, AnalysisService};
pub use attack_profile::{detect_attack_type, AttackType};
pub use classifier::{
    load_classifier, load_feature_columns, load_scaler, Classifier, ModelArtifacts, ModelError,
    Prediction, StandardScaler,
};
pub use flow_features::{generate_flow_features, FlowFeatures, FLOW_FEATURE_NAMES};
pub use resolver::{extract_hostname, DnsResolver, HostResolver, StaticResolver};
pub use threat_log::{ThreatLogEntry, ThreatLogger};
