// Utility modules for the NIDS backend

pub mod service_error;
pub mod url_scanner;

pub use service_error::AnalysisError;
pub use url_scanner::{scan_url, LexicalScanResult, ScanError, ThreatClass, ThreatLevel};
