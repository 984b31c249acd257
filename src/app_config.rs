// Centralized configuration management for the NIDS backend
// Load ALL env vars ONCE at startup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    // For tests, load .env file first
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub environment: Environment,
    pub rust_log: String,
    pub cors_allowed_origins: Vec<String>,

    // Nested configs
    pub models: ModelConfig,
    pub threat_log: ThreatLogConfig,
    pub resolver: ResolverConfig,
}

/// Locations of the serialized classifier, scaler and feature column list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_path: String,
    pub scaler_path: String,
    pub feature_columns_path: String,
    pub require_models: bool,
}

/// CSV threat log settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatLogConfig {
    pub path: String,
    pub enabled: bool,
}

/// Hostname resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    pub timeout_ms: u64,
    pub unresolved_placeholder: String,
}

/// Environment type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Environment::Development,
            "test" => Environment::Test,
            "staging" | "stage" => Environment::Staging,
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let get_or_default = |key: &str, default: &str| -> String {
            env::var(key).unwrap_or_else(|_| default.to_string())
        };

        let parse_u64_or_default = |key: &str, default: &str| -> Result<u64, ConfigError> {
            get_or_default(key, default).trim().parse().map_err(|_| {
                ConfigError::InvalidValue(key.to_string(), "not a valid u64".to_string())
            })
        };

        let parse_bool_or_default = |key: &str, default: &str| -> bool {
            get_or_default(key, default).to_lowercase() == "true"
        };

        let bind_address = get_or_default("BIND_ADDRESS", "0.0.0.0:5000");
        if bind_address.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidValue(
                "BIND_ADDRESS".to_string(),
                format!("expected host:port, got '{}'", bind_address),
            ));
        }

        let environment = Environment::from(get_or_default("ENVIRONMENT", "development"));
        let rust_log = get_or_default("RUST_LOG", "info");

        let cors_allowed_origins: Vec<String> = get_or_default("CORS_ALLOWED_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let models = ModelConfig {
            model_path: get_or_default("MODEL_PATH", "models/model.json"),
            scaler_path: get_or_default("SCALER_PATH", "models/scaler.json"),
            feature_columns_path: get_or_default(
                "FEATURE_COLUMNS_PATH",
                "data/processed/feature_columns.txt",
            ),
            require_models: parse_bool_or_default("REQUIRE_MODELS", "true"),
        };

        let threat_log = ThreatLogConfig {
            path: get_or_default("THREAT_LOG_PATH", "threat_logs.csv"),
            enabled: parse_bool_or_default("ENABLE_THREAT_LOG", "true"),
        };

        let resolver = ResolverConfig {
            timeout_ms: parse_u64_or_default("DNS_TIMEOUT_MS", "2000")?,
            unresolved_placeholder: get_or_default("UNRESOLVED_IP_PLACEHOLDER", "0.0.0.0"),
        };

        Ok(Self {
            bind_address,
            environment,
            rust_log,
            cors_allowed_origins,
            models,
            threat_log,
            resolver,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Get the global configuration instance
/// This is the primary way to access configuration throughout the app
pub fn config() -> &'static AppConfig {
    &CONFIG
}
