// Append-only CSV log of every detection result

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

pub const CSV_HEADER: &str =
    "Timestamp,URL,Resolved_IP,Predicted_Label,Confidence_%,Risk_Level";

#[derive(Error, Debug)]
pub enum ThreatLogError {
    #[error("Failed to write threat log {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One detection result
#[derive(Debug, Clone, Serialize)]
pub struct ThreatLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub url: String,
    pub resolved_ip: String,
    pub predicted_label: String,
    pub confidence: f64,
    pub risk_level: String,
}

impl ThreatLogEntry {
    fn to_csv_row(&self) -> String {
        [
            self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            self.url.clone(),
            self.resolved_ip.clone(),
            self.predicted_label.clone(),
            format_confidence(self.confidence),
            self.risk_level.clone(),
        ]
        .iter()
        .map(|field| escape_csv_field(field))
        .collect::<Vec<_>>()
        .join(",")
    }
}

/// Shortest round-trip decimal, always with a fractional part (`65.0`, `87.46`)
pub fn format_confidence(confidence: f64) -> String {
    format!("{:?}", confidence)
}

/// Quote a field when it contains a delimiter, quote or line break
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub struct ThreatLogger {
    path: PathBuf,
    enabled: bool,
    // Serializes appends so header detection and rows never interleave
    write_lock: Mutex<()>,
}

impl ThreatLogger {
    pub fn new(path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
            write_lock: Mutex::new(()),
        }
    }

    /// Record a detection. Failures are logged, never propagated.
    pub async fn log(&self, entry: &ThreatLogEntry) {
        match serde_json::to_string(entry) {
            Ok(json_log) => info!(target: "audit", "{}", json_log),
            Err(e) => warn!("Failed to serialize threat log entry: {}", e),
        }

        if !self.enabled {
            return;
        }

        match self.append(entry).await {
            Ok(()) => info!(
                "Logged: {} | {} | {}% confidence",
                entry.predicted_label, entry.url, entry.confidence
            ),
            Err(e) => warn!("Threat logging error: {}", e),
        }
    }

    async fn append(&self, entry: &ThreatLogEntry) -> Result<(), ThreatLogError> {
        let io_err = |source| ThreatLogError::Io {
            path: self.path.display().to_string(),
            source,
        };

        let _guard = self.write_lock.lock().await;

        let is_new = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;

        let mut buffer = String::new();
        if is_new {
            buffer.push_str(CSV_HEADER);
            buffer.push_str("\r\n");
        }
        buffer.push_str(&entry.to_csv_row());
        buffer.push_str("\r\n");

        file.write_all(buffer.as_bytes()).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;
        Ok(())
    }
}
