//! Node configuration

use ecg_core::{EcgError, EcgResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for one acquisition + inference node
///
/// Defaults mirror the reference deployment: 2000 Hz recordings conditioned
/// down to 500 Hz with a 5th-order, 200 Hz low-pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Directory watched for new raw recordings (non-recursive)
    pub watch_dir: PathBuf,
    /// File extension of raw recordings, without the dot
    pub file_extension: String,
    /// Watcher poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Sample rate of raw recordings in Hz
    pub source_rate_hz: f64,
    /// Sample rate published to the inference side in Hz
    pub target_rate_hz: f64,
    /// Butterworth low-pass order
    pub filter_order: usize,
    /// Low-pass cutoff in Hz; must not exceed the target Nyquist rate
    pub cutoff_hz: f64,
    /// Topic carrying processed records
    pub raw_topic: String,
    /// Topic carrying diagnostic label strings
    pub result_topic: String,
    /// Decision threshold on sigmoid probabilities (strict `>`)
    pub decision_threshold: f32,
    /// Defensive timeout around one oracle call, in milliseconds
    pub oracle_timeout_ms: u64,
    /// Maximum number of files conditioned concurrently
    pub worker_count: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            watch_dir: PathBuf::from("./data"),
            file_extension: "xls".to_string(),
            poll_interval_ms: 500,
            source_rate_hz: 2000.0,
            target_rate_hz: 500.0,
            filter_order: 5,
            cutoff_hz: 200.0,
            raw_topic: "ecg/data".to_string(),
            result_topic: "ecg/inference".to_string(),
            decision_threshold: 0.9,
            oracle_timeout_ms: 30_000,
            worker_count: 4,
        }
    }
}

impl NodeConfig {
    /// Validate the configuration before the services start
    pub fn validate(&self) -> EcgResult<()> {
        if self.file_extension.trim().is_empty() {
            return Err(EcgError::ConfigError {
                message: "file extension cannot be empty".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(EcgError::ConfigError {
                message: "poll interval must be greater than 0".to_string(),
            });
        }
        if !(self.source_rate_hz > 0.0) || !(self.target_rate_hz > 0.0) {
            return Err(EcgError::ConfigError {
                message: "sample rates must be positive".to_string(),
            });
        }
        if self.target_rate_hz > self.source_rate_hz {
            return Err(EcgError::ConfigError {
                message: format!(
                    "target rate {}Hz exceeds source rate {}Hz",
                    self.target_rate_hz, self.source_rate_hz
                ),
            });
        }
        if self.cutoff_hz > self.target_rate_hz / 2.0 {
            // Decimation provides no anti-aliasing of its own
            return Err(EcgError::ConfigError {
                message: format!(
                    "cutoff {}Hz exceeds target Nyquist {}Hz",
                    self.cutoff_hz,
                    self.target_rate_hz / 2.0
                ),
            });
        }
        if !(self.decision_threshold > 0.0 && self.decision_threshold < 1.0) {
            return Err(EcgError::ConfigError {
                message: format!(
                    "decision threshold must lie in (0, 1), got {}",
                    self.decision_threshold
                ),
            });
        }
        if self.worker_count == 0 {
            return Err(EcgError::ConfigError {
                message: "worker count must be at least 1".to_string(),
            });
        }
        if self.raw_topic.is_empty() || self.result_topic.is_empty() {
            return Err(EcgError::ConfigError {
                message: "topic names cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Export configuration to JSON
    pub fn to_json(&self) -> EcgResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| EcgError::ConfigError {
            message: format!("failed to serialize configuration: {}", e),
        })
    }

    /// Import configuration from JSON
    pub fn from_json(json: &str) -> EcgResult<Self> {
        serde_json::from_str(json).map_err(|e| EcgError::ConfigError {
            message: format!("failed to deserialize configuration: {}", e),
        })
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> EcgResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| EcgError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json(&text)
    }
}
