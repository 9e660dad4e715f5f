//! Configuration for the Enricher

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Enricher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnricherConfig {
    /// Enriched rows per append call
    pub batch_size: usize,

    /// Inference calls in flight at once
    pub concurrency: usize,

    /// Output bound for one analysis
    pub max_tokens: u32,

    /// New records enriched per source per run; the rest wait for the next run
    pub max_records_per_run: Option<usize>,

    /// Upper bound on one record's inference call, retries included (seconds)
    pub record_timeout_secs: u64,
}

impl EnricherConfig {
    /// Record timeout as a Duration
    pub fn record_timeout(&self) -> Duration {
        Duration::from_secs(self.record_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.max_records_per_run == Some(0) {
            return Err("max_records_per_run must be greater than 0 when set".to_string());
        }
        if self.record_timeout_secs == 0 {
            return Err("record_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Sequential preset: one call at a time, small batches
    pub fn sequential() -> Self {
        Self {
            batch_size: 1,
            concurrency: 1,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            concurrency: 4,
            max_tokens: 500,
            max_records_per_run: None,
            record_timeout_secs: 300,
        }
    }
}
