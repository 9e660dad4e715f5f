//! Configuration for the Synthesizer

use serde::{Deserialize, Serialize};
use std::time::Duration;
use vantage_domain::Source;

/// Order in which enriched analyses fill the context budget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Newest records first, by retrieval time, then by insertion order
    #[default]
    MostRecentFirst,

    /// Sources in configured order, rows in insertion order
    TableOrder,
}

/// Configuration for the Synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Sources whose enriched tables feed the document
    pub sources: Vec<Source>,

    /// Selection order under the budget
    pub selection: SelectionPolicy,

    /// Maximum characters of combined analysis text sent in one call
    pub context_budget_chars: usize,

    /// Output bound for the document
    pub max_tokens: u32,

    /// Upper bound on the aggregation call (seconds)
    pub call_timeout_secs: u64,
}

impl SynthesizerConfig {
    /// Call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sources.is_empty() {
            return Err("sources must not be empty".to_string());
        }
        if self.context_budget_chars == 0 {
            return Err("context_budget_chars must be greater than 0".to_string());
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if self.call_timeout_secs == 0 {
            return Err("call_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
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

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            sources: Source::ALL.to_vec(),
            selection: SelectionPolicy::MostRecentFirst,
            context_budget_chars: 200_000,
            max_tokens: 1200,
            call_timeout_secs: 300,
        }
    }
}
