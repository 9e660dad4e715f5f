//! Pipeline configuration file
//!
//! One TOML file drives a run. Every section is optional; missing values
//! take their defaults. Secrets never live here: the inference API key is
//! read from the environment variable named by `[inference].api_key_env`.
//!
//! ```toml
//! [store]
//! path = "vantage.db"
//!
//! [inference]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [sources.forum]
//! input = "inbox/forum.jsonl"
//! key_fields = ["Title"]
//! horizon_days = 399
//! ```

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vantage_dedup::FingerprintKey;
use vantage_domain::{ProductContext, RetryPolicy, Source};
use vantage_enricher::EnricherConfig;
use vantage_janitor::{JanitorConfig, RetentionRule};
use vantage_synthesizer::SynthesizerConfig;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "vantage.toml";

/// Where tables live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("vantage.db"),
        }
    }
}

/// Which inference backend answers prompts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions
    #[default]
    OpenAi,

    /// Local Ollama server
    Ollama,

    /// Canned responses, no network
    Mock,
}

/// Inference service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Backend
    pub provider: ProviderKind,

    /// Model name; the backend's default when unset
    pub model: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Endpoint override
    pub base_url: Option<String>,

    /// Per-request HTTP timeout (seconds); the backend's default when unset
    pub timeout_secs: Option<u64>,

    /// Response returned by the mock backend
    pub mock_response: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAi,
            model: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: None,
            timeout_secs: None,
            mock_response: "{}".to_string(),
        }
    }
}

/// Per-source overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Skip the source entirely when false
    pub enabled: bool,

    /// Narrow fingerprint key; the whole record when unset and no built-in key exists
    pub key_fields: Option<Vec<String>>,

    /// Retention horizon override
    pub horizon_days: Option<u32>,

    /// Retention date field override
    pub timestamp_field: Option<String>,

    /// JSON Lines drop file read by the ingestion stage
    pub input: Option<PathBuf>,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            key_fields: None,
            horizon_days: None,
            timestamp_field: None,
            input: None,
        }
    }
}

/// Complete configuration of a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Table store
    pub store: StoreConfig,

    /// Inference service
    pub inference: InferenceConfig,

    /// Retry policy for store and inference calls
    pub retry: RetryPolicy,

    /// Enrichment stage
    pub enrichment: EnricherConfig,

    /// Synthesis stage
    pub synthesis: SynthesizerConfig,

    /// Retention stage
    pub retention: JanitorConfig,

    /// Product pair named in prompts
    pub product: ProductContext,

    /// Overrides keyed by source name
    pub sources: BTreeMap<String, SourceSettings>,
}

impl PipelineConfig {
    /// Configuration written by `init-config`: defaults plus one drop file per source
    pub fn starter() -> Self {
        let sources = Source::ALL
            .iter()
            .map(|s| {
                let settings = SourceSettings {
                    input: Some(PathBuf::from(format!("inbox/{}.jsonl", s.as_str()))),
                    ..SourceSettings::default()
                };
                (s.as_str().to_string(), settings)
            })
            .collect();
        Self {
            sources,
            ..Self::default()
        }
    }

    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&contents)?;
        config.validate().map_err(PipelineError::Config)?;
        Ok(config)
    }

    /// Parse TOML
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(e.to_string()))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        // settings() looks keys up by exact name
        for name in self.sources.keys() {
            if !Source::ALL.iter().any(|s| s.as_str() == name) {
                return Err(format!("unknown source [sources.{}]", name));
            }
        }
        for source in self.enabled_sources() {
            if let Some(fields) = &self.settings(source).key_fields {
                let schema = source.schema();
                if fields.is_empty() {
                    return Err(format!("key_fields for {} must not be empty", source));
                }
                if let Some(unknown) = fields.iter().find(|f| !schema.has_field(f)) {
                    return Err(format!("{} has no field named {:?}", source, unknown));
                }
            }
        }
        if self.enabled_sources().is_empty() {
            return Err("every source is disabled".to_string());
        }
        self.enrichment.validate()?;
        self.synthesis()
            .validate()
            .map_err(|e| format!("synthesis: {}", e))?;
        self.retention().validate()
    }

    /// Overrides for `source`, or defaults
    pub fn settings(&self, source: Source) -> SourceSettings {
        self.sources
            .get(source.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Sources not disabled, in catalog order
    pub fn enabled_sources(&self) -> Vec<Source> {
        Source::ALL
            .iter()
            .copied()
            .filter(|s| self.settings(*s).enabled)
            .collect()
    }

    /// Fingerprint key for `source`
    pub fn fingerprint_key(&self, source: Source) -> FingerprintKey {
        match self.settings(source).key_fields {
            Some(fields) => FingerprintKey::fields(fields),
            None => FingerprintKey::default_for(source),
        }
    }

    /// Synthesis settings restricted to enabled sources
    pub fn synthesis(&self) -> SynthesizerConfig {
        let enabled = self.enabled_sources();
        let mut config = self.synthesis.clone();
        config.sources.retain(|s| enabled.contains(s));
        config
    }

    /// Retention settings with per-source overrides folded in
    ///
    /// A source override replaces that source's rule, filling unset parts
    /// from the existing rule or the built-in one. Disabled sources get no rule.
    pub fn retention(&self) -> JanitorConfig {
        let mut config = self.retention.clone();
        for source in Source::ALL {
            let settings = self.settings(source);
            if !settings.enabled {
                config.rules.retain(|r| r.source != source);
                continue;
            }
            if settings.horizon_days.is_none() && settings.timestamp_field.is_none() {
                continue;
            }

            let base = config
                .rule_for(source)
                .cloned()
                .or_else(|| RetentionRule::default_for(source));
            let field = settings
                .timestamp_field
                .or_else(|| base.as_ref().map(|r| r.timestamp_field.clone()));
            let days = settings
                .horizon_days
                .or_else(|| base.as_ref().map(|r| r.horizon_days));

            config.rules.retain(|r| r.source != source);
            // A horizon without a date field has nothing to act on
            if let (Some(field), Some(days)) = (field, days) {
                config.rules.push(RetentionRule::new(source, field, days));
            }
        }
        config
    }
}
