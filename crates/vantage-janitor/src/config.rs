//! Configuration for retention cleanup
//!
//! Defines per-source horizons and how pruned tables are rewritten.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use vantage_domain::Source;

/// How far back one source's raw table is kept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionRule {
    /// Source whose raw table is pruned
    pub source: Source,

    /// Field holding the row's date
    pub timestamp_field: String,

    /// Rows dated before `now - horizon_days` are removed
    pub horizon_days: u32,
}

impl RetentionRule {
    /// Build a rule
    pub fn new(source: Source, timestamp_field: impl Into<String>, horizon_days: u32) -> Self {
        Self {
            source,
            timestamp_field: timestamp_field.into(),
            horizon_days,
        }
    }

    /// Built-in rule for `source`, if it is time-bounded
    pub fn default_for(source: Source) -> Option<Self> {
        source
            .default_retention()
            .map(|(field, days)| Self::new(source, field, days))
    }

    /// Oldest timestamp still kept at `now`
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.horizon_days))
    }
}

/// How removed rows leave the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupMode {
    /// Clear the table and append the kept rows
    #[default]
    Rewrite,

    /// Delete removed rows one by one, highest index first
    DeleteByIndex,
}

/// Configuration for the Janitor
///
/// # Examples
///
/// ```
/// use vantage_janitor::{CleanupMode, JanitorConfig};
///
/// let config = JanitorConfig::default();
/// assert_eq!(config.rules.len(), 2);
/// assert_eq!(config.mode, CleanupMode::Rewrite);
///
/// let preview = JanitorConfig::preview();
/// assert!(preview.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JanitorConfig {
    /// One rule per time-bounded source
    pub rules: Vec<RetentionRule>,

    /// Rewrite or delete by index
    pub mode: CleanupMode,

    /// Count what would be removed without touching the tables
    pub dry_run: bool,
}

impl Default for JanitorConfig {
    /// Forum posts kept 399 days, news 250 days
    fn default() -> Self {
        Self {
            rules: Source::ALL
                .iter()
                .filter_map(|s| RetentionRule::default_for(*s))
                .collect(),
            mode: CleanupMode::Rewrite,
            dry_run: false,
        }
    }
}

impl JanitorConfig {
    /// Default rules, reporting only
    pub fn preview() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }

    /// Rule for `source`, if configured
    pub fn rule_for(&self, source: Source) -> Option<&RetentionRule> {
        self.rules.iter().find(|r| r.source == source)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.source) {
                return Err(format!("more than one retention rule for {}", rule.source));
            }
            if rule.horizon_days == 0 {
                return Err(format!("horizon_days for {} must be greater than 0", rule.source));
            }
            let header = rule.source.schema().raw_header();
            if !header.iter().any(|column| *column == rule.timestamp_field) {
                return Err(format!(
                    "{} has no field named {:?}",
                    rule.source, rule.timestamp_field
                ));
            }
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
