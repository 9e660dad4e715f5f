//! Metrics collection for Janitor operations

use std::collections::BTreeMap;
use vantage_domain::Source;

/// Row counts for one source in one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceCounts {
    /// Rows past the horizon
    pub removed: usize,

    /// Rows within the horizon
    pub kept: usize,

    /// Rows kept because their date could not be read
    pub undated: usize,
}

impl SourceCounts {
    /// Rows examined
    pub fn total(&self) -> usize {
        self.removed + self.kept + self.undated
    }
}

/// Metrics collected across Janitor sweeps
///
/// Counts are cumulative per source until [`JanitorMetrics::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JanitorMetrics {
    /// Counts per source
    pub per_source: BTreeMap<Source, SourceCounts>,

    /// Sources whose cleanup failed
    pub failed_sources: usize,

    /// Total sweep iterations completed
    pub sweep_count: usize,

    /// Total runtime in milliseconds
    pub total_runtime_ms: u64,
}

impl JanitorMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one source's counts
    pub fn record(&mut self, source: Source, counts: SourceCounts) {
        let entry = self.per_source.entry(source).or_default();
        entry.removed += counts.removed;
        entry.kept += counts.kept;
        entry.undated += counts.undated;
    }

    /// Record a source whose cleanup failed
    pub fn record_failure(&mut self) {
        self.failed_sources += 1;
    }

    /// Record a sweep cycle completion
    pub fn record_sweep(&mut self) {
        self.sweep_count += 1;
    }

    /// Rows removed across all sources
    pub fn total_removed(&self) -> usize {
        self.per_source.values().map(|c| c.removed).sum()
    }

    /// Rows kept across all sources, undated ones included
    pub fn total_kept(&self) -> usize {
        self.per_source.values().map(|c| c.kept + c.undated).sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Janitor Metrics Summary".to_string(),
            "======================".to_string(),
            format!("Sweep cycles: {}", self.sweep_count),
            format!("Total runtime: {}ms", self.total_runtime_ms),
            String::new(),
        ];

        if !self.per_source.is_empty() {
            lines.push("Rows by source (removed / kept / undated):".to_string());
            for (source, counts) in &self.per_source {
                lines.push(format!(
                    "  {}: {} / {} / {}",
                    source, counts.removed, counts.kept, counts.undated
                ));
            }
            lines.push(format!("  Total removed: {}", self.total_removed()));
        }

        if self.failed_sources > 0 {
            lines.push(format!("Failed sources: {}", self.failed_sources));
        }

        lines.join("\n")
    }
}
