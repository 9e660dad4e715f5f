//! Core Janitor implementation for retention cleanup

use crate::config::{CleanupMode, JanitorConfig, RetentionRule};
use crate::error::JanitorError;
use crate::metrics::{JanitorMetrics, SourceCounts};
use chrono::{DateTime, Utc};
use std::time::Instant;
use tracing::{debug, info, warn};
use vantage_domain::{parse_timestamp, Classify, FailureKind, RetryPolicy, Row, Source, TableStore};
use vantage_store::with_retry;

/// What happens to one row under a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Dated within the horizon
    Keep,

    /// No readable date; never removed
    Undated,

    /// Dated before the horizon
    Remove,
}

/// Judge one raw row against `rule` at `now`
///
/// The boundary is inclusive: a row dated exactly `horizon_days` ago stays.
pub fn verdict(row: &Row, rule: &RetentionRule, now: DateTime<Utc>) -> Verdict {
    match row.get(&rule.timestamp_field).and_then(parse_timestamp) {
        None => Verdict::Undated,
        Some(at) if at >= rule.cutoff(now) => Verdict::Keep,
        Some(_) => Verdict::Remove,
    }
}

/// Result of cleaning one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceCleanup {
    /// Source cleaned
    pub source: Source,

    /// Row counts by verdict
    pub counts: SourceCounts,

    /// Whether the table was changed (false on dry runs and when nothing expired)
    pub applied: bool,
}

/// A source whose cleanup failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    /// Source skipped
    pub source: Source,

    /// Failure classification
    pub kind: FailureKind,

    /// Error text
    pub message: String,
}

/// Outcome of one sweep over all rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Sources cleaned, in rule order
    pub cleaned: Vec<SourceCleanup>,

    /// Sources skipped after an error
    pub failures: Vec<SourceFailure>,
}

impl SweepReport {
    /// Rows removed (or that would be, on a dry run)
    pub fn removed(&self) -> usize {
        self.cleaned.iter().map(|c| c.counts.removed).sum()
    }
}

/// Prunes raw tables past their retention horizon
///
/// # Examples
///
/// ```no_run
/// use vantage_janitor::{Janitor, JanitorConfig};
/// use vantage_store::SqliteTableStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteTableStore::new("vantage.db")?;
/// let mut janitor = Janitor::new(JanitorConfig::default())?;
///
/// let report = janitor.sweep(&mut store);
/// println!("Removed {} rows", report.removed());
/// println!("{}", janitor.metrics().summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: JanitorConfig,
    retry: RetryPolicy,
    metrics: JanitorMetrics,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: JanitorConfig) -> Result<Self, JanitorError> {
        config.validate().map_err(JanitorError::Config)?;
        Ok(Self {
            config,
            retry: RetryPolicy::default(),
            metrics: JanitorMetrics::new(),
        })
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self {
            config: JanitorConfig::default(),
            retry: RetryPolicy::default(),
            metrics: JanitorMetrics::new(),
        }
    }

    /// Retry policy for table calls
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &JanitorMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Apply every rule as of now
    pub fn sweep<S: TableStore>(&mut self, store: &mut S) -> SweepReport {
        self.sweep_at(store, Utc::now())
    }

    /// Apply every rule as of `now`
    ///
    /// A failing source is recorded and skipped; the others still run.
    pub fn sweep_at<S: TableStore>(&mut self, store: &mut S, now: DateTime<Utc>) -> SweepReport {
        let start = Instant::now();
        let mut report = SweepReport::default();

        for rule in self.config.rules.clone() {
            match self.clean_source(store, &rule, now) {
                Ok(cleanup) => {
                    self.metrics.record(cleanup.source, cleanup.counts);
                    report.cleaned.push(cleanup);
                }
                Err(e) => {
                    warn!(source = %rule.source, kind = %e.kind(), error = %e, "Cleanup skipped");
                    self.metrics.record_failure();
                    report.failures.push(SourceFailure {
                        source: rule.source,
                        kind: e.kind(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.metrics.record_sweep();
        self.metrics.total_runtime_ms += start.elapsed().as_millis() as u64;
        report
    }

    /// Prune one source's raw table
    pub fn clean_source<S: TableStore>(
        &self,
        store: &mut S,
        rule: &RetentionRule,
        now: DateTime<Utc>,
    ) -> Result<SourceCleanup, JanitorError> {
        let name = rule.source.raw_table();
        let header = rule.source.schema().raw_header();

        let table = with_retry(&self.retry, "open", || store.open(name, &header))
            .map_err(|e| JanitorError::store(name, e))?;
        let rows = with_retry(&self.retry, "read_all", || store.read_all(&table))
            .map_err(|e| JanitorError::store(name, e))?;

        let mut counts = SourceCounts::default();
        let mut kept = Vec::with_capacity(rows.len());
        let mut expired = Vec::new();
        for (index, row) in rows.into_iter().enumerate() {
            match verdict(&row, rule, now) {
                Verdict::Keep => {
                    counts.kept += 1;
                    kept.push(row);
                }
                Verdict::Undated => {
                    counts.undated += 1;
                    kept.push(row);
                }
                Verdict::Remove => {
                    counts.removed += 1;
                    expired.push(index);
                }
            }
        }
        debug!(
            source = %rule.source,
            cutoff = %rule.cutoff(now),
            removed = counts.removed,
            kept = counts.kept,
            undated = counts.undated,
            "Rows classified"
        );

        let mut cleanup = SourceCleanup {
            source: rule.source,
            counts,
            applied: false,
        };
        if counts.removed == 0 {
            return Ok(cleanup);
        }
        if self.config.dry_run {
            info!(source = %rule.source, rows = counts.removed, "DRY RUN: would remove expired rows");
            return Ok(cleanup);
        }

        match self.config.mode {
            CleanupMode::Rewrite => {
                with_retry(&self.retry, "replace", || store.replace(&table, &kept))
                .map_err(|e| JanitorError::store(name, e))?;
            }
            CleanupMode::DeleteByIndex => {
                // Highest first, so earlier indices stay valid
                for &index in expired.iter().rev() {
                    with_retry(&self.retry, "delete_row", || store.delete_row(&table, index))
                        .map_err(|e| JanitorError::store(name, e))?;
                }
            }
        }

        info!(
            source = %rule.source,
            removed = counts.removed,
            kept = counts.kept + counts.undated,
            horizon_days = rule.horizon_days,
            "Expired rows removed"
        );
        cleanup.applied = true;
        Ok(cleanup)
    }
}
