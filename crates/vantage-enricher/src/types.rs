//! Enrichment run results

use vantage_domain::{FailureKind, RawRecord, Source};

/// A record that could not be enriched this run
///
/// The record stays out of the enriched table and is picked up again by the
/// next run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFailure {
    /// Short human label for the record
    pub label: String,

    /// Failure classification
    pub kind: FailureKind,

    /// Error text
    pub message: String,
}

impl RecordFailure {
    pub(crate) fn new(record: &RawRecord, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            label: record_label(record),
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of enriching one source
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentReport {
    /// Source processed
    pub source: Source,

    /// Rows read from the raw table
    pub considered: usize,

    /// Rows skipped because their fingerprint was already enriched
    /// (or repeated within the raw table)
    pub already_enriched: usize,

    /// New records left for a later run by `max_records_per_run`
    pub deferred: usize,

    /// Records enriched and written
    pub enriched: usize,

    /// Records attempted but not written
    pub failures: Vec<RecordFailure>,

    /// Append calls that succeeded
    pub batches_written: usize,
}

impl EnrichmentReport {
    pub(crate) fn new(source: Source) -> Self {
        Self {
            source,
            considered: 0,
            already_enriched: 0,
            deferred: 0,
            enriched: 0,
            failures: Vec::new(),
            batches_written: 0,
        }
    }

    /// Records attempted but not written
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

const LABEL_CHARS: usize = 60;

/// First non-empty field value, truncated
fn record_label(record: &RawRecord) -> String {
    let value = record
        .fields
        .iter()
        .map(|(_, v)| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or("<empty record>");

    if value.chars().count() > LABEL_CHARS {
        let cut: String = value.chars().take(LABEL_CHARS).collect();
        format!("{}...", cut)
    } else {
        value.to_string()
    }
}
