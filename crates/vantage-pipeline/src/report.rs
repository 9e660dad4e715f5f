//! Run reports

use chrono::{DateTime, Utc};
use std::fmt;
use vantage_domain::{FailureKind, RunId, Source};
use vantage_enricher::EnrichmentReport;
use vantage_janitor::SweepReport;
use vantage_synthesizer::SynthesisReport;

/// Pipeline stages, in run order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Collector output into raw tables
    Ingest,

    /// Retention cleanup of raw tables
    Cleanup,

    /// Per-record enrichment
    Enrich,

    /// Insight document synthesis
    Synthesize,
}

impl Stage {
    /// Every stage, in run order
    pub const ALL: [Stage; 4] = [Stage::Ingest, Stage::Cleanup, Stage::Enrich, Stage::Synthesize];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Ingest => "ingest",
            Stage::Cleanup => "cleanup",
            Stage::Enrich => "enrich",
            Stage::Synthesize => "synthesize",
        })
    }
}

/// A unit of work skipped this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipRecord {
    /// Stage the unit belongs to
    pub stage: Stage,

    /// Source name, record label, or document
    pub unit: String,

    /// Failure classification
    pub kind: FailureKind,

    /// Error text
    pub message: String,
}

/// Collector output appended to one raw table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Source ingested
    pub source: Source,

    /// Records the collector returned
    pub fetched: usize,

    /// Records already in the raw table, or repeated in the batch
    pub duplicates: usize,

    /// Records appended
    pub appended: usize,
}

/// Everything one run did
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Run identifier, also on every log line of the run
    pub run_id: RunId,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Ingestion per source
    pub ingest: Vec<IngestReport>,

    /// Retention sweep, if the stage ran
    pub cleanup: Option<SweepReport>,

    /// Enrichment per source
    pub enrichment: Vec<EnrichmentReport>,

    /// Synthesis, if the stage ran and succeeded
    pub synthesis: Option<SynthesisReport>,

    /// Every skipped unit, in the order it was skipped
    pub skips: Vec<SkipRecord>,
}

impl RunReport {
    /// Empty report for a new run
    pub fn new() -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
            ingest: Vec::new(),
            cleanup: None,
            enrichment: Vec::new(),
            synthesis: None,
            skips: Vec::new(),
        }
    }

    /// Record a skipped unit
    pub fn skip(
        &mut self,
        stage: Stage,
        unit: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) {
        self.skips.push(SkipRecord {
            stage,
            unit: unit.into(),
            kind,
            message: message.into(),
        });
    }

    /// Records appended to raw tables
    pub fn total_ingested(&self) -> usize {
        self.ingest.iter().map(|r| r.appended).sum()
    }

    /// Records enriched across sources
    pub fn total_enriched(&self) -> usize {
        self.enrichment.iter().map(|r| r.enriched).sum()
    }

    /// Whether nothing was skipped
    pub fn is_clean(&self) -> bool {
        self.skips.is_empty()
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
