//! Synthesis run results

use crate::parser::ParseOutcome;
use serde::Serialize;
use std::fmt;
use vantage_domain::InsightDocument;

/// What a synthesis run did to the insight table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisOutcome {
    /// No enriched text was available; nothing was called or written
    Skipped,

    /// A parsed document replaced the previous one
    Parsed,

    /// A summary-only fallback document replaced the previous one
    Fallback,
}

impl From<ParseOutcome> for SynthesisOutcome {
    fn from(outcome: ParseOutcome) -> Self {
        match outcome {
            ParseOutcome::Parsed => SynthesisOutcome::Parsed,
            ParseOutcome::Fallback => SynthesisOutcome::Fallback,
        }
    }
}

impl fmt::Display for SynthesisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SynthesisOutcome::Skipped => "skipped",
            SynthesisOutcome::Parsed => "parsed",
            SynthesisOutcome::Fallback => "fallback",
        })
    }
}

/// Outcome of one synthesis run
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    /// Enriched analyses with non-empty text across the configured sources
    pub records_available: usize,

    /// Analyses that fit in the context budget
    pub records_selected: usize,

    /// Characters of combined text sent
    pub context_chars: usize,

    /// What happened to the insight table
    pub outcome: SynthesisOutcome,

    /// The document written, if any
    pub document: Option<InsightDocument>,
}

impl SynthesisReport {
    pub(crate) fn skipped(records_available: usize) -> Self {
        Self {
            records_available,
            records_selected: 0,
            context_chars: 0,
            outcome: SynthesisOutcome::Skipped,
            document: None,
        }
    }

    /// Whether a new document was written
    pub fn written(&self) -> bool {
        self.document.is_some()
    }
}
