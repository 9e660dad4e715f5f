//! Error types for the pipeline

use std::fmt::Display;
use thiserror::Error;
use vantage_dedup::DedupError;
use vantage_domain::{Classify, CollectorError, FailureKind};
use vantage_enricher::EnricherError;
use vantage_janitor::JanitorError;
use vantage_synthesizer::SynthesizerError;

/// Errors that can occur while setting up or running the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Table store error
    #[error("Store error ({kind}): {message}")]
    Store {
        /// Classification of the underlying error
        kind: FailureKind,
        /// Error text
        message: String,
    },

    /// Inference client could not be built
    #[error("Inference error ({kind}): {message}")]
    Inference {
        /// Classification of the underlying error
        kind: FailureKind,
        /// Error text
        message: String,
    },

    /// Collector failed
    #[error(transparent)]
    Collector(#[from] CollectorError),

    /// Seen set could not be built
    #[error(transparent)]
    Dedup(#[from] DedupError),

    /// Enrichment stage error
    #[error(transparent)]
    Enricher(#[from] EnricherError),

    /// Synthesis stage error
    #[error(transparent)]
    Synthesizer(#[from] SynthesizerError),

    /// Retention stage error
    #[error(transparent)]
    Janitor(#[from] JanitorError),
}

impl PipelineError {
    /// Wrap a store error
    pub fn store<E: Classify + Display>(e: E) -> Self {
        PipelineError::Store {
            kind: e.kind(),
            message: e.to_string(),
        }
    }

    /// Wrap an inference error
    pub fn inference<E: Classify + Display>(e: E) -> Self {
        PipelineError::Inference {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl Classify for PipelineError {
    fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Config(_) | PipelineError::Io(_) | PipelineError::Toml(_) => {
                FailureKind::PermanentService
            }
            PipelineError::Store { kind, .. } | PipelineError::Inference { kind, .. } => *kind,
            PipelineError::Collector(e) => e.kind(),
            PipelineError::Dedup(e) => e.kind(),
            PipelineError::Enricher(e) => e.kind(),
            PipelineError::Synthesizer(e) => e.kind(),
            PipelineError::Janitor(e) => e.kind(),
        }
    }
}
