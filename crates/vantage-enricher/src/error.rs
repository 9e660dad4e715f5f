//! Error types for the Enricher

use std::fmt::Display;
use thiserror::Error;
use vantage_dedup::DedupError;
use vantage_domain::{Classify, FailureKind};

/// Errors that can occur during enrichment
#[derive(Error, Debug)]
pub enum EnricherError {
    /// Inference service error
    #[error("Inference error ({kind}): {message}")]
    Inference {
        /// Classification of the underlying error
        kind: FailureKind,
        /// Error text
        message: String,
    },

    /// Table store error
    #[error("Store error ({kind}): {message}")]
    Store {
        /// Classification of the underlying error
        kind: FailureKind,
        /// Error text
        message: String,
    },

    /// Seen set could not be built
    #[error(transparent)]
    Dedup(#[from] DedupError),

    /// One record's inference took too long
    #[error("Inference timed out after {0}s")]
    Timeout(u64),

    /// The service answered with nothing
    #[error("Empty analysis returned")]
    EmptyResponse,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EnricherError {
    pub(crate) fn inference<E: Classify + Display>(e: E) -> Self {
        EnricherError::Inference {
            kind: e.kind(),
            message: e.to_string(),
        }
    }

    pub(crate) fn store<E: Classify + Display>(e: E) -> Self {
        EnricherError::Store {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl Classify for EnricherError {
    fn kind(&self) -> FailureKind {
        match self {
            EnricherError::Inference { kind, .. } | EnricherError::Store { kind, .. } => *kind,
            EnricherError::Dedup(e) => e.kind(),
            EnricherError::Timeout(_) => FailureKind::TransientService,
            EnricherError::EmptyResponse => FailureKind::MalformedResponse,
            EnricherError::Config(_) => FailureKind::PermanentService,
        }
    }
}
