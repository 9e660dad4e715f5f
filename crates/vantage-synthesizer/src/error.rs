//! Error types for the Synthesizer

use std::fmt::Display;
use thiserror::Error;
use vantage_domain::{Classify, FailureKind};

/// Errors that can occur during synthesis
///
/// Unparsable service output is not an error; it becomes a fallback document.
#[derive(Error, Debug)]
pub enum SynthesizerError {
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

    /// The aggregation call took too long
    #[error("Inference timed out after {0}s")]
    Timeout(u64),

    /// Document could not be encoded for storage
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Stored document does not decode
    #[error("Stored insight document is corrupt: {0}")]
    CorruptDocument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SynthesizerError {
    pub(crate) fn inference<E: Classify + Display>(e: E) -> Self {
        SynthesizerError::Inference {
            kind: e.kind(),
            message: e.to_string(),
        }
    }

    pub(crate) fn store<E: Classify + Display>(e: E) -> Self {
        SynthesizerError::Store {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl Classify for SynthesizerError {
    fn kind(&self) -> FailureKind {
        match self {
            SynthesizerError::Inference { kind, .. } | SynthesizerError::Store { kind, .. } => *kind,
            SynthesizerError::Timeout(_) => FailureKind::TransientService,
            SynthesizerError::CorruptDocument(_) => FailureKind::SchemaDrift,
            SynthesizerError::Serialize(_) | SynthesizerError::Config(_) => {
                FailureKind::PermanentService
            }
        }
    }
}
