//! Dedup error types

use std::fmt::Display;
use thiserror::Error;
use vantage_domain::{Classify, FailureKind};

/// Errors that can occur while building seen sets
#[derive(Error, Debug)]
pub enum DedupError {
    /// Table store failed after retries
    #[error("Store error ({kind}): {message}")]
    Store {
        /// Classification of the underlying store error
        kind: FailureKind,
        /// Store error text
        message: String,
    },
}

impl DedupError {
    pub(crate) fn store<E: Classify + Display>(e: E) -> Self {
        DedupError::Store {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl Classify for DedupError {
    fn kind(&self) -> FailureKind {
        match self {
            DedupError::Store { kind, .. } => *kind,
        }
    }
}
