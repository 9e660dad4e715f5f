//! Error types for Janitor operations

use thiserror::Error;
use std::fmt::Display;
use vantage_domain::{Classify, FailureKind};

/// Errors that can occur during Janitor operations
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Storage layer error
    #[error("Storage error on {table} ({kind}): {message}")]
    Store {
        /// Table being cleaned
        table: String,
        /// Classification of the underlying error
        kind: FailureKind,
        /// Error text
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl JanitorError {
    pub(crate) fn store<E: Classify + Display>(table: &str, e: E) -> Self {
        JanitorError::Store {
            table: table.to_string(),
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl Classify for JanitorError {
    fn kind(&self) -> FailureKind {
        match self {
            JanitorError::Store { kind, .. } => *kind,
            JanitorError::Config(_) => FailureKind::PermanentService,
        }
    }
}
