//! Error types for the CLI application.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] vantage_pipeline::PipelineError),

    /// Table store error
    #[error("Store error: {0}")]
    Store(#[from] vantage_store::StoreError),

    /// Insight document could not be read
    #[error(transparent)]
    Synthesizer(#[from] vantage_synthesizer::SynthesizerError),

    /// Retention configuration rejected
    #[error(transparent)]
    Janitor(#[from] vantage_janitor::JanitorError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Refused to overwrite a file
    #[error("{} already exists (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),
}
