//! Trait definitions for external interactions
//!
//! These traits define the boundaries between pipeline logic and
//! infrastructure. Implementations live in other crates.

use crate::failure::{Classify, FailureKind};
use crate::record::{RawRecord, Row};
use crate::source::Source;
use async_trait::async_trait;
use std::fmt;

/// Handle to an opened table: its name and canonical header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    /// Table name
    pub name: String,

    /// Column names, in order
    pub header: Vec<String>,
}

impl TableHandle {
    /// Create a handle
    pub fn new(name: impl Into<String>, header: Vec<String>) -> Self {
        Self {
            name: name.into(),
            header,
        }
    }
}

/// A named, header-addressed, append-only row table
///
/// Implemented by the infrastructure layer (vantage-store). Every mutating
/// call may be remote I/O and may fail transiently; callers retry
/// `TransientService` failures.
pub trait TableStore {
    /// Error type for store operations
    type Error: std::error::Error + Classify + Send + Sync + 'static;

    /// Open a table, creating it with `header` if absent
    ///
    /// A stored header that differs from `header` is replaced by it; data
    /// rows keep their values for columns present in both.
    fn open(&mut self, name: &str, header: &[String]) -> Result<TableHandle, Self::Error>;

    /// All data rows in insertion order, each carrying exactly the header's columns
    fn read_all(&self, handle: &TableHandle) -> Result<Vec<Row>, Self::Error>;

    /// Append rows in one batch; unknown columns are dropped, missing ones
    /// default to empty. Returns the number of rows written.
    fn append(&mut self, handle: &TableHandle, rows: &[Row]) -> Result<usize, Self::Error>;

    /// Remove all data rows, keeping the header
    fn clear(&mut self, handle: &TableHandle) -> Result<(), Self::Error>;

    /// Swap all data rows for `rows` in one step
    ///
    /// On error the table keeps its previous rows. Rows are conformed as in
    /// [`append`](Self::append). Returns the number of rows written.
    fn replace(&mut self, handle: &TableHandle, rows: &[Row]) -> Result<usize, Self::Error>;

    /// Remove the data row at `index` (0-based, insertion order)
    ///
    /// Later rows shift down by one, so callers deleting several rows must go
    /// from the highest index to the lowest.
    fn delete_row(&mut self, handle: &TableHandle, index: usize) -> Result<(), Self::Error>;
}

/// One call to the inference service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Full prompt text
    pub prompt: String,

    /// Sampling temperature; the pipeline always uses 0.0
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Deterministic request: temperature fixed at zero
    pub fn deterministic(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.0,
            max_tokens,
        }
    }
}

/// Trait for the external natural-language inference service
///
/// Implemented by the infrastructure layer (vantage-llm)
#[async_trait]
pub trait InferenceService: Send + Sync {
    /// Error type for inference operations
    type Error: std::error::Error + Classify + Send + Sync + 'static;

    /// Generate a completion for the request
    async fn complete(&self, request: &CompletionRequest) -> Result<String, Self::Error>;

    /// Model identifier, for logs and reports
    fn model_name(&self) -> &str {
        "llm"
    }
}

/// Trait for source collectors
///
/// Collectors are black boxes producing records in their source's shape. A
/// failing collector only costs its own source for the run.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Source this collector feeds
    fn source(&self) -> Source;

    /// Fetch the current batch of records
    async fn fetch(&self) -> Result<Vec<RawRecord>, CollectorError>;
}

/// A collector or its upstream failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorError {
    /// Source whose collector failed
    pub source: Source,

    /// What went wrong
    pub message: String,
}

impl CollectorError {
    /// Create a collector error
    pub fn new(source: Source, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collector for {} failed: {}", self.source, self.message)
    }
}

impl std::error::Error for CollectorError {}

impl Classify for CollectorError {
    fn kind(&self) -> FailureKind {
        FailureKind::SourceUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedCollector;

    #[async_trait]
    impl Collector for FixedCollector {
        fn source(&self) -> Source {
            Source::News
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>, CollectorError> {
            Ok(vec![RawRecord::new(Source::News).with_field("title", "Launch")])
        }
    }

    #[test]
    fn test_deterministic_request() {
        let request = CompletionRequest::deterministic("prompt", 500);
        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.max_tokens, 500);
    }

    #[test]
    fn test_collector_error_is_source_unavailable() {
        let err = CollectorError::new(Source::Forum, "403 from upstream");
        assert_eq!(err.kind(), FailureKind::SourceUnavailable);
        assert!(err.to_string().contains("forum"));
    }

    #[tokio::test]
    async fn test_collector_object_safety() {
        let collectors: Vec<Box<dyn Collector>> = vec![Box::new(FixedCollector)];
        let records = collectors[0].fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(collectors[0].source(), Source::News);
    }
}
