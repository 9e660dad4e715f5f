//! Vantage Enricher
//!
//! Incremental per-record enrichment: every raw record whose fingerprint is
//! not yet in its source's enriched table gets one deterministic inference
//! call, and the raw response text is appended next to the record's fields.
//!
//! # Architecture
//!
//! ```text
//! raw table → DedupEngine::filter_new → bounded worker pool → single writer → enriched table
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vantage_dedup::DedupEngine;
//! use vantage_domain::Source;
//! use vantage_enricher::{Enricher, EnricherConfig};
//! use vantage_llm::MockProvider;
//! use vantage_store::{shared, SqliteTableStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = shared(SqliteTableStore::new("vantage.db")?);
//! let dedup = Arc::new(DedupEngine::new(store.clone()));
//! let llm = Arc::new(MockProvider::new(r#"{"sentiment": "neutral"}"#));
//!
//! let enricher = Enricher::new(llm, store, dedup, EnricherConfig::default())?;
//! let report = enricher.enrich_source(Source::Reviews).await?;
//! println!("Enriched {} records, {} failed", report.enriched, report.failed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod enricher;
mod error;
mod prompt;
mod types;

pub use config::EnricherConfig;
pub use enricher::Enricher;
pub use error::EnricherError;
pub use prompt::{EnrichmentPrompt, TAXONOMY};
pub use types::{EnrichmentReport, RecordFailure};
