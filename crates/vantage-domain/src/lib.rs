//! Vantage Domain Layer
//!
//! Core model shared by every stage of the insight pipeline. Infrastructure
//! (table storage, inference clients, collectors) is reached only through the
//! trait seams defined in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Source**: one external feed of observations (reviews, forum posts, news...)
//! - **Raw Record**: a collector's observation, stored unchanged in the raw table
//! - **Enriched Record**: a raw record plus the inference service's analysis text
//! - **Insight Document**: the single current report synthesized from all enrichment
//! - **Product Context**: our product and the competitor every prompt is framed around
//! - **Failure Kind**: the error taxonomy every crate classifies its errors into
//!
//! ## Data Flow
//!
//! ```text
//! Collector → raw table → dedup filter → enricher → enriched table
//!                                                        ↓
//!                                     insight table ← synthesizer
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod failure;
pub mod insight;
pub mod product;
pub mod record;
pub mod retry;
pub mod run;
pub mod source;
pub mod timestamp;
pub mod traits;

// Re-exports for convenience
pub use failure::{Classify, FailureKind};
pub use insight::{CompetitorInsight, InsightDocument, MarketingRecommendations, RegulatoryNotes};
pub use product::ProductContext;
pub use record::{EnrichedRecord, RawRecord, Row, ENRICHED_ANALYSIS_COLUMN};
pub use retry::RetryPolicy;
pub use run::RunId;
pub use source::{Source, SourceSchema};
pub use timestamp::{format_timestamp, parse_timestamp};
pub use traits::{
    Collector, CollectorError, CompletionRequest, InferenceService, TableHandle, TableStore,
};
