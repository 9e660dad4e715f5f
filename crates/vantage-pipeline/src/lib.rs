//! Vantage Pipeline
//!
//! Run orchestrator: wires the table store, the inference backend and every
//! stage from one TOML configuration, then runs
//!
//! ```text
//! ingest → cleanup → enrich → synthesize
//! ```
//!
//! Each run is wrapped in a `run` span carrying its id, and each source in
//! a `source` span. Failures are isolated to a record, a source or the
//! insight document, logged with their [`FailureKind`](vantage_domain::FailureKind),
//! and listed in the [`RunReport`]; the remaining work always proceeds.
//! Reruns are safe: every stage skips what an earlier run already did.
//!
//! # Example Usage
//!
//! ```no_run
//! use vantage_pipeline::{Pipeline, PipelineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::load("vantage.toml")?;
//! let mut pipeline = Pipeline::from_config(&config)?;
//!
//! let report = pipeline.run().await;
//! println!("run {}: {} enriched, {} skipped", report.run_id, report.total_enriched(), report.skips.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod collector;
pub mod config;
mod error;
mod pipeline;
mod provider;
mod report;

pub use collector::JsonLinesCollector;
pub use config::{
    InferenceConfig, PipelineConfig, ProviderKind, SourceSettings, StoreConfig,
    DEFAULT_CONFIG_FILE,
};
pub use error::PipelineError;
pub use pipeline::Pipeline;
pub use provider::Provider;
pub use report::{IngestReport, RunReport, SkipRecord, Stage};
