//! Vantage Janitor
//!
//! Retention cleanup for raw tables of time-bounded sources.
//!
//! # Overview
//!
//! Each [`RetentionRule`] names a source, the field holding a row's date and
//! a horizon in days. A sweep reads the source's raw table and:
//! - keeps rows dated on or after `now - horizon_days`
//! - keeps rows whose date is missing or cannot be parsed
//! - removes the rest, by rewriting the table or deleting rows highest index first
//!
//! Enriched tables are never touched; an enriched record outlives its raw row.
//!
//! | Source | Field | Horizon |
//! |--------|-------|---------|
//! | **forum** | `Date` | 399 days |
//! | **news** | `published_at` | 250 days |
//!
//! # Configuration
//!
//! ```toml
//! [retention]
//! mode = "rewrite"        # or "delete_by_index"
//! dry_run = false
//!
//! [[retention.rules]]
//! source = "news"
//! timestamp_field = "published_at"
//! horizon_days = 250
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;

pub use config::{CleanupMode, JanitorConfig, RetentionRule};
pub use error::JanitorError;
pub use janitor::{verdict, Janitor, SourceCleanup, SourceFailure, SweepReport, Verdict};
pub use metrics::{JanitorMetrics, SourceCounts};
