//! Vantage Dedup Engine
//!
//! Content fingerprints and the "seen" sets that make enrichment incremental.
//!
//! A record is new for a source when its fingerprint is absent from the
//! fingerprints of that source's enriched table. Fingerprints are recomputed
//! from stored rows on every run and never persisted.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashSet;
//! use vantage_dedup::DedupEngine;
//! use vantage_domain::{RawRecord, Source};
//! use vantage_store::{shared, MemoryTableStore};
//!
//! let engine = DedupEngine::new(shared(MemoryTableStore::new()));
//! let record = RawRecord::new(Source::News).with_field("url", "https://example.com/recall");
//!
//! let mut seen = HashSet::new();
//! seen.insert(engine.fingerprint(&record));
//! assert!(engine.filter_new(vec![record], &seen).is_empty());
//! ```

#![warn(missing_docs)]

mod engine;
mod error;
mod fingerprint;

pub use engine::DedupEngine;
pub use error::DedupError;
pub use fingerprint::{Fingerprint, FingerprintKey, Fingerprinter};
