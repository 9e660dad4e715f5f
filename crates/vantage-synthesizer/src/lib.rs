//! Vantage Synthesizer
//!
//! Aggregation stage: the enriched analyses of every source are combined into
//! one prompt, one inference call produces the insight document, and the
//! insight table is cleared and rewritten with that single document.
//!
//! Output handling never fails the run. A response is stripped of any code
//! fence and parsed; if that fails, the raw text becomes the document's
//! `executive_summary`.
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use vantage_llm::MockProvider;
//! use vantage_store::{shared, SqliteTableStore};
//! use vantage_synthesizer::{Synthesizer, SynthesizerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = shared(SqliteTableStore::new("vantage.db")?);
//! let llm = Arc::new(MockProvider::new(r#"{"executive_summary": "Quiet quarter"}"#));
//!
//! let synthesizer = Synthesizer::new(llm, store, SynthesizerConfig::default())?;
//! let report = synthesizer.synthesize().await?;
//! println!("{} of {} analyses used: {}", report.records_selected, report.records_available, report.outcome);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod parser;
mod prompt;
mod selection;
mod synthesizer;
mod types;

pub use config::{SelectionPolicy, SynthesizerConfig};
pub use error::SynthesizerError;
pub use parser::{parse_insight_response, strip_code_fence, ParseOutcome};
pub use prompt::{build_insight_prompt, INSIGHT_SCHEMA};
pub use selection::{select, Candidate, Selection};
pub use synthesizer::{read_current, Synthesizer, DOCUMENT_COLUMN, INSIGHT_TABLE};
pub use types::{SynthesisOutcome, SynthesisReport};
