//! Core Synthesizer implementation

use crate::config::SynthesizerConfig;
use crate::error::SynthesizerError;
use crate::parser::{parse_insight_response, ParseOutcome};
use crate::prompt::build_insight_prompt;
use crate::selection::{select, Candidate};
use crate::types::SynthesisReport;
use chrono::Utc;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use vantage_domain::{
    format_timestamp, CompletionRequest, EnrichedRecord, FailureKind, InferenceService,
    InsightDocument, ProductContext, RetryPolicy, Row, Source, TableStore,
};
use vantage_store::{lock, with_retry_async, SharedStore};

/// Table holding the single current insight document
pub const INSIGHT_TABLE: &str = "llm_insights";

/// Column carrying the document JSON
pub const DOCUMENT_COLUMN: &str = "insight_document";

const GENERATED_AT_COLUMN: &str = "generated_at";
const MODEL_COLUMN: &str = "model";

fn insight_header() -> Vec<String> {
    [DOCUMENT_COLUMN, GENERATED_AT_COLUMN, MODEL_COLUMN]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Read the stored insight document without an inference client
pub async fn read_current<S: TableStore>(
    store: &SharedStore<S>,
    retry: &RetryPolicy,
) -> Result<Option<InsightDocument>, SynthesizerError> {
    let header = insight_header();
    let rows = with_retry_async(retry, "read_all", || {
        let mut store = lock(store);
        let table = store.open(INSIGHT_TABLE, &header)?;
        store.read_all(&table)
    })
    .await
    .map_err(SynthesizerError::store)?;

    let Some(row) = rows.last() else {
        return Ok(None);
    };
    let json = row.get(DOCUMENT_COLUMN).unwrap_or_default();
    InsightDocument::from_json(json)
        .map(Some)
        .map_err(|e| SynthesizerError::CorruptDocument(e.to_string()))
}

/// Folds every enriched analysis into one insight document
pub struct Synthesizer<L, S> {
    llm: Arc<L>,
    store: SharedStore<S>,
    config: SynthesizerConfig,
    product: ProductContext,
    retry: RetryPolicy,
}

impl<L, S> Synthesizer<L, S>
where
    L: InferenceService,
    S: TableStore,
{
    /// Create a new Synthesizer
    pub fn new(
        llm: Arc<L>,
        store: SharedStore<S>,
        config: SynthesizerConfig,
    ) -> Result<Self, SynthesizerError> {
        config.validate().map_err(SynthesizerError::Config)?;
        Ok(Self {
            llm,
            store,
            config,
            product: ProductContext::default(),
            retry: RetryPolicy::default(),
        })
    }

    /// Frame the prompt around a different product pair
    pub fn with_product(mut self, product: ProductContext) -> Self {
        self.product = product;
        self
    }

    /// Retry policy for table reads and writes
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Active configuration
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Build and store a new insight document
    ///
    /// Makes at most one inference call. When no enriched text exists the
    /// call is skipped and the current document is left in place. On an
    /// inference or store error the current document is also left in
    /// place; unparsable output is stored as a summary-only document.
    pub async fn synthesize(&self) -> Result<SynthesisReport, SynthesizerError> {
        let candidates = self.gather().await?;
        let selection = select(
            candidates,
            self.config.selection,
            self.config.context_budget_chars,
        );

        if selection.is_empty() {
            info!("No enriched analyses available, insight document left unchanged");
            return Ok(SynthesisReport::skipped(selection.available));
        }

        let combined = selection.combined();
        info!(
            available = selection.available,
            selected = selection.texts.len(),
            chars = combined.chars().count(),
            model = %self.llm.model_name(),
            "Starting synthesis"
        );

        let prompt = build_insight_prompt(&self.product, &combined);
        let request = CompletionRequest::deterministic(prompt, self.config.max_tokens);
        let response = timeout(self.config.call_timeout(), self.llm.complete(&request))
            .await
            .map_err(|_| SynthesizerError::Timeout(self.config.call_timeout_secs))?
            .map_err(SynthesizerError::inference)?;

        let (document, outcome) = parse_insight_response(&response);
        if outcome == ParseOutcome::Fallback {
            warn!(
                kind = %FailureKind::MalformedResponse,
                chars = response.len(),
                "Response is not an insight document, storing it as the summary"
            );
        }

        self.replace(&document).await?;
        info!(outcome = ?outcome, "Insight document replaced");

        Ok(SynthesisReport {
            records_available: selection.available,
            records_selected: selection.texts.len(),
            context_chars: combined.chars().count(),
            outcome: outcome.into(),
            document: Some(document),
        })
    }

    /// The stored insight document, if one has been written
    pub async fn current(&self) -> Result<Option<InsightDocument>, SynthesizerError> {
        read_current(&self.store, &self.retry).await
    }

    /// Enriched analyses of every configured source, in table order
    async fn gather(&self) -> Result<Vec<Candidate>, SynthesizerError> {
        let mut candidates = Vec::new();
        for &source in &self.config.sources {
            let rows = self.read_enriched(source).await?;
            let schema = source.schema();
            debug!(source = %source, rows = rows.len(), "Read enriched table");
            candidates.extend(rows.iter().map(|row| {
                let enriched = EnrichedRecord::from_row(source, &schema, row);
                Candidate {
                    source,
                    retrieved_at: enriched.record.retrieved_at,
                    text: enriched.enriched_analysis,
                }
            }));
        }
        Ok(candidates)
    }

    async fn read_enriched(&self, source: Source) -> Result<Vec<Row>, SynthesizerError> {
        let name = source.enriched_table();
        let header = source.schema().enriched_header();
        with_retry_async(&self.retry, "read_all", || {
            let mut store = lock(&self.store);
            let table = store.open(&name, &header)?;
            store.read_all(&table)
        })
        .await
        .map_err(SynthesizerError::store)
    }

    /// Make `document` the insight table's only row
    async fn replace(&self, document: &InsightDocument) -> Result<(), SynthesizerError> {
        let row = Row::new()
            .with(DOCUMENT_COLUMN, document.to_json()?)
            .with(GENERATED_AT_COLUMN, format_timestamp(Utc::now()))
            .with(MODEL_COLUMN, self.llm.model_name());
        let header = insight_header();

        with_retry_async(&self.retry, "replace", || {
            let mut store = lock(&self.store);
            let table = store.open(INSIGHT_TABLE, &header)?;
            store.replace(&table, std::slice::from_ref(&row))
        })
        .await
        .map_err(SynthesizerError::store)?;
        Ok(())
    }
}
