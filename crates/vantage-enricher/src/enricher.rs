//! Core Enricher implementation

use crate::config::EnricherConfig;
use crate::error::EnricherError;
use crate::prompt::EnrichmentPrompt;
use crate::types::{EnrichmentReport, RecordFailure};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use vantage_dedup::DedupEngine;
use vantage_domain::{
    Classify, CompletionRequest, EnrichedRecord, InferenceService, ProductContext, RawRecord,
    RetryPolicy, Row, Source, SourceSchema, TableHandle, TableStore,
};
use vantage_store::{lock, with_retry_async, SharedStore};

/// Turns raw records into enriched records, one inference call each
pub struct Enricher<L, S> {
    llm: Arc<L>,
    store: SharedStore<S>,
    dedup: Arc<DedupEngine<S>>,
    config: EnricherConfig,
    product: ProductContext,
    retry: RetryPolicy,
}

impl<L, S> Enricher<L, S>
where
    L: InferenceService,
    S: TableStore,
{
    /// Create a new Enricher
    pub fn new(
        llm: Arc<L>,
        store: SharedStore<S>,
        dedup: Arc<DedupEngine<S>>,
        config: EnricherConfig,
    ) -> Result<Self, EnricherError> {
        config.validate().map_err(EnricherError::Config)?;
        Ok(Self {
            llm,
            store,
            dedup,
            config,
            product: ProductContext::default(),
            retry: RetryPolicy::default(),
        })
    }

    /// Frame prompts around a different product pair
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
    pub fn config(&self) -> &EnricherConfig {
        &self.config
    }

    /// Enrich a single record
    ///
    /// The response text is stored as-is; it is never parsed per record.
    pub async fn enrich_record(&self, record: &RawRecord) -> Result<EnrichedRecord, EnricherError> {
        let analysis = self.analyse(record).await?;
        Ok(EnrichedRecord::new(record.clone(), analysis))
    }

    /// Enrich every raw record of `source` not yet in its enriched table
    ///
    /// Records are analysed concurrently (up to `concurrency` calls in
    /// flight) and written in batches of `batch_size` as results arrive. A
    /// failed record is reported and left out, so the next run retries it.
    pub async fn enrich_source(&self, source: Source) -> Result<EnrichmentReport, EnricherError> {
        let schema = source.schema();
        let mut report = EnrichmentReport::new(source);

        let records: Vec<RawRecord> = self
            .read_raw(source, &schema)
            .await?
            .iter()
            .map(|row| RawRecord::from_row(source, &schema, row))
            .collect();
        report.considered = records.len();

        let seen = self.dedup.already_enriched(source).await?;
        let mut fresh = self.dedup.filter_new(records, &seen);
        report.already_enriched = report.considered - fresh.len();

        if let Some(limit) = self.config.max_records_per_run {
            if fresh.len() > limit {
                report.deferred = fresh.len() - limit;
                fresh.truncate(limit);
            }
        }

        info!(
            source = %source,
            considered = report.considered,
            new = fresh.len(),
            deferred = report.deferred,
            model = %self.llm.model_name(),
            "Starting enrichment"
        );
        if fresh.is_empty() {
            return Ok(report);
        }

        let table = self.open_enriched(source, &schema).await?;

        let mut results = stream::iter(fresh)
            .map(|record| async move {
                let outcome = self.analyse(&record).await;
                (record, outcome)
            })
            .buffer_unordered(self.config.concurrency);

        // This loop is the only writer; workers never touch the store
        let mut batch: Vec<EnrichedRecord> = Vec::with_capacity(self.config.batch_size);
        while let Some((record, outcome)) = results.next().await {
            match outcome {
                Ok(analysis) => {
                    batch.push(EnrichedRecord::new(record, analysis));
                    if batch.len() >= self.config.batch_size {
                        self.flush(&table, &schema, &mut batch, &mut report).await;
                    }
                }
                Err(e) => {
                    warn!(source = %source, kind = %e.kind(), error = %e, "Record skipped");
                    report
                        .failures
                        .push(RecordFailure::new(&record, e.kind(), e.to_string()));
                }
            }
        }
        self.flush(&table, &schema, &mut batch, &mut report).await;

        info!(
            source = %source,
            enriched = report.enriched,
            failed = report.failed(),
            batches = report.batches_written,
            "Enrichment complete"
        );
        Ok(report)
    }

    async fn analyse(&self, record: &RawRecord) -> Result<String, EnricherError> {
        let prompt = EnrichmentPrompt::new(record, &self.product).build();
        let request = CompletionRequest::deterministic(prompt, self.config.max_tokens);

        let analysis = timeout(self.config.record_timeout(), self.llm.complete(&request))
            .await
            .map_err(|_| EnricherError::Timeout(self.config.record_timeout_secs))?
            .map_err(EnricherError::inference)?;

        if analysis.trim().is_empty() {
            return Err(EnricherError::EmptyResponse);
        }
        debug!(chars = analysis.len(), "Record analysed");
        Ok(analysis)
    }

    async fn flush(
        &self,
        table: &TableHandle,
        schema: &SourceSchema,
        batch: &mut Vec<EnrichedRecord>,
        report: &mut EnrichmentReport,
    ) {
        if batch.is_empty() {
            return;
        }

        let rows: Vec<Row> = batch.iter().map(|e| e.to_row(schema)).collect();
        let written = with_retry_async(&self.retry, "append", || {
            lock(&self.store).append(table, &rows)
        })
        .await;

        match written {
            Ok(count) => {
                debug!(table = %table.name, rows = count, "Batch written");
                report.enriched += count;
                report.batches_written += 1;
                batch.clear();
            }
            Err(e) => {
                warn!(
                    table = %table.name,
                    kind = %e.kind(),
                    rows = rows.len(),
                    error = %e,
                    "Batch write failed, records stay eligible"
                );
                for enriched in batch.drain(..) {
                    report
                        .failures
                        .push(RecordFailure::new(&enriched.record, e.kind(), e.to_string()));
                }
            }
        }
    }

    async fn read_raw(&self, source: Source, schema: &SourceSchema) -> Result<Vec<Row>, EnricherError> {
        let header = schema.raw_header();
        with_retry_async(&self.retry, "read_all", || {
            let mut store = lock(&self.store);
            let table = store.open(source.raw_table(), &header)?;
            store.read_all(&table)
        })
        .await
        .map_err(EnricherError::store)
    }

    async fn open_enriched(
        &self,
        source: Source,
        schema: &SourceSchema,
    ) -> Result<TableHandle, EnricherError> {
        let name = source.enriched_table();
        let header = schema.enriched_header();
        with_retry_async(&self.retry, "open", || lock(&self.store).open(&name, &header))
            .await
            .map_err(EnricherError::store)
    }
}
