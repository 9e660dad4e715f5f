//! Run orchestration

use crate::collector::JsonLinesCollector;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::provider::Provider;
use crate::report::{IngestReport, RunReport, Stage};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use vantage_dedup::DedupEngine;
use vantage_domain::{
    Classify, Collector, InferenceService, InsightDocument, RawRecord, RetryPolicy, Row, Source,
    TableStore,
};
use vantage_enricher::Enricher;
use vantage_janitor::Janitor;
use vantage_store::{lock, shared, with_retry_async, SharedStore, SqliteTableStore};
use vantage_synthesizer::{Synthesizer, INSIGHT_TABLE};

/// Ingestion, cleanup, enrichment and synthesis over one table store
///
/// Stages always run in that order. A failure costs only its unit (a
/// record, a source, or the document) and is recorded in the run report;
/// a run never aborts. Runs against the same store must not overlap.
pub struct Pipeline<L, S> {
    store: SharedStore<S>,
    dedup: Arc<DedupEngine<S>>,
    enricher: Enricher<L, S>,
    synthesizer: Synthesizer<L, S>,
    janitor: Janitor,
    collectors: Vec<Box<dyn Collector>>,
    sources: Vec<Source>,
    retry: RetryPolicy,
}

impl Pipeline<Provider, SqliteTableStore> {
    /// Open the configured SQLite store and inference backend
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let store = SqliteTableStore::new(&config.store.path).map_err(PipelineError::store)?;
        let llm = Provider::from_config(&config.inference, config.retry)?;
        Self::new(Arc::new(llm), shared(store), config)
    }
}

impl<L, S> Pipeline<L, S>
where
    L: InferenceService,
    S: TableStore,
{
    /// Wire every stage from `config`
    ///
    /// Enabled sources with an `input` file get a [`JsonLinesCollector`].
    pub fn new(
        llm: Arc<L>,
        store: SharedStore<S>,
        config: &PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate().map_err(PipelineError::Config)?;

        let dedup = Arc::new(Source::ALL.iter().fold(
            DedupEngine::new(store.clone()).with_retry(config.retry),
            |engine, &source| engine.with_key(source, config.fingerprint_key(source)),
        ));

        let enricher = Enricher::new(
            llm.clone(),
            store.clone(),
            dedup.clone(),
            config.enrichment.clone(),
        )?
        .with_product(config.product.clone())
        .with_retry(config.retry);

        let synthesizer = Synthesizer::new(llm, store.clone(), config.synthesis())?
            .with_product(config.product.clone())
            .with_retry(config.retry);

        let janitor = Janitor::new(config.retention())?.with_retry(config.retry);

        let sources = config.enabled_sources();
        let collectors = sources
            .iter()
            .filter_map(|&source| {
                config.settings(source).input.map(|path| {
                    Box::new(JsonLinesCollector::new(source, path)) as Box<dyn Collector>
                })
            })
            .collect();

        Ok(Self {
            store,
            dedup,
            enricher,
            synthesizer,
            janitor,
            collectors,
            sources,
            retry: config.retry,
        })
    }

    /// Use `collector` for its source, replacing any configured one
    pub fn with_collector(mut self, collector: Box<dyn Collector>) -> Self {
        let source = collector.source();
        self.collectors.retain(|c| c.source() != source);
        self.collectors.push(collector);
        self
    }

    /// Enabled sources, in catalog order
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The stored insight document
    pub async fn current_insight(&self) -> Result<Option<InsightDocument>, PipelineError> {
        Ok(self.synthesizer.current().await?)
    }

    /// Run every stage
    pub async fn run(&mut self) -> RunReport {
        self.run_stages(&Stage::ALL).await
    }

    /// Run the given stages, in pipeline order
    pub async fn run_stages(&mut self, stages: &[Stage]) -> RunReport {
        let mut report = RunReport::new();
        let span = info_span!("run", run_id = %report.run_id);
        let started = Instant::now();

        async {
            info!(stages = ?stages, sources = self.sources.len(), "Run started");
            for stage in Stage::ALL.into_iter().filter(|s| stages.contains(s)) {
                match stage {
                    Stage::Ingest => self.ingest(&mut report).await,
                    Stage::Cleanup => self.cleanup(&mut report),
                    Stage::Enrich => self.enrich(&mut report).await,
                    Stage::Synthesize => self.synthesize(&mut report).await,
                }
            }
            info!(
                ingested = report.total_ingested(),
                enriched = report.total_enriched(),
                skipped = report.skips.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Run finished"
            );
        }
        .instrument(span)
        .await;

        report
    }

    async fn ingest(&self, report: &mut RunReport) {
        for collector in &self.collectors {
            let source = collector.source();
            let span = info_span!("source", source = %source);
            match self.ingest_source(collector.as_ref()).instrument(span).await {
                Ok(ingested) => report.ingest.push(ingested),
                Err(e) => {
                    warn!(stage = %Stage::Ingest, source = %source, kind = %e.kind(), error = %e, "Source skipped");
                    report.skip(Stage::Ingest, source.as_str(), e.kind(), e.to_string());
                }
            }
        }
    }

    /// Append a collector's new records to its raw table
    async fn ingest_source(&self, collector: &dyn Collector) -> Result<IngestReport, PipelineError> {
        let source = collector.source();
        let records: Vec<RawRecord> = collector.fetch().await?;
        let fetched = records.len();

        let seen = self.dedup.already_present(source).await?;
        let fresh = self.dedup.filter_new(records, &seen);
        let mut ingested = IngestReport {
            source,
            fetched,
            duplicates: fetched - fresh.len(),
            appended: 0,
        };

        if !fresh.is_empty() {
            let schema = source.schema();
            let header = schema.raw_header();
            let rows: Vec<Row> = fresh.iter().map(|r| r.to_row(&schema)).collect();
            ingested.appended = with_retry_async(&self.retry, "append", || {
                let mut store = lock(&self.store);
                let table = store.open(source.raw_table(), &header)?;
                store.append(&table, &rows)
            })
            .await
            .map_err(PipelineError::store)?;
        }

        info!(
            fetched = ingested.fetched,
            duplicates = ingested.duplicates,
            appended = ingested.appended,
            "Ingested"
        );
        Ok(ingested)
    }

    fn cleanup(&mut self, report: &mut RunReport) {
        let sweep = {
            let mut store = lock(&self.store);
            self.janitor.sweep(&mut *store)
        };
        for failure in &sweep.failures {
            report.skip(
                Stage::Cleanup,
                failure.source.as_str(),
                failure.kind,
                failure.message.clone(),
            );
        }
        info!(removed = sweep.removed(), failed = sweep.failures.len(), "Cleanup finished");
        report.cleanup = Some(sweep);
    }

    async fn enrich(&self, report: &mut RunReport) {
        for &source in &self.sources {
            let span = info_span!("source", source = %source);
            match self.enricher.enrich_source(source).instrument(span).await {
                Ok(enriched) => {
                    for failure in &enriched.failures {
                        report.skip(
                            Stage::Enrich,
                            format!("{}: {}", source, failure.label),
                            failure.kind,
                            failure.message.clone(),
                        );
                    }
                    report.enrichment.push(enriched);
                }
                Err(e) => {
                    warn!(stage = %Stage::Enrich, source = %source, kind = %e.kind(), error = %e, "Source skipped");
                    report.skip(Stage::Enrich, source.as_str(), e.kind(), e.to_string());
                }
            }
        }
    }

    async fn synthesize(&self, report: &mut RunReport) {
        match self.synthesizer.synthesize().await {
            Ok(synthesis) => report.synthesis = Some(synthesis),
            Err(e) => {
                warn!(stage = %Stage::Synthesize, kind = %e.kind(), error = %e, "Insight document not replaced");
                report.skip(Stage::Synthesize, INSIGHT_TABLE, e.kind(), e.to_string());
            }
        }
    }
}
