//! Enrichment runs against an in-memory store and a mock provider

use std::sync::Arc;
use vantage_dedup::DedupEngine;
use vantage_domain::{
    EnrichedRecord, FailureKind, RawRecord, RetryPolicy, Source, TableStore,
};
use vantage_enricher::{Enricher, EnricherConfig};
use vantage_llm::MockProvider;
use vantage_store::{lock, shared, MemoryTableStore, SharedStore};

fn review(reviewer: &str, text: &str) -> RawRecord {
    RawRecord::new(Source::Reviews)
        .with_field("reviewer", reviewer)
        .with_field("review_text", text)
        .with_field("rating", "3")
}

fn seed_raw(store: &SharedStore<MemoryTableStore>, records: &[RawRecord]) {
    let source = records[0].source;
    let schema = source.schema();
    let mut guard = lock(store);
    let table = guard.open(source.raw_table(), &schema.raw_header()).unwrap();
    let rows: Vec<_> = records.iter().map(|r| r.to_row(&schema)).collect();
    guard.append(&table, &rows).unwrap();
}

fn seed_enriched(store: &SharedStore<MemoryTableStore>, records: &[RawRecord]) {
    let source = records[0].source;
    let schema = source.schema();
    let mut guard = lock(store);
    let table = guard
        .open(&source.enriched_table(), &schema.enriched_header())
        .unwrap();
    let rows: Vec<_> = records
        .iter()
        .map(|r| EnrichedRecord::new(r.clone(), "{\"sentiment\":\"neutral\"}").to_row(&schema))
        .collect();
    guard.append(&table, &rows).unwrap();
}

fn enricher(
    store: &SharedStore<MemoryTableStore>,
    llm: &MockProvider,
    config: EnricherConfig,
) -> Enricher<MockProvider, MemoryTableStore> {
    let dedup = Arc::new(DedupEngine::new(store.clone()).with_retry(RetryPolicy::immediate(3)));
    Enricher::new(Arc::new(llm.clone()), store.clone(), dedup, config)
        .unwrap()
        .with_retry(RetryPolicy::immediate(3))
}

#[tokio::test]
async fn test_only_new_records_are_enriched() {
    let store = shared(MemoryTableStore::new());
    let records = vec![
        review("Ana", "Valve clicks loudly"),
        review("Ben", "Easy to clean"),
        review("Cy", "Mask too small"),
    ];
    seed_raw(&store, &records);
    seed_enriched(&store, &records[1..2]);
    let llm = MockProvider::new("{\"sentiment\":\"negative\"}");

    let report = enricher(&store, &llm, EnricherConfig::default())
        .enrich_source(Source::Reviews)
        .await
        .unwrap();

    assert_eq!(report.considered, 3);
    assert_eq!(report.already_enriched, 1);
    assert_eq!(report.enriched, 2);
    assert_eq!(llm.call_count(), 2);
    assert_eq!(lock(&store).row_count(&Source::Reviews.enriched_table()), 3);
}

#[tokio::test]
async fn test_second_run_enriches_nothing() {
    let store = shared(MemoryTableStore::new());
    seed_raw(&store, &[review("Ana", "Valve clicks"), review("Ben", "Easy to clean")]);
    let llm = MockProvider::new("{}");
    let enricher = enricher(&store, &llm, EnricherConfig::default());

    let first = enricher.enrich_source(Source::Reviews).await.unwrap();
    let second = enricher.enrich_source(Source::Reviews).await.unwrap();

    assert_eq!(first.enriched, 2);
    assert_eq!(second.enriched, 0);
    assert_eq!(second.already_enriched, 2);
    assert_eq!(llm.call_count(), 2);
}

#[tokio::test]
async fn test_reflowed_forum_posts_collapse() {
    let store = shared(MemoryTableStore::new());
    let post = |comments: &str| {
        RawRecord::new(Source::Forum)
            .with_field("Title", "Best spacer for a 2 year old?")
            .with_field("Relevant Comments", comments)
    };
    seed_raw(&store, &[post("2 comments"), post("7 comments")]);
    let llm = MockProvider::new("{}");

    let report = enricher(&store, &llm, EnricherConfig::default())
        .enrich_source(Source::Forum)
        .await
        .unwrap();

    assert_eq!(report.enriched, 1);
    assert_eq!(lock(&store).row_count(&Source::Forum.enriched_table()), 1);
}

#[tokio::test]
async fn test_failed_record_stays_eligible() {
    let store = shared(MemoryTableStore::new());
    seed_raw(
        &store,
        &[review("Ana", "fine"), review("Ben", "poison pill"), review("Cy", "fine too")],
    );
    let llm = MockProvider::new("{}");
    llm.fail_times("poison pill", 1, 401);
    let enricher = enricher(&store, &llm, EnricherConfig::default());

    let first = enricher.enrich_source(Source::Reviews).await.unwrap();
    assert_eq!(first.enriched, 2);
    assert_eq!(first.failed(), 1);
    assert_eq!(first.failures[0].kind, FailureKind::PermanentService);

    let second = enricher.enrich_source(Source::Reviews).await.unwrap();
    assert_eq!(second.enriched, 1);
    assert_eq!(lock(&store).row_count(&Source::Reviews.enriched_table()), 3);
}

#[tokio::test]
async fn test_writes_in_batches() {
    let store = shared(MemoryTableStore::new());
    let records: Vec<_> = (0..25).map(|i| review("R", &format!("review {i}"))).collect();
    seed_raw(&store, &records);
    let appends_before = lock(&store).append_calls();
    let llm = MockProvider::new("{}");

    let report = enricher(&store, &llm, EnricherConfig::default())
        .enrich_source(Source::Reviews)
        .await
        .unwrap();

    assert_eq!(report.enriched, 25);
    assert_eq!(report.batches_written, 3);
    assert_eq!(lock(&store).append_calls() - appends_before, 3);
}

#[tokio::test]
async fn test_per_run_limit_defers_the_rest() {
    let store = shared(MemoryTableStore::new());
    let records: Vec<_> = (0..5).map(|i| review("R", &format!("review {i}"))).collect();
    seed_raw(&store, &records);
    let llm = MockProvider::new("{}");
    let config = EnricherConfig {
        max_records_per_run: Some(2),
        ..EnricherConfig::default()
    };
    let enricher = enricher(&store, &llm, config);

    let first = enricher.enrich_source(Source::Reviews).await.unwrap();
    assert_eq!((first.enriched, first.deferred), (2, 3));

    let second = enricher.enrich_source(Source::Reviews).await.unwrap();
    assert_eq!((second.enriched, second.deferred), (2, 1));
}

#[tokio::test]
async fn test_transient_write_failure_is_retried() {
    let store = shared(MemoryTableStore::new());
    seed_raw(&store, &[review("Ana", "a"), review("Ben", "b")]);
    lock(&store).fail_next_appends(2);
    let llm = MockProvider::new("{}");

    let report = enricher(&store, &llm, EnricherConfig::default())
        .enrich_source(Source::Reviews)
        .await
        .unwrap();

    assert_eq!(report.enriched, 2);
    assert_eq!(report.failed(), 0);
}

#[tokio::test]
async fn test_lost_batch_is_reported_and_recovered() {
    let store = shared(MemoryTableStore::new());
    seed_raw(&store, &[review("Ana", "a"), review("Ben", "b")]);
    lock(&store).fail_next_appends(3);
    let llm = MockProvider::new("{}");
    let enricher = enricher(&store, &llm, EnricherConfig::default());

    let first = enricher.enrich_source(Source::Reviews).await.unwrap();
    assert_eq!(first.enriched, 0);
    assert_eq!(first.failed(), 2);
    assert!(first.failures.iter().all(|f| f.kind == FailureKind::TransientService));

    let second = enricher.enrich_source(Source::Reviews).await.unwrap();
    assert_eq!(second.enriched, 2);
}

#[tokio::test]
async fn test_empty_analysis_is_not_stored() {
    let store = shared(MemoryTableStore::new());
    seed_raw(&store, &[review("Ana", "blank answer")]);
    let llm = MockProvider::new("{}");
    llm.add_response("blank answer", "   ");

    let report = enricher(&store, &llm, EnricherConfig::sequential())
        .enrich_source(Source::Reviews)
        .await
        .unwrap();

    assert_eq!(report.enriched, 0);
    assert_eq!(report.failures[0].kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn test_requests_are_deterministic() {
    let store = shared(MemoryTableStore::new());
    seed_raw(&store, &[review("Ana", "a")]);
    let llm = MockProvider::new("{}");

    enricher(&store, &llm, EnricherConfig::default())
        .enrich_source(Source::Reviews)
        .await
        .unwrap();

    let request = &llm.requests()[0];
    assert_eq!(request.temperature, 0.0);
    assert_eq!(request.max_tokens, 500);
    assert!(request.prompt.contains("reviewer: Ana"));
}

#[tokio::test]
async fn test_empty_source_makes_no_calls() {
    let store = shared(MemoryTableStore::new());
    let llm = MockProvider::new("{}");

    let report = enricher(&store, &llm, EnricherConfig::default())
        .enrich_source(Source::Regulatory)
        .await
        .unwrap();

    assert_eq!(report.considered, 0);
    assert_eq!(llm.call_count(), 0);
}
