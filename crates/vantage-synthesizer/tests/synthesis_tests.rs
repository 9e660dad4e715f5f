//! Synthesis runs against an in-memory store and a mock provider

use std::sync::Arc;
use vantage_domain::{
    parse_timestamp, Classify, EnrichedRecord, FailureKind, InsightDocument, RawRecord,
    RetryPolicy, Row, Source, TableStore,
};
use vantage_llm::MockProvider;
use vantage_store::{lock, shared, MemoryTableStore, SharedStore};
use vantage_synthesizer::{
    SelectionPolicy, SynthesisOutcome, Synthesizer, SynthesizerConfig, INSIGHT_TABLE,
};

const DOC: &str = r#"{"executive_summary": "Users like the valve",
    "competitor_insights": [{"competitor": "OptiChamber", "strengths": ["cheap"], "weaknesses": ["loud"]}]}"#;

fn seed(store: &SharedStore<MemoryTableStore>, source: Source, items: &[(&str, Option<&str>)]) {
    let schema = source.schema();
    let mut guard = lock(store);
    let table = guard
        .open(&source.enriched_table(), &schema.enriched_header())
        .unwrap();
    let rows: Vec<_> = items
        .iter()
        .enumerate()
        .map(|(i, (analysis, at))| {
            let mut record =
                RawRecord::new(source).with_field(schema.fields()[0].clone(), format!("item {i}"));
            if let Some(at) = at.and_then(parse_timestamp) {
                record = record.with_retrieved_at(at);
            }
            EnrichedRecord::new(record, *analysis).to_row(&schema)
        })
        .collect();
    guard.append(&table, &rows).unwrap();
}

fn synthesizer(
    store: &SharedStore<MemoryTableStore>,
    llm: &MockProvider,
    config: SynthesizerConfig,
) -> Synthesizer<MockProvider, MemoryTableStore> {
    Synthesizer::new(Arc::new(llm.clone()), store.clone(), config)
        .unwrap()
        .with_retry(RetryPolicy::immediate(3))
}

fn table_order() -> SynthesizerConfig {
    SynthesizerConfig {
        selection: SelectionPolicy::TableOrder,
        ..SynthesizerConfig::default()
    }
}

#[tokio::test]
async fn test_document_replaces_previous() {
    let store = shared(MemoryTableStore::new());
    seed(&store, Source::Reviews, &[("A", None)]);
    seed(&store, Source::Forum, &[("B", None)]);
    let llm = MockProvider::new(DOC);
    let synthesizer = synthesizer(&store, &llm, table_order());

    let first = synthesizer.synthesize().await.unwrap();
    let second = synthesizer.synthesize().await.unwrap();

    assert_eq!(first.outcome, SynthesisOutcome::Parsed);
    assert_eq!(second.records_selected, 2);
    assert_eq!(llm.call_count(), 2);
    assert_eq!(lock(&store).row_count(INSIGHT_TABLE), 1);
    assert!(llm.requests()[0].prompt.contains("Combined enriched data:\nA\nB"));

    let current = synthesizer.current().await.unwrap().unwrap();
    assert_eq!(current.executive_summary, "Users like the valve");
}

#[tokio::test]
async fn test_unparsable_output_becomes_summary() {
    let store = shared(MemoryTableStore::new());
    seed(&store, Source::News, &[("recall announced", None)]);
    let llm = MockProvider::new("not a json document");
    let synthesizer = synthesizer(&store, &llm, SynthesizerConfig::default());

    let report = synthesizer.synthesize().await.unwrap();

    assert_eq!(report.outcome, SynthesisOutcome::Fallback);
    let expected = InsightDocument::summary_only("not a json document");
    assert_eq!(report.document, Some(expected.clone()));
    assert_eq!(synthesizer.current().await.unwrap(), Some(expected));
}

#[tokio::test]
async fn test_fenced_output_is_parsed() {
    let store = shared(MemoryTableStore::new());
    seed(&store, Source::News, &[("recall announced", None)]);
    let llm = MockProvider::new(&format!("```json\n{DOC}\n```"));

    let report = synthesizer(&store, &llm, SynthesizerConfig::default())
        .synthesize()
        .await
        .unwrap();

    assert_eq!(report.outcome, SynthesisOutcome::Parsed);
}

#[tokio::test]
async fn test_no_enriched_text_skips_the_call() {
    let store = shared(MemoryTableStore::new());
    let llm = MockProvider::new(DOC);
    let synthesizer = synthesizer(&store, &llm, SynthesizerConfig::default());

    let report = synthesizer.synthesize().await.unwrap();

    assert_eq!(report.outcome, SynthesisOutcome::Skipped);
    assert!(!report.written());
    assert_eq!(llm.call_count(), 0);
    assert_eq!(synthesizer.current().await.unwrap(), None);
}

#[tokio::test]
async fn test_skip_keeps_existing_document() {
    let store = shared(MemoryTableStore::new());
    seed(&store, Source::Reviews, &[("A", None)]);
    let llm = MockProvider::new(DOC);
    synthesizer(&store, &llm, SynthesizerConfig::default())
        .synthesize()
        .await
        .unwrap();

    // Only the forum table is configured now, and it is empty
    let config = SynthesizerConfig {
        sources: vec![Source::Forum],
        ..SynthesizerConfig::default()
    };
    let synthesizer = synthesizer(&store, &llm, config);
    let report = synthesizer.synthesize().await.unwrap();

    assert_eq!(report.outcome, SynthesisOutcome::Skipped);
    assert!(synthesizer.current().await.unwrap().is_some());
}

#[tokio::test]
async fn test_inference_failure_keeps_existing_document() {
    let store = shared(MemoryTableStore::new());
    seed(&store, Source::Reviews, &[("A", None)]);
    let llm = MockProvider::new(DOC);
    let synthesizer = synthesizer(&store, &llm, SynthesizerConfig::default());
    synthesizer.synthesize().await.unwrap();

    llm.add_failure("Combined enriched data", 401);
    let err = synthesizer.synthesize().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::PermanentService);
    let current = synthesizer.current().await.unwrap().unwrap();
    assert_eq!(current.executive_summary, "Users like the valve");
}

#[tokio::test]
async fn test_store_failure_keeps_existing_document() {
    let store = shared(MemoryTableStore::new());
    seed(&store, Source::Reviews, &[("A", None)]);
    let llm = MockProvider::new(DOC);
    let synthesizer = synthesizer(&store, &llm, SynthesizerConfig::default());
    synthesizer.synthesize().await.unwrap();

    llm.add_response("Combined enriched data", "not a json document");
    lock(&store).fail_next_appends(10);
    let err = synthesizer.synthesize().await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::TransientService);
    assert_eq!(lock(&store).row_count(INSIGHT_TABLE), 1);
    let current = synthesizer.current().await.unwrap().unwrap();
    assert_eq!(current.executive_summary, "Users like the valve");
}

#[tokio::test]
async fn test_most_recent_first_under_budget() {
    let store = shared(MemoryTableStore::new());
    seed(
        &store,
        Source::Reviews,
        &[("old", Some("2025-01-01")), ("new", Some("2025-06-01"))],
    );
    seed(&store, Source::Encyclopedia, &[("mid", Some("2025-03-01"))]);
    let llm = MockProvider::new(DOC);
    let config = SynthesizerConfig {
        context_budget_chars: 7,
        ..SynthesizerConfig::default()
    };

    let report = synthesizer(&store, &llm, config).synthesize().await.unwrap();

    assert_eq!(report.records_available, 3);
    assert_eq!(report.records_selected, 2);
    assert_eq!(report.context_chars, 7);
    assert!(llm.requests()[0].prompt.ends_with("Combined enriched data:\nnew\nmid\n"));
}

#[tokio::test]
async fn test_request_shape() {
    let store = shared(MemoryTableStore::new());
    seed(&store, Source::Regulatory, &[("510(k) cleared", None)]);
    let llm = MockProvider::new(DOC);

    synthesizer(&store, &llm, SynthesizerConfig::default())
        .synthesize()
        .await
        .unwrap();

    let request = &llm.requests()[0];
    assert_eq!(request.temperature, 0.0);
    assert_eq!(request.max_tokens, 1200);
    assert!(request.prompt.contains("Return JSON only."));
}

#[tokio::test]
async fn test_corrupt_stored_document_is_reported() {
    let store = shared(MemoryTableStore::new());
    {
        let mut guard = lock(&store);
        let header = vec!["insight_document".to_string()];
        let table = guard.open(INSIGHT_TABLE, &header).unwrap();
        guard
            .append(&table, &[Row::new().with("insight_document", "{oops")])
            .unwrap();
    }
    let llm = MockProvider::new(DOC);

    let err = synthesizer(&store, &llm, SynthesizerConfig::default())
        .current()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::SchemaDrift);
}
