//! Seen sets against a store holding enriched rows

use vantage_dedup::DedupEngine;
use vantage_domain::{EnrichedRecord, RawRecord, Source, TableStore};
use vantage_store::{lock, shared, SqliteTableStore};

fn article(url: &str, title: &str) -> RawRecord {
    RawRecord::new(Source::News)
        .with_field("url", url)
        .with_field("title", title)
        .with_field("published_at", "2025-06-01")
}

#[tokio::test]
async fn test_narrow_key_collapses_reflowed_items() {
    let store = shared(SqliteTableStore::in_memory().unwrap());
    let schema = Source::News.schema();
    {
        let mut guard = lock(&store);
        let table = guard
            .open(&Source::News.enriched_table(), &schema.enriched_header())
            .unwrap();
        let row = EnrichedRecord::new(article("https://n.example/1", "Recall"), "{}").to_row(&schema);
        guard.append(&table, &[row]).unwrap();
    }

    let engine = DedupEngine::new(store);
    let seen = engine.already_enriched(Source::News).await.unwrap();

    // Same URL, edited headline: still the same news item
    let fresh = engine.filter_new(
        vec![
            article("https://n.example/1", "Recall expanded"),
            article("https://n.example/2", "Approval"),
        ],
        &seen,
    );
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].field("url"), Some("https://n.example/2"));
}

#[tokio::test]
async fn test_raw_and_enriched_rows_share_identity() {
    let store = shared(SqliteTableStore::in_memory().unwrap());
    let schema = Source::Reviews.schema();
    let review = RawRecord::new(Source::Reviews)
        .with_field("reviewer", "Lee")
        .with_field("review_text", "Mask seal is poor");
    {
        let mut guard = lock(&store);
        let raw = guard.open(Source::Reviews.raw_table(), &schema.raw_header()).unwrap();
        guard.append(&raw, &[review.to_row(&schema)]).unwrap();
        let enriched = guard
            .open(&Source::Reviews.enriched_table(), &schema.enriched_header())
            .unwrap();
        guard
            .append(&enriched, &[EnrichedRecord::new(review.clone(), "analysis").to_row(&schema)])
            .unwrap();
    }

    let engine = DedupEngine::new(store);
    let present = engine.already_present(Source::Reviews).await.unwrap();
    let enriched = engine.already_enriched(Source::Reviews).await.unwrap();
    assert_eq!(present, enriched);
    assert!(present.contains(&engine.fingerprint(&review)));
}
