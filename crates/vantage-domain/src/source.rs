//! Source catalog - one variant per external collector
//!
//! Every source has a fixed raw schema. Collectors for these sources are
//! external; the pipeline only sees their output as [`RawRecord`]s.
//!
//! [`RawRecord`]: crate::RawRecord

use crate::record::ENRICHED_ANALYSIS_COLUMN;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An external feed of observations about the product landscape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Retailer product reviews
    Reviews,

    /// Forum discussions (subreddit posts with relevant comments)
    Forum,

    /// News articles from search feeds
    News,

    /// Regulatory notices (recalls, approvals, safety notices)
    Regulatory,

    /// Encyclopedic summaries of competitor products
    Encyclopedia,

    /// Search-result pages scraped into short summaries
    WebSummaries,
}

impl Source {
    /// Every known source, in the order the orchestrator visits them
    pub const ALL: [Source; 6] = [
        Source::Reviews,
        Source::Forum,
        Source::News,
        Source::Regulatory,
        Source::Encyclopedia,
        Source::WebSummaries,
    ];

    /// Config/CLI name of the source
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Reviews => "reviews",
            Source::Forum => "forum",
            Source::News => "news",
            Source::Regulatory => "regulatory",
            Source::Encyclopedia => "encyclopedia",
            Source::WebSummaries => "web_summaries",
        }
    }

    /// Parse a source from its config/CLI name
    pub fn parse(s: &str) -> Option<Self> {
        Source::ALL
            .into_iter()
            .find(|source| source.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Name of the raw table the collector output lands in
    pub fn raw_table(&self) -> &'static str {
        match self {
            Source::Reviews => "webdata_reviews",
            Source::Forum => "reddit_discussions",
            Source::News => "news_articles",
            Source::Regulatory => "regulatory_updates",
            Source::Encyclopedia => "wikipedia_summaries",
            Source::WebSummaries => "webdata_summaries",
        }
    }

    /// Name of the append-only enriched table for this source
    pub fn enriched_table(&self) -> String {
        format!("{}_enriched", self.raw_table())
    }

    /// How the source is described to the inference service
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Source::Reviews => "product review",
            Source::Forum => "forum discussion",
            Source::News => "news article",
            Source::Regulatory => "regulatory notice",
            Source::Encyclopedia => "encyclopedia summary",
            Source::WebSummaries => "web page summary",
        }
    }

    /// Canonical raw schema of the source
    pub fn schema(&self) -> SourceSchema {
        match self {
            Source::Reviews => SourceSchema::new(
                &["source", "product_title", "reviewer", "rating", "review_text", "review_date", "url"],
                Some("scraped_at"),
            ),
            Source::Forum => SourceSchema::new(
                &["Date", "Subreddit", "Title", "Text", "URL", "Keyword", "Relevant Comments"],
                None,
            ),
            Source::News => SourceSchema::new(
                &["published_at", "source", "title", "description", "url", "competitor"],
                None,
            ),
            Source::Regulatory => SourceSchema::new(
                &[
                    "source_url", "source_type", "competitor", "product", "country", "raw_text",
                    "summarized", "date",
                ],
                None,
            ),
            Source::Encyclopedia => SourceSchema::new(&["page", "summary", "competitor"], Some("retrieved_at")),
            Source::WebSummaries => SourceSchema::new(
                &["source", "title", "snippet", "url", "additional_info"],
                Some("retrieved_at"),
            ),
        }
    }

    /// Fields that identify a logical item when the full record is too noisy
    ///
    /// `None` means the full field set is fingerprinted.
    pub fn default_key_fields(&self) -> Option<&'static [&'static str]> {
        match self {
            // Reflowed posts keep their title but gain comments and edits
            Source::Forum => Some(&["Title"]),
            Source::News => Some(&["url"]),
            _ => None,
        }
    }

    /// Default retention: (timestamp field, horizon in days)
    pub fn default_retention(&self) -> Option<(&'static str, u32)> {
        match self {
            Source::Forum => Some(("Date", 399)),
            Source::News => Some(("published_at", 250)),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed field set of one source's raw table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSchema {
    fields: Vec<String>,
    retrieved_at_column: Option<String>,
}

impl SourceSchema {
    /// Build a schema from its content fields and optional retrieval-time column
    pub fn new(fields: &[&str], retrieved_at_column: Option<&str>) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            retrieved_at_column: retrieved_at_column.map(str::to_string),
        }
    }

    /// Content fields, in canonical order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Column carrying the retrieval timestamp, if the source records one
    pub fn retrieved_at_column(&self) -> Option<&str> {
        self.retrieved_at_column.as_deref()
    }

    /// Whether `name` is one of the content fields
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Header of the raw table
    pub fn raw_header(&self) -> Vec<String> {
        let mut header = self.fields.clone();
        if let Some(column) = &self.retrieved_at_column {
            header.push(column.clone());
        }
        header
    }

    /// Header of the enriched table: the raw header plus the analysis column
    pub fn enriched_header(&self) -> Vec<String> {
        let mut header = self.raw_header();
        header.push(ENRICHED_ANALYSIS_COLUMN.to_string());
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for source in Source::ALL {
            assert_eq!(Source::parse(source.as_str()), Some(source));
        }
        assert_eq!(Source::parse(" Forum "), Some(Source::Forum));
        assert_eq!(Source::parse("twitter"), None);
    }

    #[test]
    fn test_table_names() {
        assert_eq!(Source::Forum.raw_table(), "reddit_discussions");
        assert_eq!(Source::Forum.enriched_table(), "reddit_discussions_enriched");
        assert_eq!(Source::Reviews.enriched_table(), "webdata_reviews_enriched");
    }

    #[test]
    fn test_headers() {
        let schema = Source::Encyclopedia.schema();
        assert_eq!(schema.raw_header(), vec!["page", "summary", "competitor", "retrieved_at"]);
        assert_eq!(
            schema.enriched_header(),
            vec!["page", "summary", "competitor", "retrieved_at", "enriched_analysis"]
        );
        assert!(schema.has_field("summary"));
        assert!(!schema.has_field("retrieved_at"));
    }

    #[test]
    fn test_key_fields_exist_in_schema() {
        for source in Source::ALL {
            if let Some(keys) = source.default_key_fields() {
                let schema = source.schema();
                assert!(keys.iter().all(|k| schema.has_field(k)), "{source}");
            }
            if let Some((field, _)) = source.default_retention() {
                assert!(source.schema().raw_header().iter().any(|h| h == field), "{source}");
            }
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Source::WebSummaries).unwrap();
        assert_eq!(json, "\"web_summaries\"");
        let parsed: Source = serde_json::from_str("\"forum\"").unwrap();
        assert_eq!(parsed, Source::Forum);
    }
}
