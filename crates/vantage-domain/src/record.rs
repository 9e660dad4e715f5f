//! Raw and enriched records, and the row shape tables store them in

use crate::source::{Source, SourceSchema};
use crate::timestamp::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Column holding the inference service's analysis in enriched tables
pub const ENRICHED_ANALYSIS_COLUMN: &str = "enriched_analysis";

/// One table row: column name to cell value
///
/// Rows coming out of a [`TableStore`](crate::TableStore) always carry exactly
/// the table header's columns. Use [`Row::conform`] before writing to get the
/// same guarantee on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    /// An empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from (column, value) pairs
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Set a cell, builder style
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a cell
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    /// Cell value, if the column is present
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Number of cells
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no cells
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate cells in column-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Validate against a header: unknown columns are dropped, missing ones
    /// default to the empty string
    ///
    /// # Examples
    ///
    /// ```
    /// use vantage_domain::Row;
    ///
    /// let header = vec!["title".to_string(), "url".to_string()];
    /// let row = Row::new().with("title", "Spacer review").with("colour", "blue");
    /// let conformed = row.conform(&header);
    ///
    /// assert_eq!(conformed.get("title"), Some("Spacer review"));
    /// assert_eq!(conformed.get("url"), Some(""));
    /// assert_eq!(conformed.get("colour"), None);
    /// ```
    pub fn conform(&self, header: &[String]) -> Row {
        Row(header
            .iter()
            .map(|column| {
                let value = self.0.get(column).cloned().unwrap_or_default();
                (column.clone(), value)
            })
            .collect())
    }

    /// Cell values laid out in header order
    pub fn values_in(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|column| self.0.get(column).cloned().unwrap_or_default())
            .collect()
    }

    /// Rebuild a row from header-ordered values; extra values are ignored
    pub fn from_values(header: &[String], values: &[String]) -> Row {
        Row(header
            .iter()
            .enumerate()
            .map(|(idx, column)| (column.clone(), values.get(idx).cloned().unwrap_or_default()))
            .collect())
    }
}

/// A collector's observation, prior to enrichment
///
/// Immutable once stored. `fields` keeps the order the collector produced;
/// identity (see `vantage-dedup`) never depends on that order.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Which source produced the record
    pub source: Source,

    /// Content fields as (name, value) pairs
    pub fields: Vec<(String, String)>,

    /// When the collector retrieved the record, if known
    pub retrieved_at: Option<DateTime<Utc>>,
}

impl RawRecord {
    /// An empty record for the given source
    pub fn new(source: Source) -> Self {
        Self {
            source,
            fields: Vec::new(),
            retrieved_at: None,
        }
    }

    /// Set a field, replacing any previous value for the same name
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Set the retrieval timestamp
    pub fn with_retrieved_at(mut self, at: DateTime<Utc>) -> Self {
        self.retrieved_at = Some(at);
        self
    }

    /// Set a field in place
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Field value by name
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Row for the raw table; fields outside the schema are dropped
    pub fn to_row(&self, schema: &SourceSchema) -> Row {
        let mut row = Row::new();
        for name in schema.fields() {
            row.insert(name.clone(), self.field(name).unwrap_or_default());
        }
        if let Some(column) = schema.retrieved_at_column() {
            row.insert(column, self.retrieved_at.map(format_timestamp).unwrap_or_default());
        }
        row
    }

    /// Rebuild a record from a stored row, in schema field order
    ///
    /// Columns outside the schema (including the analysis column of an
    /// enriched row) are ignored, so a raw row and the enriched row made from
    /// it yield equal records.
    pub fn from_row(source: Source, schema: &SourceSchema, row: &Row) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|name| (name.clone(), row.get(name).unwrap_or_default().to_string()))
            .collect();
        let retrieved_at = schema
            .retrieved_at_column()
            .and_then(|column| row.get(column))
            .and_then(parse_timestamp);

        Self {
            source,
            fields,
            retrieved_at,
        }
    }

    /// Render fields as `name: value` lines for prompts, skipping empty values
    pub fn render(&self) -> String {
        self.fields
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(n, v)| format!("{}: {}", n, v.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A raw record plus its analysis text
///
/// Created exactly once per distinct fingerprint and never mutated; enriched
/// tables only ever grow.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    /// The record that was analysed
    pub record: RawRecord,

    /// Raw inference response text, unparsed
    pub enriched_analysis: String,
}

impl EnrichedRecord {
    /// Pair a record with its analysis
    pub fn new(record: RawRecord, enriched_analysis: impl Into<String>) -> Self {
        Self {
            record,
            enriched_analysis: enriched_analysis.into(),
        }
    }

    /// Row for the enriched table
    pub fn to_row(&self, schema: &SourceSchema) -> Row {
        self.record
            .to_row(schema)
            .with(ENRICHED_ANALYSIS_COLUMN, self.enriched_analysis.clone())
    }

    /// Rebuild from a stored enriched row
    pub fn from_row(source: Source, schema: &SourceSchema, row: &Row) -> Self {
        Self {
            record: RawRecord::from_row(source, schema, row),
            enriched_analysis: row.get(ENRICHED_ANALYSIS_COLUMN).unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn review() -> RawRecord {
        RawRecord::new(Source::Reviews)
            .with_field("reviewer", "Sam")
            .with_field("review_text", "Valve sticks after a month")
            .with_field("rating", "2")
            .with_retrieved_at(Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn test_set_field_replaces() {
        let record = review().with_field("rating", "3");
        assert_eq!(record.field("rating"), Some("3"));
        assert_eq!(record.fields.len(), 3);
    }

    #[test]
    fn test_to_row_follows_schema() {
        let schema = Source::Reviews.schema();
        let row = review().with_field("unknown", "x").to_row(&schema);

        assert_eq!(row.len(), schema.raw_header().len());
        assert_eq!(row.get("reviewer"), Some("Sam"));
        assert_eq!(row.get("url"), Some(""));
        assert_eq!(row.get("scraped_at"), Some("2025-05-01 09:00:00"));
        assert_eq!(row.get("unknown"), None);
    }

    #[test]
    fn test_row_round_trip_through_enriched() {
        let schema = Source::Reviews.schema();
        let enriched = EnrichedRecord::new(review(), "{\"sentiment\":\"negative\"}");
        let row = enriched.to_row(&schema);

        assert_eq!(row.len(), schema.enriched_header().len());
        let back = EnrichedRecord::from_row(Source::Reviews, &schema, &row);
        assert_eq!(back.enriched_analysis, "{\"sentiment\":\"negative\"}");
        assert_eq!(back.record.retrieved_at, review().retrieved_at);
        assert_eq!(back.record.field("review_text"), Some("Valve sticks after a month"));

        let raw = RawRecord::from_row(Source::Reviews, &schema, &review().to_row(&schema));
        assert_eq!(raw, back.record);
    }

    #[test]
    fn test_unparsable_retrieved_at_is_none() {
        let schema = Source::Reviews.schema();
        let row = Row::new().with("reviewer", "Kim").with("scraped_at", "last week");
        let record = RawRecord::from_row(Source::Reviews, &schema, &row);
        assert_eq!(record.retrieved_at, None);
        assert_eq!(record.field("reviewer"), Some("Kim"));
    }

    #[test]
    fn test_values_in_and_from_values() {
        let header = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let row = Row::from_pairs([("c", "3"), ("a", "1")]);
        let values = row.values_in(&header);
        assert_eq!(values, vec!["1", "", "3"]);
        assert_eq!(Row::from_values(&header, &values), row.conform(&header));
    }

    #[test]
    fn test_render_skips_empty() {
        let record = RawRecord::new(Source::News)
            .with_field("title", " Recall issued ")
            .with_field("description", "");
        assert_eq!(record.render(), "title: Recall issued");
    }
}
