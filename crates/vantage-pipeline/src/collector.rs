//! JSON Lines drop-file collector
//!
//! External scrapers write one JSON object per line; this collector turns
//! each line into a raw record for its source.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vantage_domain::{parse_timestamp, Collector, CollectorError, RawRecord, Source};

/// Reads a source's records from a JSON Lines file
///
/// A missing file means nothing was dropped since the last run and yields no
/// records. Lines that are not JSON objects are logged and skipped. Scalar
/// values become text, `null` becomes empty, nested values are kept as
/// compact JSON. A key matching the source's retrieved-at column sets the
/// record's retrieval time.
#[derive(Debug, Clone)]
pub struct JsonLinesCollector {
    source: Source,
    path: PathBuf,
}

impl JsonLinesCollector {
    /// Collector for `source` reading `path`
    pub fn new(source: Source, path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            path: path.into(),
        }
    }

    /// File read on each fetch
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse_line(&self, line: &str) -> Result<RawRecord, String> {
        let value: Value = serde_json::from_str(line).map_err(|e| e.to_string())?;
        let Value::Object(map) = value else {
            return Err("not a JSON object".to_string());
        };

        let retrieved_column = self.source.schema().retrieved_at_column().map(str::to_string);
        let mut record = RawRecord::new(self.source);
        for (key, value) in map {
            let text = match value {
                Value::Null => String::new(),
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                nested => nested.to_string(),
            };
            if retrieved_column.as_deref() == Some(key.as_str()) {
                record.retrieved_at = parse_timestamp(&text);
            } else {
                record.set_field(key, text);
            }
        }
        Ok(record)
    }
}

#[async_trait]
impl Collector for JsonLinesCollector {
    fn source(&self) -> Source {
        self.source
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, CollectorError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(source = %self.source, path = %self.path.display(), "No drop file");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(CollectorError::new(
                    self.source,
                    format!("{}: {}", self.path.display(), e),
                ))
            }
        };

        let mut records = Vec::new();
        for (number, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_line(line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    source = %self.source,
                    path = %self.path.display(),
                    line = number + 1,
                    error = %e,
                    "Skipping malformed line"
                ),
            }
        }
        debug!(source = %self.source, records = records.len(), "Drop file read");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn drop_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn test_reads_records() {
        let file = drop_file(&[
            r#"{"reviewer": "Ana", "rating": 4, "review_text": "Good seal", "scraped_at": "2025-05-01 09:00:00"}"#,
            "",
            r#"{"reviewer": "Ben", "rating": null, "verified": true}"#,
        ]);
        let collector = JsonLinesCollector::new(Source::Reviews, file.path());

        let records = collector.fetch().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field("rating"), Some("4"));
        assert!(records[0].retrieved_at.is_some());
        assert_eq!(records[0].field("scraped_at"), None);
        assert_eq!(records[1].field("rating"), Some(""));
        assert_eq!(records[1].field("verified"), Some("true"));
    }

    #[tokio::test]
    async fn test_malformed_lines_are_skipped() {
        let file = drop_file(&[r#"{"title": "ok"}"#, "{broken", "[1, 2]"]);
        let collector = JsonLinesCollector::new(Source::News, file.path());

        let records = collector.fetch().await.unwrap();

        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let collector = JsonLinesCollector::new(Source::Forum, dir.path().join("none.jsonl"));
        assert!(collector.fetch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_path_is_source_unavailable() {
        use vantage_domain::{Classify, FailureKind};

        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file
        let collector = JsonLinesCollector::new(Source::Forum, dir.path());
        let err = collector.fetch().await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::SourceUnavailable);
    }
}
