//! Content fingerprints for raw records

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use vantage_domain::{RawRecord, Source};

/// Deterministic identity of a record's normalized content
///
/// Lowercase hex SHA-256. Used only as a set key; never written to a table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which fields contribute to a fingerprint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FingerprintKey {
    /// Every content field
    Full,

    /// Only the named fields (narrow key)
    Fields(Vec<String>),
}

impl FingerprintKey {
    /// Narrow key over the given field names
    pub fn fields<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        FingerprintKey::Fields(names.into_iter().map(Into::into).collect())
    }

    /// The key a source uses unless configured otherwise
    pub fn default_for(source: Source) -> Self {
        match source.default_key_fields() {
            Some(fields) => FingerprintKey::fields(fields.iter().copied()),
            None => FingerprintKey::Full,
        }
    }
}

/// Computes fingerprints for one key choice
///
/// Normalization: values are trimmed, empty values are dropped (absent and
/// empty are the same thing), and pairs are sorted by field name before
/// hashing, so field order and incidental whitespace never matter.
///
/// A narrow key whose fields are all empty falls back to the full record;
/// otherwise every untitled forum post would share one identity.
///
/// # Examples
///
/// ```
/// use vantage_dedup::{Fingerprinter, FingerprintKey};
/// use vantage_domain::{RawRecord, Source};
///
/// let a = RawRecord::new(Source::Forum)
///     .with_field("Title", "Which spacer for a toddler?")
///     .with_field("Relevant Comments", "3 comments");
/// let b = RawRecord::new(Source::Forum)
///     .with_field("Relevant Comments", "5 comments")
///     .with_field("Title", "  Which spacer for a toddler? ");
///
/// let narrow = Fingerprinter::new(FingerprintKey::fields(["Title"]));
/// assert_eq!(narrow.fingerprint(&a), narrow.fingerprint(&b));
///
/// let full = Fingerprinter::new(FingerprintKey::Full);
/// assert_ne!(full.fingerprint(&a), full.fingerprint(&b));
/// ```
#[derive(Debug, Clone)]
pub struct Fingerprinter {
    key: FingerprintKey,
    schema_fields: Option<Vec<String>>,
}

impl Fingerprinter {
    /// Fingerprinter over whatever fields a record carries
    pub fn new(key: FingerprintKey) -> Self {
        Self {
            key,
            schema_fields: None,
        }
    }

    /// Fingerprinter restricted to a source's schema fields
    ///
    /// Fields a collector emits outside the schema never reach a table, so
    /// they must not affect identity either.
    pub fn for_source(source: Source, key: FingerprintKey) -> Self {
        Self {
            key,
            schema_fields: Some(source.schema().fields().to_vec()),
        }
    }

    /// Key in use
    pub fn key(&self) -> &FingerprintKey {
        &self.key
    }

    /// Fingerprint a record
    pub fn fingerprint(&self, record: &RawRecord) -> Fingerprint {
        let full = self.normalized(record, None);
        let pairs = match &self.key {
            FingerprintKey::Full => full,
            FingerprintKey::Fields(names) => {
                let narrow = self.normalized(record, Some(names.as_slice()));
                if narrow.is_empty() {
                    full
                } else {
                    narrow
                }
            }
        };
        digest(&pairs)
    }

    fn normalized<'a>(
        &self,
        record: &'a RawRecord,
        only: Option<&[String]>,
    ) -> BTreeMap<&'a str, &'a str> {
        record
            .fields
            .iter()
            .filter(|(name, _)| match &self.schema_fields {
                Some(schema) => schema.iter().any(|f| f == name),
                None => true,
            })
            .filter(|(name, _)| only.map_or(true, |names| names.iter().any(|n| n == name)))
            .map(|(name, value)| (name.as_str(), value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }
}

fn digest(pairs: &BTreeMap<&str, &str>) -> Fingerprint {
    // A BTreeMap serializes in key order, which makes the JSON canonical
    let canonical = serde_json::to_string(pairs).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Fingerprint(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(text: &str) -> RawRecord {
        RawRecord::new(Source::Reviews)
            .with_field("reviewer", "Sam")
            .with_field("review_text", text)
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = Fingerprinter::new(FingerprintKey::Full).fingerprint(&review("ok"));
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_empty_equals_absent() {
        let fingerprinter = Fingerprinter::new(FingerprintKey::Full);
        let with_empty = review("ok").with_field("rating", "  ");
        assert_eq!(
            fingerprinter.fingerprint(&with_empty),
            fingerprinter.fingerprint(&review("ok"))
        );
    }

    #[test]
    fn test_content_change_changes_fingerprint() {
        let fingerprinter = Fingerprinter::new(FingerprintKey::Full);
        assert_ne!(
            fingerprinter.fingerprint(&review("great")),
            fingerprinter.fingerprint(&review("awful"))
        );
    }

    #[test]
    fn test_retrieved_at_never_hashed() {
        use vantage_domain::parse_timestamp;

        let fingerprinter = Fingerprinter::for_source(Source::Reviews, FingerprintKey::Full);
        let monday = review("ok").with_retrieved_at(parse_timestamp("2025-06-02").unwrap());
        let tuesday = review("ok").with_retrieved_at(parse_timestamp("2025-06-03").unwrap());
        assert_eq!(fingerprinter.fingerprint(&monday), fingerprinter.fingerprint(&tuesday));
    }

    #[test]
    fn test_non_schema_fields_ignored_for_source() {
        let fingerprinter = Fingerprinter::for_source(Source::Reviews, FingerprintKey::Full);
        let noisy = review("ok").with_field("session_id", "abc123");
        assert_eq!(fingerprinter.fingerprint(&noisy), fingerprinter.fingerprint(&review("ok")));
    }

    #[test]
    fn test_narrow_key_with_empty_fields_falls_back() {
        let fingerprinter = Fingerprinter::new(FingerprintKey::fields(["Title"]));
        let a = RawRecord::new(Source::Forum).with_field("Text", "first post");
        let b = RawRecord::new(Source::Forum).with_field("Text", "second post");
        assert_ne!(fingerprinter.fingerprint(&a), fingerprinter.fingerprint(&b));
    }

    #[test]
    fn test_default_keys() {
        assert_eq!(
            FingerprintKey::default_for(Source::Forum),
            FingerprintKey::fields(["Title"])
        );
        assert_eq!(FingerprintKey::default_for(Source::Reviews), FingerprintKey::Full);
    }
}
