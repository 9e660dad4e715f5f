//! Seen-set tracking against the enriched and raw tables

use crate::error::DedupError;
use crate::fingerprint::{Fingerprint, FingerprintKey, Fingerprinter};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use vantage_domain::{RawRecord, RetryPolicy, Row, Source, TableStore};
use vantage_store::{lock, with_retry_async, SharedStore};

/// Decides which records still need work
///
/// The engine never writes. The seen set is always rebuilt from the tables,
/// so an interrupted run recovers on the next one without extra state.
pub struct DedupEngine<S> {
    store: SharedStore<S>,
    retry: RetryPolicy,
    keys: HashMap<Source, FingerprintKey>,
}

impl<S: TableStore> DedupEngine<S> {
    /// Engine with each source's default key
    pub fn new(store: SharedStore<S>) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
            keys: HashMap::new(),
        }
    }

    /// Retry policy for table reads
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the fingerprint key of one source
    pub fn with_key(mut self, source: Source, key: FingerprintKey) -> Self {
        self.keys.insert(source, key);
        self
    }

    /// Fingerprinter used for `source`
    pub fn fingerprinter(&self, source: Source) -> Fingerprinter {
        let key = self
            .keys
            .get(&source)
            .cloned()
            .unwrap_or_else(|| FingerprintKey::default_for(source));
        Fingerprinter::for_source(source, key)
    }

    /// Fingerprint one record with its source's key
    pub fn fingerprint(&self, record: &RawRecord) -> Fingerprint {
        self.fingerprinter(record.source).fingerprint(record)
    }

    /// Fingerprints of every row in the source's enriched table
    pub async fn already_enriched(&self, source: Source) -> Result<HashSet<Fingerprint>, DedupError> {
        let schema = source.schema();
        let rows = self
            .read_table(&source.enriched_table(), &schema.enriched_header())
            .await?;
        let seen = self.fingerprint_rows(source, &rows);
        debug!(source = %source, rows = rows.len(), distinct = seen.len(), "Loaded enriched seen set");
        Ok(seen)
    }

    /// Fingerprints of every row in the source's raw table
    pub async fn already_present(&self, source: Source) -> Result<HashSet<Fingerprint>, DedupError> {
        let schema = source.schema();
        let rows = self
            .read_table(source.raw_table(), &schema.raw_header())
            .await?;
        Ok(self.fingerprint_rows(source, &rows))
    }

    /// Records whose fingerprint is not in `seen`, in input order
    ///
    /// Later copies of a record already kept from the same batch are dropped
    /// too, so one call never yields two records with the same identity.
    pub fn filter_new(&self, records: Vec<RawRecord>, seen: &HashSet<Fingerprint>) -> Vec<RawRecord> {
        let mut batch = HashSet::new();
        records
            .into_iter()
            .filter(|record| {
                let fp = self.fingerprint(record);
                !seen.contains(&fp) && batch.insert(fp)
            })
            .collect()
    }

    async fn read_table(&self, name: &str, header: &[String]) -> Result<Vec<Row>, DedupError> {
        with_retry_async(&self.retry, "read_all", || {
            let mut store = lock(&self.store);
            let table = store.open(name, header)?;
            store.read_all(&table)
        })
        .await
        .map_err(DedupError::store)
    }

    fn fingerprint_rows(&self, source: Source, rows: &[Row]) -> HashSet<Fingerprint> {
        let schema = source.schema();
        let fingerprinter = self.fingerprinter(source);
        rows.iter()
            .map(|row| fingerprinter.fingerprint(&RawRecord::from_row(source, &schema, row)))
            .collect()
    }
}
