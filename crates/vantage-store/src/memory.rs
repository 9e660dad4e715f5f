//! In-process table store for tests and dry runs

use crate::StoreError;
use std::collections::HashMap;
use vantage_domain::{Row, TableHandle, TableStore};

#[derive(Debug, Default)]
struct MemTable {
    header: Vec<String>,
    rows: Vec<Row>,
}

/// Table store held entirely in memory
///
/// Besides the plain contract it counts append calls and can inject
/// transient append failures, so batching and retry paths can be tested
/// without a database.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: HashMap<String, MemTable>,
    append_calls: usize,
    failing_appends: usize,
    drift_repairs: usize,
}

impl MemoryTableStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` append or replace calls fail with a transient error
    pub fn fail_next_appends(&mut self, count: usize) {
        self.failing_appends = count;
    }

    /// Number of append and replace calls that reached the store, failed ones included
    pub fn append_calls(&self) -> usize {
        self.append_calls
    }

    /// Number of times `open` replaced a drifted header
    pub fn drift_repairs(&self) -> usize {
        self.drift_repairs
    }

    /// Data row count of a table, zero if it was never opened
    pub fn row_count(&self, name: &str) -> usize {
        self.tables.get(name).map(|t| t.rows.len()).unwrap_or(0)
    }

    /// Stored header of a table
    pub fn header(&self, name: &str) -> Option<&[String]> {
        self.tables.get(name).map(|t| t.header.as_slice())
    }

    /// Count a row write and fail it if failures are pending
    fn count_write(&mut self, handle: &TableHandle) -> Result<(), StoreError> {
        self.append_calls += 1;
        if self.failing_appends > 0 {
            self.failing_appends -= 1;
            return Err(StoreError::Unavailable(format!(
                "injected append failure on {}",
                handle.name
            )));
        }
        Ok(())
    }

    fn table(&self, handle: &TableHandle) -> Result<&MemTable, StoreError> {
        self.tables
            .get(&handle.name)
            .ok_or_else(|| StoreError::UnknownTable(handle.name.clone()))
    }

    fn table_mut(&mut self, handle: &TableHandle) -> Result<&mut MemTable, StoreError> {
        self.tables
            .get_mut(&handle.name)
            .ok_or_else(|| StoreError::UnknownTable(handle.name.clone()))
    }
}

impl TableStore for MemoryTableStore {
    type Error = StoreError;

    fn open(&mut self, name: &str, header: &[String]) -> Result<TableHandle, Self::Error> {
        let table = self.tables.entry(name.to_string()).or_insert_with(|| MemTable {
            header: header.to_vec(),
            rows: Vec::new(),
        });
        if table.header != header {
            table.header = header.to_vec();
            self.drift_repairs += 1;
        }
        Ok(TableHandle::new(name, header.to_vec()))
    }

    fn read_all(&self, handle: &TableHandle) -> Result<Vec<Row>, Self::Error> {
        let table = self.table(handle)?;
        Ok(table.rows.iter().map(|r| r.conform(&handle.header)).collect())
    }

    fn append(&mut self, handle: &TableHandle, rows: &[Row]) -> Result<usize, Self::Error> {
        self.count_write(handle)?;
        let table = self.table_mut(handle)?;
        table
            .rows
            .extend(rows.iter().map(|r| r.conform(&handle.header)));
        Ok(rows.len())
    }

    fn clear(&mut self, handle: &TableHandle) -> Result<(), Self::Error> {
        self.table_mut(handle)?.rows.clear();
        Ok(())
    }

    fn replace(&mut self, handle: &TableHandle, rows: &[Row]) -> Result<usize, Self::Error> {
        self.count_write(handle)?;
        let table = self.table_mut(handle)?;
        table.rows = rows.iter().map(|r| r.conform(&handle.header)).collect();
        Ok(rows.len())
    }

    fn delete_row(&mut self, handle: &TableHandle, index: usize) -> Result<(), Self::Error> {
        let table = self.table_mut(handle)?;
        if index >= table.rows.len() {
            return Err(StoreError::RowOutOfRange {
                table: handle.name.clone(),
                index,
                len: table.rows.len(),
            });
        }
        table.rows.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_domain::Classify;

    #[test]
    fn test_injected_failures_are_transient() {
        let mut store = MemoryTableStore::new();
        let table = store.open("t", &["a".to_string()]).unwrap();
        store.fail_next_appends(1);

        let err = store.append(&table, &[Row::new().with("a", "1")]).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(store.row_count("t"), 0);

        store.append(&table, &[Row::new().with("a", "1")]).unwrap();
        assert_eq!(store.row_count("t"), 1);
        assert_eq!(store.append_calls(), 2);
    }

    #[test]
    fn test_failed_replace_keeps_rows() {
        let mut store = MemoryTableStore::new();
        let table = store.open("t", &["a".to_string()]).unwrap();
        store
            .append(&table, &[Row::new().with("a", "1"), Row::new().with("a", "2")])
            .unwrap();
        store.fail_next_appends(1);

        let err = store.replace(&table, &[Row::new().with("a", "3")]).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(store.row_count("t"), 2);

        store.replace(&table, &[Row::new().with("a", "3")]).unwrap();
        assert_eq!(store.read_all(&table).unwrap(), vec![Row::from_pairs([("a", "3")])]);
    }

    #[test]
    fn test_drift_counted() {
        let mut store = MemoryTableStore::new();
        store.open("t", &["a".to_string()]).unwrap();
        store.open("t", &["a".to_string()]).unwrap();
        assert_eq!(store.drift_repairs(), 0);
        store.open("t", &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(store.drift_repairs(), 1);
        assert_eq!(store.header("t").unwrap().len(), 2);
    }
}
