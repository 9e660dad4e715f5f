//! Vantage Storage Layer
//!
//! Implements the `TableStore` contract: named tables with a canonical header,
//! read-all, batched append, clear, and index deletion.
//!
//! # Implementations
//!
//! - [`SqliteTableStore`]: persistent store on SQLite
//! - [`MemoryTableStore`]: in-process store with fault injection, for tests
//!
//! # Examples
//!
//! ```
//! use vantage_domain::{Row, TableStore};
//! use vantage_store::SqliteTableStore;
//!
//! let mut store = SqliteTableStore::in_memory().unwrap();
//! let header = vec!["title".to_string(), "url".to_string()];
//! let table = store.open("news_articles", &header).unwrap();
//!
//! store.append(&table, &[Row::new().with("title", "Recall notice")]).unwrap();
//! let rows = store.read_all(&table).unwrap();
//! assert_eq!(rows[0].get("url"), Some(""));
//! ```

#![warn(missing_docs)]

mod memory;
mod retry;
mod sqlite;

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use vantage_domain::{Classify, FailureKind};

pub use memory::MemoryTableStore;
pub use retry::{with_retry, with_retry_async};
pub use sqlite::SqliteTableStore;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Table was never opened
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    /// Row index past the end of the table
    #[error("Row {index} out of range for table {table} ({len} rows)")]
    RowOutOfRange {
        /// Table name
        table: String,
        /// Requested index
        index: usize,
        /// Number of data rows
        len: usize,
    },

    /// Stored payload could not be decoded
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Transient failure (busy database, injected fault)
    #[error("Store temporarily unavailable: {0}")]
    Unavailable(String),
}

impl Classify for StoreError {
    fn kind(&self) -> FailureKind {
        match self {
            StoreError::Database(rusqlite::Error::SqliteFailure(err, _))
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                FailureKind::TransientService
            }
            StoreError::Unavailable(_) => FailureKind::TransientService,
            _ => FailureKind::PermanentService,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::InvalidData(e.to_string())
    }
}

/// A store shared by the stages of one run
///
/// Store calls are synchronous; hold the lock only for the duration of a call,
/// never across an `.await`.
pub type SharedStore<S> = Arc<Mutex<S>>;

/// Wrap a store for sharing between stages
pub fn shared<S>(store: S) -> SharedStore<S> {
    Arc::new(Mutex::new(store))
}

/// Lock a shared store
///
/// A poisoned lock only means another stage panicked mid-call; every store
/// call is atomic on its own, so the guard is still usable.
pub fn lock<S>(store: &SharedStore<S>) -> MutexGuard<'_, S> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
