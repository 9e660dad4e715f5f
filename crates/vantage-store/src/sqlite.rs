//! SQLite-backed table store

use crate::StoreError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};
use vantage_domain::{FailureKind, Row, TableHandle, TableStore};

/// How long a writer waits on a locked database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based implementation of TableStore
///
/// Rows are stored as JSON objects keyed by column name and conformed to the
/// table's current header on read.
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share one store between tasks
/// through [`SharedStore`](crate::SharedStore).
pub struct SqliteTableStore {
    conn: Connection,
}

impl SqliteTableStore {
    /// Create a new SqliteTableStore with the given database path
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use vantage_store::SqliteTableStore;
    ///
    /// let store = SqliteTableStore::new("vantage.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory database, gone when the store is dropped
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    /// Names of every table opened so far, sorted
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare("SELECT name FROM tables ORDER BY name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn stored_header(&self, name: &str) -> Result<Option<Vec<String>>, StoreError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT header FROM tables WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        json.map(|j| serde_json::from_str(&j).map_err(StoreError::from))
            .transpose()
    }

    fn ensure_exists(&self, handle: &TableHandle) -> Result<(), StoreError> {
        let exists: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM tables WHERE name = ?1",
                params![&handle.name],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        if exists {
            Ok(())
        } else {
            Err(StoreError::UnknownTable(handle.name.clone()))
        }
    }

    fn row_count(&self, name: &str) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM rows WHERE table_name = ?1",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn encode(row: &Row) -> Result<String, StoreError> {
        let map: BTreeMap<&str, &str> = row.iter().collect();
        Ok(serde_json::to_string(&map)?)
    }

    fn decode(json: &str) -> Result<Row, StoreError> {
        let map: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(Row::from_pairs(map))
    }
}

impl TableStore for SqliteTableStore {
    type Error = StoreError;

    fn open(&mut self, name: &str, header: &[String]) -> Result<TableHandle, Self::Error> {
        let header_json = serde_json::to_string(header)?;

        match self.stored_header(name)? {
            None => {
                self.conn.execute(
                    "INSERT INTO tables (name, header) VALUES (?1, ?2)",
                    params![name, &header_json],
                )?;
                debug!(table = %name, columns = header.len(), "Created table");
            }
            Some(stored) if stored != header => {
                warn!(
                    table = %name,
                    kind = %FailureKind::SchemaDrift,
                    stored = ?stored,
                    expected = ?header,
                    "Header drift, replacing stored header"
                );
                self.conn.execute(
                    "UPDATE tables SET header = ?2 WHERE name = ?1",
                    params![name, &header_json],
                )?;
            }
            Some(_) => {}
        }

        Ok(TableHandle::new(name, header.to_vec()))
    }

    fn read_all(&self, handle: &TableHandle) -> Result<Vec<Row>, Self::Error> {
        self.ensure_exists(handle)?;

        let mut stmt = self
            .conn
            .prepare("SELECT data FROM rows WHERE table_name = ?1 ORDER BY id")?;
        let payloads = stmt
            .query_map(params![&handle.name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        payloads
            .iter()
            .map(|json| Self::decode(json).map(|row| row.conform(&handle.header)))
            .collect()
    }

    fn append(&mut self, handle: &TableHandle, rows: &[Row]) -> Result<usize, Self::Error> {
        self.ensure_exists(handle)?;
        if rows.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare("INSERT INTO rows (table_name, data) VALUES (?1, ?2)")?;
            for row in rows {
                let json = Self::encode(&row.conform(&handle.header))?;
                stmt.execute(params![&handle.name, &json])?;
            }
        }
        tx.commit()?;

        debug!(table = %handle.name, rows = rows.len(), "Appended batch");
        Ok(rows.len())
    }

    fn clear(&mut self, handle: &TableHandle) -> Result<(), Self::Error> {
        self.ensure_exists(handle)?;
        self.conn
            .execute("DELETE FROM rows WHERE table_name = ?1", params![&handle.name])?;
        Ok(())
    }

    fn replace(&mut self, handle: &TableHandle, rows: &[Row]) -> Result<usize, Self::Error> {
        self.ensure_exists(handle)?;

        // Dropping the transaction on error rolls the delete back
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM rows WHERE table_name = ?1", params![&handle.name])?;
        {
            let mut stmt = tx.prepare("INSERT INTO rows (table_name, data) VALUES (?1, ?2)")?;
            for row in rows {
                let json = Self::encode(&row.conform(&handle.header))?;
                stmt.execute(params![&handle.name, &json])?;
            }
        }
        tx.commit()?;

        debug!(table = %handle.name, rows = rows.len(), "Replaced rows");
        Ok(rows.len())
    }

    fn delete_row(&mut self, handle: &TableHandle, index: usize) -> Result<(), Self::Error> {
        self.ensure_exists(handle)?;

        let id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM rows WHERE table_name = ?1 ORDER BY id LIMIT 1 OFFSET ?2",
                params![&handle.name, index as i64],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(id) => {
                self.conn.execute("DELETE FROM rows WHERE id = ?1", params![id])?;
                Ok(())
            }
            None => Err(StoreError::RowOutOfRange {
                table: handle.name.clone(),
                index,
                len: self.row_count(&handle.name)?,
            }),
        }
    }
}
