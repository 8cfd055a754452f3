//! Opening and configuring the SQLite connection.

use super::SqliteStore;
use crate::store::{SCHEMA_VERSION, StoreError, StoreResult, create_schema, get_schema_version};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fs;
use std::path::Path;

impl SqliteStore {
    /// Opens an in-memory database with the subscription schema.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(conn)
    }

    /// Opens or creates the database at `path`.
    ///
    /// Missing parent directories are created. The schema is created on first
    /// use and the schema version refreshed on every open.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        tracing::debug!(path = %path.display(), "opening subscription store");
        let conn = Connection::open(path)?;
        Self::prepare(conn)
    }

    fn prepare(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        if let Some(found) = get_schema_version(&conn)?
            && found > SCHEMA_VERSION
        {
            return Err(StoreError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            });
        }
        create_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Returns a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begins a write transaction holding the database lock from the start.
    ///
    /// Guards read-then-write sequences such as the child check before a
    /// delete. Rolls back on drop unless committed.
    pub fn transaction(&mut self) -> StoreResult<Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}
