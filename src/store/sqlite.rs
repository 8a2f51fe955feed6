//! SQLite-backed storage adapter.

use crate::store::{StorageAdapter, StoreError, StoreResult};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS collections (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// One key-value table holding whole collection payloads.
///
/// Every `set` replaces the full value for its key, matching the
/// whole-collection overwrite contract of the store layer.
pub struct SqliteAdapter {
    conn: Connection,
}

impl SqliteAdapter {
    /// Opens an in-memory database (tests, throwaway sessions).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Opens or creates a database at the given path.
    ///
    /// Creates parent directories if they don't exist. Initializes the
    /// schema if this is a new database.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Backend(format!("{}: {e}", parent.display())))?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Returns a reference to the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl StorageAdapter for SqliteAdapter {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM collections WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO collections (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM collections WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn in_memory_roundtrip() {
        let adapter = SqliteAdapter::open_in_memory().unwrap();
        assert_eq!(adapter.get("k").unwrap(), None);
        adapter.set("k", "v1").unwrap();
        adapter.set("k", "v2").unwrap();
        assert_eq!(adapter.get("k").unwrap().as_deref(), Some("v2"));
        adapter.remove("k").unwrap();
        assert_eq!(adapter.get("k").unwrap(), None);
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deep").join("satchel.db");
        let adapter = SqliteAdapter::open(&path).unwrap();
        adapter.set("k", "v").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn values_persist_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("satchel.db");
        {
            let adapter = SqliteAdapter::open(&path).unwrap();
            adapter.set("k", "persisted").unwrap();
        }
        let reopened = SqliteAdapter::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("persisted"));
    }
}
