//! SQLite-backed key-value store

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::kv::KeyValueStore;
use crate::error::Result;

const UPSERT: &str = r#"
    INSERT INTO kv (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3
"#;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(UPSERT, params![key, value, Self::now()])?;
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM kv", [])?;
        Ok(())
    }

    /// All entries commit together or not at all.
    fn write_batch(&mut self, entries: &[(&str, String)]) -> Result<()> {
        let now = Self::now();
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(UPSERT, params![key, value, now])?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_upsert_and_clear() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.read("stats").unwrap(), None);

        store.write("stats", "{}").unwrap();
        store.write("stats", "{\"a\":1}").unwrap();
        assert_eq!(store.read("stats").unwrap().as_deref(), Some("{\"a\":1}"));

        store.clear("stats").unwrap();
        assert_eq!(store.read("stats").unwrap(), None);
    }

    #[test]
    fn test_batch_write_and_clear_all() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .write_batch(&[("a", "1".to_string()), ("b", "2".to_string())])
            .unwrap();
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        store.clear_all().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_values_survive_reopen() {
        let file = NamedTempFile::new().unwrap();
        {
            let mut store = SqliteStore::open(file.path()).unwrap();
            store.write("reviews", "[]").unwrap();
        }
        let store = SqliteStore::open(file.path()).unwrap();
        assert_eq!(store.read("reviews").unwrap().as_deref(), Some("[]"));
    }
}
