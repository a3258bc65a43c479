use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use rusqlite::{params, OptionalExtension};

use super::connection::{create_pool, get_connection, DbPool};
use super::setup::ensure_schema;
use crate::storage::PersistenceStore;

/// Key/value persistence in a single SQLite table.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn open(database_path: &str) -> Result<Self> {
        let pool = create_pool(database_path)?;
        let mut conn = get_connection(&pool)?;
        ensure_schema(&mut conn)?;

        info!("Opened SQLite store at {}", database_path);
        Ok(Self { pool })
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare("SELECT key FROM kv_store ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }
}

impl PersistenceStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = get_connection(&self.pool)?;
        conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .context("Failed to read key from kv_store")
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let conn = get_connection(&self.pool)?;
        let sql = "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3) \
                   ON CONFLICT(key) DO UPDATE SET \
                   value = excluded.value, updated_at = excluded.updated_at";

        conn.execute(sql, params![key, value, Utc::now().to_rfc3339()])
            .context("Failed to write key to kv_store")
            .map(|_| ())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = get_connection(&self.pool)?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .context("Failed to delete key from kv_store")
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.db");
        let store = SqliteStore::open(path.to_str().unwrap()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_set_overwrites() {
        let (_dir, store) = temp_store();
        store.set("battles:ana", b"1").unwrap();
        store.set("battles:ana", b"2").unwrap();

        assert_eq!(store.get("battles:ana").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.keys().unwrap(), vec!["battles:ana".to_string()]);
    }

    #[test]
    fn test_missing_and_removed_keys() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("stats:nobody").unwrap(), None);

        store.set("stats:ana", b"[]").unwrap();
        store.remove("stats:ana").unwrap();
        assert_eq!(store.get("stats:ana").unwrap(), None);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.db");
        let path = path.to_str().unwrap();

        SqliteStore::open(path).unwrap().set("pairs:ana", b"[\"a|||b\"]").unwrap();
        let reopened = SqliteStore::open(path).unwrap();
        assert_eq!(reopened.get("pairs:ana").unwrap(), Some(b"[\"a|||b\"]".to_vec()));
    }
}
