//! SQLite-backed record storage.
//!
//! The block list is kept as one JSON document in a key-value table, so the
//! stored shape is exactly the camelCase array hosts already exchange.

use std::path::PathBuf;

use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::record::SiteRecord;

use super::{data_dir, RecordBackend};

/// Key the record list is stored under.
pub const RECORDS_KEY: &str = "blacklist";

/// SQLite database holding the block list.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open the database at `~/.config/focusgate/focusgate.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(data_dir()?.join("focusgate.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&path)
            .map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl RecordBackend for SqliteBackend {
    fn load(&mut self) -> Result<Vec<SiteRecord>, StorageError> {
        match self.kv_get(RECORDS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, records: &[SiteRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records)?;
        self.kv_set(RECORDS_KEY, &json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn kv_store() {
        let db = SqliteBackend::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn empty_database_loads_empty_list() {
        let mut db = SqliteBackend::open_memory().unwrap();
        assert!(db.load().unwrap().is_empty());
    }

    #[test]
    fn saved_list_keeps_order() {
        let mut db = SqliteBackend::open_memory().unwrap();
        let now = Utc::now();
        let records = vec![
            SiteRecord::new("youtube.com", 600, 300, now),
            SiteRecord::new("www.reddit.com", 60, 30, now),
        ];
        db.save(&records).unwrap();
        let loaded = db.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].site, "youtube.com");
        assert_eq!(loaded[1].site, "www.reddit.com");
    }

    #[test]
    fn reads_lists_written_by_other_hosts() {
        let mut db = SqliteBackend::open_memory().unwrap();
        db.kv_set(
            RECORDS_KEY,
            r#"[{"site":"www.example.com","blockTime":10,"unblockTime":5,"added":1700000000000,"blocked":true,"blockedAt":1700000005000,"timeSpent":10250}]"#,
        )
        .unwrap();
        let loaded = db.load().unwrap();
        assert!(loaded[0].blocked);
        assert_eq!(loaded[0].time_spent_ms, 10_250);
        assert_eq!(
            loaded[0].blocked_at.map(|at| at.timestamp_millis()),
            Some(1_700_000_005_000)
        );
    }

    #[test]
    fn malformed_document_is_reported() {
        let mut db = SqliteBackend::open_memory().unwrap();
        db.kv_set(RECORDS_KEY, "{not json").unwrap();
        assert!(matches!(db.load(), Err(StorageError::Malformed(_))));
    }
}
