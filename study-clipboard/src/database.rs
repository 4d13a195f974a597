//! SQLite database layer for the clipboard store
//!
//! One table keyed by item id. Writes use replace-all semantics: every save
//! deletes all rows and inserts the given records inside a single transaction.
//! Uses r2d2 connection pooling; WAL mode lets readers proceed during a save.

use crate::models::ItemRecord;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::path::Path;
use thiserror::Error;

/// Schema version written to `PRAGMA user_version`
pub const DB_VERSION: i64 = 1;

/// Name of the single keyed store
pub const STORE_NAME: &str = "clipboard_items";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Unsupported store version {found} (expected at most {expected})")]
    UnsupportedVersion { found: i64, expected: i64 },
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Thread-safe database wrapper using connection pooling
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path)
            .with_init(|conn| {
                conn.execute_batch("
                    PRAGMA journal_mode=WAL;
                    PRAGMA synchronous=NORMAL;
                    PRAGMA busy_timeout=5000;
                ")?;
                Ok(())
            });

        let pool = Pool::builder()
            .max_size(4)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    /// Open an in-memory database
    pub fn open_in_memory() -> DatabaseResult<Self> {
        let manager = SqliteConnectionManager::memory();

        // In-memory needs single connection to maintain state
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)?;

        let db = Self { pool };
        db.setup_schema()?;
        Ok(db)
    }

    fn get_conn(&self) -> DatabaseResult<PooledConnection<SqliteConnectionManager>> {
        Ok(self.pool.get()?)
    }

    /// Create the store if missing and tag it with the schema version
    fn setup_schema(&self) -> DatabaseResult<()> {
        let conn = self.get_conn()?;

        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version > DB_VERSION {
            return Err(DatabaseError::UnsupportedVersion {
                found: version,
                expected: DB_VERSION,
            });
        }

        conn.execute_batch(r#"
            CREATE TABLE IF NOT EXISTS clipboard_items (
                id TEXT PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                size INTEGER NOT NULL DEFAULT 0,
                mimeType TEXT NOT NULL DEFAULT '',
                displayType TEXT NOT NULL DEFAULT '',
                snippet TEXT NOT NULL DEFAULT '',
                previewKind TEXT NOT NULL DEFAULT '',
                previewIcon TEXT NOT NULL DEFAULT '',
                capturedAt INTEGER NOT NULL,
                fileName TEXT NOT NULL DEFAULT '',
                fileLastModified INTEGER NOT NULL DEFAULT 0,
                remotePath TEXT,
                remoteUrl TEXT,
                fileBlob BLOB
            );

            CREATE INDEX IF NOT EXISTS idx_clipboard_items_captured ON clipboard_items(capturedAt);
        "#)?;

        if version < DB_VERSION {
            conn.execute_batch(&format!("PRAGMA user_version = {}", DB_VERSION))?;
        }

        Ok(())
    }

    /// Read every record, newest capture first
    pub fn load_records(&self) -> DatabaseResult<Vec<ItemRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, name, size, mimeType, displayType, snippet, previewKind, previewIcon,
                      capturedAt, fileName, fileLastModified, remotePath, remoteUrl, fileBlob
               FROM clipboard_items
               ORDER BY capturedAt DESC"#,
        )?;

        let records = stmt
            .query_map([], |row| {
                Ok(ItemRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    size: row.get::<_, i64>(2)?.max(0) as u64,
                    mime_type: row.get(3)?,
                    display_type: row.get(4)?,
                    snippet: row.get(5)?,
                    preview_kind: row.get(6)?,
                    preview_icon: row.get(7)?,
                    captured_at: row.get(8)?,
                    file_name: row.get(9)?,
                    file_last_modified: row.get(10)?,
                    remote_path: row.get(11)?,
                    remote_url: row.get(12)?,
                    file_blob: row.get(13)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Replace the whole store with `records` in one transaction
    pub fn replace_all(&self, records: &[ItemRecord]) -> DatabaseResult<()> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute("DELETE FROM clipboard_items", [])?;
        {
            let mut insert = tx.prepare(
                r#"INSERT OR REPLACE INTO clipboard_items
                   (id, name, size, mimeType, displayType, snippet, previewKind, previewIcon,
                    capturedAt, fileName, fileLastModified, remotePath, remoteUrl, fileBlob)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"#,
            )?;
            for record in records {
                insert.execute(params![
                    record.id,
                    record.name,
                    record.size as i64,
                    record.mime_type,
                    record.display_type,
                    record.snippet,
                    record.preview_kind,
                    record.preview_icon,
                    record.captured_at,
                    record.file_name,
                    record.file_last_modified,
                    record.remote_path,
                    record.remote_url,
                    record.file_blob,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Get total number of records in the store
    pub fn count_items(&self) -> DatabaseResult<u64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM clipboard_items", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, captured_at: i64, blob: Option<&[u8]>) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            name: format!("{}.txt", id),
            size: blob.map(|b| b.len() as u64).unwrap_or(0),
            mime_type: "text/plain".to_string(),
            display_type: "text/plain".to_string(),
            snippet: String::new(),
            preview_kind: "icon".to_string(),
            preview_icon: "note".to_string(),
            captured_at,
            file_name: format!("{}.txt", id),
            file_last_modified: captured_at,
            remote_path: None,
            remote_url: None,
            file_blob: blob.map(|b| b.to_vec()),
        }
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_records().unwrap().is_empty());
        assert_eq!(db.count_items().unwrap(), 0);
    }

    #[test]
    fn test_replace_all_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let records = vec![record("a", 1, Some(b"alpha")), record("b", 2, None)];
        db.replace_all(&records).unwrap();

        let loaded = db.load_records().unwrap();
        assert_eq!(loaded.len(), 2);
        // Newest first
        assert_eq!(loaded[0], records[1]);
        assert_eq!(loaded[1], records[0]);
    }

    #[test]
    fn test_replace_all_drops_missing_records() {
        let db = Database::open_in_memory().unwrap();
        db.replace_all(&[record("a", 1, None), record("b", 2, None)]).unwrap();
        db.replace_all(&[record("c", 3, None)]).unwrap();

        let ids: Vec<String> = db.load_records().unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c".to_string()]);
    }

    #[test]
    fn test_remote_fields_persist() {
        let db = Database::open_in_memory().unwrap();
        let mut r = record("a", 1, None);
        r.remote_path = Some("user/1_a.txt".into());
        r.remote_url = Some("https://cdn.example.com/a.txt".into());
        db.replace_all(&[r.clone()]).unwrap();
        assert_eq!(db.load_records().unwrap(), vec![r]);
    }

    #[test]
    fn test_version_is_tagged_and_newer_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipboard.sqlite");
        {
            let db = Database::open(&path).unwrap();
            let conn = db.get_conn().unwrap();
            let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0)).unwrap();
            assert_eq!(version, DB_VERSION);
            conn.execute_batch("PRAGMA user_version = 99").unwrap();
        }

        match Database::open(&path) {
            Err(DatabaseError::UnsupportedVersion { found, .. }) => assert_eq!(found, 99),
            other => panic!("expected UnsupportedVersion, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_file_store_shared_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clipboard.sqlite");
        let first = Database::open(&path).unwrap();
        let second = Database::open(&path).unwrap();

        first.replace_all(&[record("a", 1, Some(b"x"))]).unwrap();
        assert_eq!(second.count_items().unwrap(), 1);
        assert!(path.exists());
    }
}
