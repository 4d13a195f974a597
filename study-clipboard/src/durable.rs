//! Durable store adapter
//!
//! Wraps [`Database`] with the widget's failure policy: loads degrade to an
//! empty list and saves are logged and dropped. The database is opened on first
//! use and the outcome, including "unavailable", is kept for the lifetime of the
//! adapter. Clones share the same handle.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::database::{Database, DatabaseError, STORE_NAME};
use crate::models::ItemRecord;

/// Where the durable store lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
    /// No persistence available; the widget runs in-memory only
    Unavailable,
}

#[derive(Clone)]
pub struct DurableStore {
    inner: Arc<DurableInner>,
}

struct DurableInner {
    location: StoreLocation,
    db: OnceCell<Option<Arc<Database>>>,
}

impl DurableStore {
    pub fn new(location: StoreLocation) -> Self {
        Self {
            inner: Arc::new(DurableInner {
                location,
                db: OnceCell::new(),
            }),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(StoreLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn unavailable() -> Self {
        Self::new(StoreLocation::Unavailable)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.inner.location
    }

    /// Open the database once; every later call reuses the outcome
    async fn database(&self) -> Option<Arc<Database>> {
        self.inner
            .db
            .get_or_init(|| open_location(self.inner.location.clone()))
            .await
            .clone()
    }

    pub async fn is_available(&self) -> bool {
        self.database().await.is_some()
    }

    /// All stored records, newest first. Empty when the store cannot be read.
    pub async fn load(&self) -> Vec<ItemRecord> {
        let Some(db) = self.database().await else {
            return Vec::new();
        };

        match tokio::task::spawn_blocking(move || db.load_records()).await {
            Ok(Ok(records)) => {
                debug!(count = records.len(), "loaded stored clipboard items");
                records
            }
            Ok(Err(e)) => {
                error!("[Clipboard] Failed to load stored items: {}", e);
                Vec::new()
            }
            Err(e) => {
                error!("[Clipboard] Store read task failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Replace the stored list with `records`. Failures are logged, not returned.
    pub async fn save(&self, records: Vec<ItemRecord>) {
        let Some(db) = self.database().await else {
            return;
        };

        match tokio::task::spawn_blocking(move || db.replace_all(&records)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => error!("[Clipboard] Failed to persist items: {}", e),
            Err(e) => error!("[Clipboard] Store write task failed: {}", e),
        }
    }

    /// Number of stored records, 0 when unavailable
    pub async fn count(&self) -> u64 {
        let Some(db) = self.database().await else {
            return 0;
        };
        match tokio::task::spawn_blocking(move || db.count_items()).await {
            Ok(Ok(count)) => count,
            Ok(Err(e)) => {
                error!("[Clipboard] Failed to count stored items: {}", e);
                0
            }
            Err(e) => {
                error!("[Clipboard] Store count task failed: {}", e);
                0
            }
        }
    }
}

async fn open_location(location: StoreLocation) -> Option<Arc<Database>> {
    let opened: Result<Database, DatabaseError> = match location {
        StoreLocation::Unavailable => {
            debug!("durable store unavailable, running in-memory only");
            return None;
        }
        StoreLocation::Memory => Database::open_in_memory(),
        StoreLocation::File(path) => {
            match tokio::task::spawn_blocking(move || Database::open(&path)).await {
                Ok(result) => result,
                Err(e) => {
                    error!("[Clipboard] Store open task failed: {}", e);
                    return None;
                }
            }
        }
    };

    match opened {
        Ok(db) => {
            debug!(store = STORE_NAME, "durable store opened");
            Some(Arc::new(db))
        }
        Err(e) => {
            error!("[Clipboard] Failed to open {} store: {}", STORE_NAME, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, captured_at: i64) -> ItemRecord {
        ItemRecord {
            id: id.to_string(),
            name: id.to_string(),
            size: 1,
            mime_type: String::new(),
            display_type: "File".to_string(),
            snippet: String::new(),
            preview_kind: String::new(),
            preview_icon: String::new(),
            captured_at,
            file_name: id.to_string(),
            file_last_modified: captured_at,
            remote_path: None,
            remote_url: None,
            file_blob: Some(vec![7]),
        }
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_empty() {
        let store = DurableStore::unavailable();
        store.save(vec![record("a", 1)]).await;
        assert!(store.load().await.is_empty());
        assert_eq!(store.count().await, 0);
        assert!(!store.is_available().await);
    }

    #[tokio::test]
    async fn test_clones_share_one_handle() {
        let store = DurableStore::in_memory();
        let clone = store.clone();
        store.save(vec![record("a", 1), record("b", 2)]).await;

        let loaded = clone.load().await;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "b");
    }

    #[tokio::test]
    async fn test_unopenable_path_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let store = DurableStore::file(blocker.join("clipboard.sqlite"));
        store.save(vec![record("a", 1)]).await;
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipboard.sqlite");
        DurableStore::file(&path).save(vec![record("a", 1)]).await;

        let reopened = DurableStore::file(&path);
        assert_eq!(reopened.count().await, 1);
    }
}
