//! Per-item enrichment tasks
//!
//! Snippet extraction and uploads run in the background, keyed by item id.
//! A finished task posts exactly one [`ItemUpdate`]; it never touches the
//! item list or the surface itself. Evicting an item aborts its tasks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::models::FileContent;
use crate::preview::extract_snippet;
use crate::upload::UploadService;

/// Result of a finished enrichment task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemUpdate {
    Snippet {
        item_id: String,
        snippet: String,
    },
    Uploaded {
        item_id: String,
        remote_path: Option<String>,
        remote_url: Option<String>,
    },
}

impl ItemUpdate {
    pub fn item_id(&self) -> &str {
        match self {
            ItemUpdate::Snippet { item_id, .. } | ItemUpdate::Uploaded { item_id, .. } => item_id,
        }
    }
}

pub struct EnrichmentTasks {
    updates: mpsc::UnboundedSender<ItemUpdate>,
    tasks: Mutex<HashMap<String, Vec<JoinHandle<()>>>>,
}

impl EnrichmentTasks {
    pub fn new(updates: mpsc::UnboundedSender<ItemUpdate>) -> Self {
        Self {
            updates,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    fn track(&self, item_id: &str, handle: JoinHandle<()>) {
        let mut tasks = self.tasks.lock();
        tasks.retain(|_, handles| {
            handles.retain(|h| !h.is_finished());
            !handles.is_empty()
        });
        tasks.entry(item_id.to_string()).or_default().push(handle);
    }

    /// Extract a snippet from the head of `content`. No update when there is no text.
    pub fn spawn_snippet(&self, item_id: &str, content: FileContent) {
        let tx = self.updates.clone();
        let id = item_id.to_string();
        let handle = tokio::spawn(async move {
            let extracted = tokio::task::spawn_blocking(move || extract_snippet(&content)).await;
            if let Ok(Some(snippet)) = extracted {
                let _ = tx.send(ItemUpdate::Snippet { item_id: id, snippet });
            }
        });
        self.track(item_id, handle);
    }

    /// Upload `content` once. Failures are logged and produce no update.
    pub fn spawn_upload(
        &self,
        item_id: &str,
        content: FileContent,
        declared_name: String,
        service: Arc<dyn UploadService>,
    ) {
        let tx = self.updates.clone();
        let id = item_id.to_string();
        let handle = tokio::spawn(async move {
            match service.upload_file(&content, &declared_name).await {
                Ok(response) if response.ok => {
                    let _ = tx.send(ItemUpdate::Uploaded {
                        item_id: id,
                        remote_path: response.path,
                        remote_url: response.public_url,
                    });
                }
                Ok(_) => warn!("[Clipboard] upload of {} was not accepted", declared_name),
                Err(e) => warn!("[Clipboard] upload failed for {}: {}", declared_name, e),
            }
        });
        self.track(item_id, handle);
    }

    /// Abort every task for `item_id`
    pub fn cancel(&self, item_id: &str) {
        if let Some(handles) = self.tasks.lock().remove(item_id) {
            for handle in handles {
                handle.abort();
            }
        }
    }

    pub fn cancel_all(&self) {
        for (_, handles) in self.tasks.lock().drain() {
            for handle in handles {
                handle.abort();
            }
        }
    }

    /// Tasks still running
    pub fn in_flight(&self) -> usize {
        self.tasks
            .lock()
            .values()
            .flatten()
            .filter(|h| !h.is_finished())
            .count()
    }
}

impl Drop for EnrichmentTasks {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
