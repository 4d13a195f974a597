//! Cross-instance change notification
//!
//! Instances never send item data to each other. They only announce "the list
//! changed"; receivers reload from the shared durable store. Two backends:
//! a named broadcast topic, and a shared key-value namespace whose change
//! events carry `instance:timestamp`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::now_millis;

/// Only message kind on the channel
pub const REFRESH_KIND: &str = "refresh";

const TOPIC_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncEvent {
    pub kind: String,
    pub source_instance_id: String,
    pub timestamp: i64,
}

impl SyncEvent {
    pub fn refresh(instance_id: &str) -> Self {
        Self {
            kind: REFRESH_KIND.to_string(),
            source_instance_id: instance_id.to_string(),
            timestamp: now_millis(),
        }
    }

    /// Decode a broadcast message. Anything that is not a well-formed refresh is None.
    pub fn from_message(message: &serde_json::Value) -> Option<Self> {
        let event: SyncEvent = serde_json::from_value(message.clone()).ok()?;
        (event.kind == REFRESH_KIND && !event.source_instance_id.is_empty()).then_some(event)
    }

    /// Decode a `instance:timestamp` storage value
    pub fn from_storage_value(value: &str) -> Option<Self> {
        let (source, timestamp) = value.rsplit_once(':')?;
        let timestamp = timestamp.parse().ok()?;
        if source.is_empty() {
            return None;
        }
        Some(Self {
            kind: REFRESH_KIND.to_string(),
            source_instance_id: source.to_string(),
            timestamp,
        })
    }

    pub fn to_storage_value(&self) -> String {
        format!("{}:{}", self.source_instance_id, self.timestamp)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CHANNEL ABSTRACTION
// ─────────────────────────────────────────────────────────────────────────────

pub trait NotificationChannel: Send + Sync {
    fn publish(&self, event: &SyncEvent);

    fn subscribe(&self) -> Subscription;

    /// Stop publishing; existing subscriptions end
    fn close(&self) {}
}

/// Stream of decoded events. Dropping it unsubscribes.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<SyncEvent>,
    pump: Option<JoinHandle<()>>,
}

impl Subscription {
    fn spawn<F>(pump: F) -> Self
    where
        F: FnOnce(mpsc::UnboundedSender<SyncEvent>) -> JoinHandle<()>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = pump(tx);
        Self { rx, pump: Some(handle) }
    }

    /// A subscription that never yields
    pub fn closed() -> Self {
        let (_, rx) = mpsc::unbounded_channel();
        Self { rx, pump: None }
    }

    pub async fn recv(&mut self) -> Option<SyncEvent> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BROADCAST TOPIC BACKEND
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of named topics shared by every instance in the process
#[derive(Clone, Default)]
pub struct BroadcastHub {
    topics: Arc<Mutex<HashMap<String, broadcast::Sender<serde_json::Value>>>>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, name: &str) -> BroadcastChannel {
        let sender = self
            .topics
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .clone();
        BroadcastChannel {
            sender,
            closed: AtomicBool::new(false),
        }
    }
}

pub struct BroadcastChannel {
    sender: broadcast::Sender<serde_json::Value>,
    closed: AtomicBool,
}

impl BroadcastChannel {
    /// Post an arbitrary message on the topic
    pub fn post_message(&self, message: serde_json::Value) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        // No receivers is not an error
        let _ = self.sender.send(message);
    }
}

impl NotificationChannel for BroadcastChannel {
    fn publish(&self, event: &SyncEvent) {
        match serde_json::to_value(event) {
            Ok(message) => self.post_message(message),
            Err(e) => debug!("dropping unencodable sync event: {}", e),
        }
    }

    fn subscribe(&self) -> Subscription {
        if self.closed.load(Ordering::Acquire) {
            return Subscription::closed();
        }
        let mut rx = self.sender.subscribe();
        Subscription::spawn(move |tx| {
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(message) => match SyncEvent::from_message(&message) {
                            Some(event) => {
                                if tx.send(event).is_err() {
                                    break;
                                }
                            }
                            None => debug!("ignoring malformed sync message"),
                        },
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "sync subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            })
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SHARED KEY-VALUE BACKEND
// ─────────────────────────────────────────────────────────────────────────────

/// Change notification emitted by [`SharedStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

/// Key-value namespace shared between instances, with change events
#[derive(Clone)]
pub struct SharedStorage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    values: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl Default for SharedStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedStorage {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StorageInner {
                values: Mutex::new(HashMap::new()),
                events: broadcast::channel(TOPIC_CAPACITY).0,
            }),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.inner.values.lock().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) {
        self.inner.values.lock().insert(key.to_string(), value.to_string());
        let _ = self.inner.events.send(StorageEvent {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
    }

    pub fn remove_item(&self, key: &str) {
        self.inner.values.lock().remove(key);
        let _ = self.inner.events.send(StorageEvent {
            key: key.to_string(),
            new_value: None,
        });
    }

    pub fn events(&self) -> broadcast::Receiver<StorageEvent> {
        self.inner.events.subscribe()
    }
}

pub struct StorageChannel {
    storage: SharedStorage,
    key: String,
    closed: AtomicBool,
}

impl StorageChannel {
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            closed: AtomicBool::new(false),
        }
    }
}

impl NotificationChannel for StorageChannel {
    fn publish(&self, event: &SyncEvent) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.storage.set_item(&self.key, &event.to_storage_value());
    }

    fn subscribe(&self) -> Subscription {
        if self.closed.load(Ordering::Acquire) {
            return Subscription::closed();
        }
        let mut rx = self.storage.events();
        let key = self.key.clone();
        Subscription::spawn(move |tx| {
            tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(change) if change.key == key => {
                            let Some(event) = change.new_value.as_deref().and_then(SyncEvent::from_storage_value)
                            else {
                                continue;
                            };
                            if tx.send(event).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            debug!(skipped, "storage subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            })
        })
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }
}

/// Used when no cross-instance primitive exists
pub struct NullChannel;

impl NotificationChannel for NullChannel {
    fn publish(&self, _event: &SyncEvent) {}

    fn subscribe(&self) -> Subscription {
        Subscription::closed()
    }
}

/// Pick the broadcast topic when a hub exists, else the shared storage key, else nothing
pub fn select_channel(
    hub: Option<&BroadcastHub>,
    storage: Option<&SharedStorage>,
    channel_name: &str,
    storage_key: &str,
) -> Arc<dyn NotificationChannel> {
    match (hub, storage) {
        (Some(hub), _) => Arc::new(hub.channel(channel_name)),
        (None, Some(storage)) => Arc::new(StorageChannel::new(storage.clone(), storage_key)),
        (None, None) => Arc::new(NullChannel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn next(sub: &mut Subscription) -> Option<SyncEvent> {
        tokio::time::timeout(Duration::from_secs(1), sub.recv()).await.ok().flatten()
    }

    #[test]
    fn test_message_validation() {
        let good = serde_json::json!({ "kind": "refresh", "sourceInstanceId": "a", "timestamp": 1 });
        assert!(SyncEvent::from_message(&good).is_some());

        let wrong_kind = serde_json::json!({ "kind": "other", "sourceInstanceId": "a", "timestamp": 1 });
        assert!(SyncEvent::from_message(&wrong_kind).is_none());

        let missing_source = serde_json::json!({ "kind": "refresh", "timestamp": 1 });
        assert!(SyncEvent::from_message(&missing_source).is_none());

        assert!(SyncEvent::from_message(&serde_json::json!("refresh")).is_none());
    }

    #[test]
    fn test_storage_value_format() {
        let event = SyncEvent::refresh("tab-1");
        let parsed = SyncEvent::from_storage_value(&event.to_storage_value()).unwrap();
        assert_eq!(parsed, event);

        assert!(SyncEvent::from_storage_value("no-timestamp").is_none());
        assert!(SyncEvent::from_storage_value(":123").is_none());
        assert!(SyncEvent::from_storage_value("tab:abc").is_none());
    }

    #[tokio::test]
    async fn test_broadcast_delivers_and_skips_malformed() {
        let hub = BroadcastHub::new();
        let sender = hub.channel("topic");
        let mut sub = hub.channel("topic").subscribe();

        sender.post_message(serde_json::json!({ "bogus": true }));
        sender.publish(&SyncEvent::refresh("tab-1"));

        let event = next(&mut sub).await.unwrap();
        assert_eq!(event.source_instance_id, "tab-1");
    }

    #[tokio::test]
    async fn test_topics_are_isolated() {
        let hub = BroadcastHub::new();
        let mut sub = hub.channel("a").subscribe();
        hub.channel("b").publish(&SyncEvent::refresh("tab-1"));

        let got = tokio::time::timeout(Duration::from_millis(50), sub.recv()).await;
        assert!(got.is_err());
    }

    #[tokio::test]
    async fn test_storage_channel_filters_key() {
        let storage = SharedStorage::new();
        let channel = StorageChannel::new(storage.clone(), "sync-key");
        let mut sub = channel.subscribe();

        storage.set_item("unrelated", "tab-9:1");
        storage.remove_item("sync-key");
        channel.publish(&SyncEvent::refresh("tab-2"));

        let event = next(&mut sub).await.unwrap();
        assert_eq!(event.source_instance_id, "tab-2");
        assert!(storage.get_item("sync-key").unwrap().starts_with("tab-2:"));
    }

    #[tokio::test]
    async fn test_closed_channel_stops_publishing() {
        let hub = BroadcastHub::new();
        let channel = hub.channel("t");
        let mut sub = hub.channel("t").subscribe();
        channel.close();
        channel.publish(&SyncEvent::refresh("tab-1"));

        let got = tokio::time::timeout(Duration::from_millis(50), sub.recv()).await;
        assert!(got.is_err());
        assert!(channel.subscribe().recv().await.is_none());
    }

    #[tokio::test]
    async fn test_select_channel_fallbacks() {
        let storage = SharedStorage::new();
        let channel = select_channel(None, Some(&storage), "t", "k");
        channel.publish(&SyncEvent::refresh("x"));
        assert!(storage.get_item("k").is_some());

        let null = select_channel(None, None, "t", "k");
        assert!(null.subscribe().recv().await.is_none());
    }
}
