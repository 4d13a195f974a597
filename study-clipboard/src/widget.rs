//! The clipboard widget
//!
//! Ties the store, preview pipeline, rendering, capture and sync together and
//! hands the host a [`WidgetHandle`].
//!
//! Concurrency model:
//! - Widget state sits behind one mutex that is never held across an await.
//! - List mutations (capture, eviction, reload) happen synchronously under that
//!   lock, then the surface is rebuilt from the new snapshot.
//! - A driver task owns everything that arrives later: sync notifications,
//!   enrichment results and timer commands. Each is applied in turn.
//! - Persistence is debounced; a flush writes the whole list and then tells
//!   other instances to reload.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::capture::{insert_captured, DataTransfer, DragResponse, DropZone};
use crate::config::WidgetConfig;
use crate::debounce::Debouncer;
use crate::durable::DurableStore;
use crate::enrichment::{EnrichmentTasks, ItemUpdate};
use crate::models::{ClipboardItem, FileContent};
use crate::panel::{mirror_state, Key, Panel, PanelInput, PanelState};
use crate::preview::{prepare_preview, PreviewUrls};
use crate::render::{apply_view, drag_payload, render, DragPayload};
use crate::surface::Surface;
use crate::sync::{NotificationChannel, Subscription, SyncEvent};
use crate::upload::UploadService;

/// Collaborators injected by the host
pub struct WidgetDeps {
    pub store: DurableStore,
    pub channel: Arc<dyn NotificationChannel>,
    pub previews: Arc<dyn PreviewUrls>,
    /// Optional; uploads are skipped without it
    pub uploader: Option<Arc<dyn UploadService>>,
    pub surface: Arc<dyn Surface>,
}

/// Pointer position relative to the capsule's bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

enum Command {
    FlushPersist,
    HoverClose,
    EndCaptureAnimation,
}

struct WidgetState {
    items: Vec<ClipboardItem>,
    panel: Panel,
    drop_zone: DropZone,
    loading_from_store: bool,
    root_hovered: bool,
    destroyed: bool,
}

struct Shared {
    config: WidgetConfig,
    instance_id: String,
    store: DurableStore,
    channel: Arc<dyn NotificationChannel>,
    previews: Arc<dyn PreviewUrls>,
    uploader: Option<Arc<dyn UploadService>>,
    surface: Arc<dyn Surface>,
    state: Mutex<WidgetState>,
    enrichment: EnrichmentTasks,
    persist_timer: Debouncer,
    hover_timer: Debouncer,
    capture_timer: Debouncer,
    commands: mpsc::UnboundedSender<Command>,
    reloads: watch::Sender<u64>,
    shutdown: CancellationToken,
}

pub struct ClipboardWidget;

impl ClipboardWidget {
    /// Attach a widget to the host surface and load the stored items.
    ///
    /// Returns None when a required anchor (root, capsule, panel, list) is missing.
    /// Must be called from within a tokio runtime.
    pub async fn init(config: WidgetConfig, deps: WidgetDeps) -> Option<WidgetHandle> {
        let anchors = &config.anchors;
        if let Some(missing) = anchors.required().into_iter().find(|id| !deps.surface.has_anchor(id)) {
            debug!(anchor = missing, "clipboard anchor missing, widget not attached");
            return None;
        }

        let instance_id = config
            .instance_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let (reloads, _) = watch::channel(0);

        let shared = Arc::new(Shared {
            persist_timer: Debouncer::new(config.persist_debounce()),
            hover_timer: Debouncer::new(config.hover_close_delay()),
            capture_timer: Debouncer::new(config.capture_animation()),
            config,
            instance_id,
            store: deps.store,
            channel: deps.channel,
            previews: deps.previews,
            uploader: deps.uploader,
            surface: deps.surface,
            state: Mutex::new(WidgetState {
                items: Vec::new(),
                panel: Panel::default(),
                drop_zone: DropZone::default(),
                loading_from_store: false,
                root_hovered: false,
                destroyed: false,
            }),
            enrichment: EnrichmentTasks::new(update_tx),
            commands: command_tx,
            reloads,
            shutdown: CancellationToken::new(),
        });

        {
            let mut state = shared.state.lock();
            mirror_state(shared.surface.as_ref(), &shared.config.anchors, PanelState::Closed);
            shared.update_ui(&mut state);
        }

        let subscription = shared.channel.subscribe();
        let driver = tokio::spawn(drive(Arc::clone(&shared), subscription, update_rx, command_rx));

        shared.load_from_store().await;

        Some(WidgetHandle {
            shared,
            driver: Mutex::new(Some(driver)),
        })
    }
}

async fn drive(
    shared: Arc<Shared>,
    mut subscription: Subscription,
    mut updates: mpsc::UnboundedReceiver<ItemUpdate>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    loop {
        tokio::select! {
            _ = shared.shutdown.cancelled() => break,
            Some(event) = subscription.recv() => {
                if event.source_instance_id == shared.instance_id {
                    continue;
                }
                debug!(source = %event.source_instance_id, "clipboard changed elsewhere, reloading");
                shared.load_from_store().await;
            }
            Some(update) = updates.recv() => shared.apply_update(update),
            Some(command) = commands.recv() => match command {
                Command::FlushPersist => shared.flush_persist().await,
                Command::HoverClose => shared.hover_close(),
                Command::EndCaptureAnimation => {
                    shared.surface.toggle_class(&shared.config.anchors.root, "captured", false);
                }
            },
            else => break,
        }
    }
}

impl Shared {
    /// Prepare previews, rebuild the list, update container state
    fn update_ui(&self, state: &mut WidgetState) {
        for item in state.items.iter_mut() {
            if prepare_preview(item, self.previews.as_ref()) {
                if let Some(content) = &item.content {
                    self.enrichment.spawn_snippet(&item.id, content.clone());
                }
            }
        }
        let view = render(&state.items);
        apply_view(self.surface.as_ref(), &self.config.anchors, &view);
    }

    /// Revoke a local preview URL. Remote URLs are left alone.
    fn release_preview(&self, item: &mut ClipboardItem) {
        if item.has_local_preview() {
            if let Some(url) = item.preview_url.take() {
                self.previews.revoke(&url);
            }
            item.preview_prepared = false;
        }
    }

    /// Forget an item that left the list
    fn release_item(&self, item: &mut ClipboardItem) {
        self.enrichment.cancel(&item.id);
        self.release_preview(item);
    }

    fn schedule_persist(&self, state: &WidgetState) {
        if state.loading_from_store || state.destroyed {
            return;
        }
        let commands = self.commands.clone();
        self.persist_timer.schedule(move || {
            let _ = commands.send(Command::FlushPersist);
        });
    }

    async fn flush_persist(&self) {
        let records = {
            let state = self.state.lock();
            if state.loading_from_store || state.destroyed {
                return;
            }
            state.items.iter().map(ClipboardItem::to_record).collect::<Vec<_>>()
        };
        self.store.save(records).await;
        self.channel.publish(&SyncEvent::refresh(&self.instance_id));
    }

    async fn load_from_store(&self) {
        {
            let mut state = self.state.lock();
            if state.destroyed {
                return;
            }
            state.loading_from_store = true;
        }

        let records = self.store.load().await;

        {
            let mut state = self.state.lock();
            let mut previous = std::mem::take(&mut state.items);
            for item in previous.iter_mut() {
                self.release_item(item);
            }

            let mut items: Vec<ClipboardItem> =
                records.into_iter().map(ClipboardItem::from_record).collect();
            items.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
            state.items = items;

            if !state.destroyed {
                self.update_ui(&mut state);
            }
            state.loading_from_store = false;
        }

        self.reloads.send_modify(|count| *count += 1);
    }

    fn apply_update(&self, update: ItemUpdate) {
        let mut state = self.state.lock();
        if state.destroyed {
            return;
        }
        let Some(index) = state.items.iter().position(|i| i.id == update.item_id()) else {
            return;
        };

        match update {
            ItemUpdate::Snippet { snippet, .. } => {
                let item = &mut state.items[index];
                if item.snippet.is_some() {
                    return;
                }
                item.snippet = Some(snippet);
            }
            ItemUpdate::Uploaded { remote_path, remote_url, .. } => {
                let mut item = state.items[index].clone();
                item.remote_path = remote_path;
                if let Some(url) = remote_url {
                    self.release_preview(&mut item);
                    item.preview_url = Some(url.clone());
                    item.remote_url = Some(url);
                    item.preview_prepared = true;
                }
                state.items[index] = item;
            }
        }

        self.schedule_persist(&state);
        self.update_ui(&mut state);
    }

    fn apply_panel(&self, state: &mut WidgetState, input: PanelInput) -> bool {
        match state.panel.apply(input) {
            Some(next) => {
                mirror_state(self.surface.as_ref(), &self.config.anchors, next);
                true
            }
            None => false,
        }
    }

    fn hover_close(&self) {
        let mut state = self.state.lock();
        let root_hovered = state.root_hovered;
        self.apply_panel(&mut state, PanelInput::HoverCloseElapsed { root_hovered });
    }

    fn set_drag_ready(&self, response: DragResponse) {
        if let DragResponse::Accepted { drag_ready } = response {
            self.surface.toggle_class(&self.config.anchors.root, "drag-ready", drag_ready);
        }
    }

    fn play_capture_animation(&self) {
        if self.config.reduced_motion {
            return;
        }
        let root = &self.config.anchors.root;
        self.surface.toggle_class(root, "captured", false);
        self.surface.toggle_class(root, "captured", true);
        let commands = self.commands.clone();
        self.capture_timer.schedule(move || {
            let _ = commands.send(Command::EndCaptureAnimation);
        });
    }
}

/// Control surface returned to the host
pub struct WidgetHandle {
    shared: Arc<Shared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl WidgetHandle {
    pub fn instance_id(&self) -> &str {
        &self.shared.instance_id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.shared.config
    }

    /// Reload every item from the durable store and re-render
    pub async fn refresh(&self) {
        self.shared.load_from_store().await;
    }

    pub fn open(&self) {
        let mut state = self.shared.state.lock();
        self.shared.apply_panel(&mut state, PanelInput::Open);
    }

    pub fn close(&self) {
        let mut state = self.shared.state.lock();
        self.shared.apply_panel(&mut state, PanelInput::Close);
    }

    pub fn panel_state(&self) -> PanelState {
        self.shared.state.lock().panel.state()
    }

    /// Copy of the current items, newest first
    pub fn items(&self) -> Vec<ClipboardItem> {
        self.shared.state.lock().items.clone()
    }

    /// Snippet and upload tasks still running
    pub fn pending_tasks(&self) -> usize {
        self.shared.enrichment.in_flight()
    }

    /// Completed reloads; bumps after every load from the durable store
    pub fn reloads(&self) -> watch::Receiver<u64> {
        self.shared.reloads.subscribe()
    }

    /// Write any pending change now instead of waiting for the debounce
    pub async fn flush(&self) {
        self.shared.persist_timer.cancel();
        self.shared.flush_persist().await;
    }

    /// Remove every item
    pub fn clear(&self) {
        let mut state = self.shared.state.lock();
        let mut removed = std::mem::take(&mut state.items);
        for item in removed.iter_mut() {
            self.shared.release_item(item);
        }
        self.shared.update_ui(&mut state);
        self.shared.schedule_persist(&state);
    }

    /// Release preview URLs, stop background work and detach from the channel.
    /// In-flight saves are not awaited.
    pub fn destroy(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.destroyed {
                return;
            }
            state.destroyed = true;
            for item in state.items.iter_mut() {
                self.shared.release_preview(item);
            }
        }

        self.shared.persist_timer.cancel();
        self.shared.hover_timer.cancel();
        self.shared.capture_timer.cancel();
        self.shared.enrichment.cancel_all();
        self.shared.shutdown.cancel();
        self.shared.channel.close();
        if let Some(driver) = self.driver.lock().take() {
            driver.abort();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host events
    // ─────────────────────────────────────────────────────────────────────────

    pub fn drag_enter(&self, transfer: &DataTransfer) -> DragResponse {
        let response = self.shared.state.lock().drop_zone.enter(transfer);
        self.shared.set_drag_ready(response);
        response
    }

    pub fn drag_over(&self, transfer: &DataTransfer) -> DragResponse {
        self.shared.state.lock().drop_zone.over(transfer)
    }

    pub fn drag_leave(&self, transfer: &DataTransfer) -> DragResponse {
        let response = self.shared.state.lock().drop_zone.leave(transfer);
        self.shared.set_drag_ready(response);
        response
    }

    /// Capture dropped files. Non-file drops are ignored.
    pub fn drop_files(&self, transfer: DataTransfer) -> DragResponse {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if state.destroyed {
            return DragResponse::Ignored;
        }
        let Some(files) = state.drop_zone.drop_files(transfer) else {
            return DragResponse::Ignored;
        };
        let response = DragResponse::Accepted { drag_ready: false };
        shared.set_drag_ready(response);
        if files.is_empty() {
            return response;
        }

        let captured: Vec<ClipboardItem> = files.into_iter().map(ClipboardItem::from_captured).collect();
        let new_ids: Vec<String> = captured.iter().map(|i| i.id.clone()).collect();

        let mut evicted = insert_captured(&mut state.items, captured, shared.config.max_items);
        for item in evicted.iter_mut() {
            shared.release_item(item);
        }

        shared.update_ui(&mut state);
        shared.schedule_persist(&state);

        if let Some(uploader) = &shared.uploader {
            for item in state.items.iter().filter(|i| new_ids.contains(&i.id)) {
                if item.remote_url.is_some() {
                    continue;
                }
                if let Some(content) = &item.content {
                    shared.enrichment.spawn_upload(
                        &item.id,
                        content.clone(),
                        item.file_name.clone(),
                        Arc::clone(uploader),
                    );
                }
            }
        }

        shared.play_capture_animation();
        shared.apply_panel(&mut state, PanelInput::Captured);
        response
    }

    /// Data to attach when the entry for `item_id` is dragged out
    pub fn drag_payload(&self, item_id: &str) -> Option<DragPayload> {
        let state = self.shared.state.lock();
        state.items.iter().find(|i| i.id == item_id).map(drag_payload)
    }

    pub fn capsule_double_click(&self) {
        let mut state = self.shared.state.lock();
        self.shared.apply_panel(&mut state, PanelInput::CapsuleDoubleClick);
    }

    /// Returns true when the key was consumed
    pub fn capsule_key(&self, key: &str) -> bool {
        let key = Key::from_name(key);
        let mut state = self.shared.state.lock();
        self.shared.apply_panel(&mut state, PanelInput::CapsuleKey(key));
        matches!(key, Key::Enter | Key::Space)
    }

    pub fn document_key(&self, key: &str) {
        let mut state = self.shared.state.lock();
        self.shared.apply_panel(&mut state, PanelInput::DocumentKey(Key::from_name(key)));
    }

    /// A click anywhere in the document; `inside_root` tells whether it hit the widget
    pub fn document_click(&self, inside_root: bool) {
        if inside_root {
            return;
        }
        let mut state = self.shared.state.lock();
        self.shared.apply_panel(&mut state, PanelInput::OutsideClick);
    }

    pub fn pointer_enter(&self) {
        self.shared.state.lock().root_hovered = true;
        self.shared.hover_timer.cancel();
    }

    /// Arm the delayed close; re-entering before it fires cancels it
    pub fn pointer_leave(&self) {
        {
            let mut state = self.shared.state.lock();
            state.root_hovered = false;
            if !state.panel.state().is_open() {
                return;
            }
        }
        let commands = self.shared.commands.clone();
        self.shared.hover_timer.schedule(move || {
            let _ = commands.send(Command::HoverClose);
        });
    }

    /// Track the pointer over the capsule as `--mx`/`--my` percentages
    pub fn capsule_pointer_move(&self, x: f64, y: f64, rect: PointerRect) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let mx = (x - rect.left) / rect.width * 100.0;
        let my = (y - rect.top) / rect.height * 100.0;
        let capsule = &self.shared.config.anchors.capsule;
        self.shared.surface.set_style_property(capsule, "--mx", Some(&format!("{}%", mx)));
        self.shared.surface.set_style_property(capsule, "--my", Some(&format!("{}%", my)));
    }

    pub fn capsule_pointer_leave(&self) {
        let capsule = &self.shared.config.anchors.capsule;
        self.shared.surface.set_style_property(capsule, "--mx", None);
        self.shared.surface.set_style_property(capsule, "--my", None);
    }

    /// Capture files directly, as if they were dropped on the widget
    pub fn capture(&self, files: Vec<FileContent>) -> DragResponse {
        self.drop_files(DataTransfer::with_files(files))
    }
}

impl Drop for WidgetHandle {
    fn drop(&mut self) {
        self.shared.shutdown.cancel();
        if let Some(driver) = self.driver.get_mut().take() {
            driver.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnchorIds;
    use crate::preview::ObjectUrlRegistry;
    use crate::surface::MemorySurface;
    use crate::sync::NullChannel;
    use std::time::Duration;

    fn surface() -> Arc<MemorySurface> {
        let a = AnchorIds::default();
        Arc::new(MemorySurface::with_anchors([a.root, a.capsule, a.panel, a.list, a.count, a.empty]))
    }

    async fn widget(surface: Arc<MemorySurface>, config: WidgetConfig) -> WidgetHandle {
        ClipboardWidget::init(
            config,
            WidgetDeps {
                store: DurableStore::in_memory(),
                channel: Arc::new(NullChannel),
                previews: Arc::new(ObjectUrlRegistry::default()),
                uploader: None,
                surface,
            },
        )
        .await
        .expect("anchors present")
    }

    fn file(name: &str, mime: &str) -> FileContent {
        FileContent::new(name, mime, 1, name.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_missing_anchor_returns_none() {
        let surface = Arc::new(MemorySurface::with_anchors(["homeClipboard"]));
        let result = ClipboardWidget::init(
            WidgetConfig::default(),
            WidgetDeps {
                store: DurableStore::in_memory(),
                channel: Arc::new(NullChannel),
                previews: Arc::new(ObjectUrlRegistry::default()),
                uploader: None,
                surface,
            },
        )
        .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_initial_render_is_empty_and_closed() {
        let surface = surface();
        let handle = widget(Arc::clone(&surface), WidgetConfig::default()).await;
        let anchors = &handle.config().anchors;

        assert!(surface.has_class(&anchors.root, "empty"));
        assert_eq!(surface.attribute(&anchors.capsule, "aria-expanded").as_deref(), Some("false"));
        assert_eq!(handle.panel_state(), PanelState::Closed);
        assert_eq!(*handle.reloads().borrow(), 1);
    }

    #[tokio::test]
    async fn test_drop_captures_newest_first_and_closes_panel() {
        let surface = surface();
        let handle = widget(Arc::clone(&surface), WidgetConfig::default().with_reduced_motion(true)).await;
        handle.open();

        let response = handle.drop_files(DataTransfer::with_files(vec![file("a.txt", "text/plain")]));
        assert_eq!(response, DragResponse::Accepted { drag_ready: false });
        handle.capture(vec![file("b.txt", "text/plain")]);

        let names: Vec<_> = handle.items().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["b.txt", "a.txt"]);
        assert_eq!(handle.panel_state(), PanelState::Closed);

        let list = surface.list(&handle.config().anchors.list).unwrap();
        assert_eq!(list.count(), 2);
        assert!(!surface.has_class(&handle.config().anchors.root, "captured"));
    }

    #[tokio::test]
    async fn test_non_file_drop_ignored() {
        let handle = widget(surface(), WidgetConfig::default()).await;
        handle.open();
        let response = handle.drop_files(DataTransfer::with_types(["text/plain"]));
        assert_eq!(response, DragResponse::Ignored);
        assert!(handle.items().is_empty());
        assert_eq!(handle.panel_state(), PanelState::Open);
    }

    #[tokio::test]
    async fn test_drag_ready_tracks_depth() {
        let surface = surface();
        let handle = widget(Arc::clone(&surface), WidgetConfig::default()).await;
        let root = handle.config().anchors.root.clone();
        let drag = DataTransfer::with_types(["Files"]);

        handle.drag_enter(&drag);
        handle.drag_enter(&drag);
        handle.drag_leave(&drag);
        assert!(surface.has_class(&root, "drag-ready"));
        handle.drag_leave(&drag);
        assert!(!surface.has_class(&root, "drag-ready"));
    }

    #[tokio::test]
    async fn test_capture_animation_plays_and_ends() {
        let surface = surface();
        let mut config = WidgetConfig::default();
        config.capture_animation_ms = 20;
        let handle = widget(Arc::clone(&surface), config).await;
        let root = handle.config().anchors.root.clone();

        handle.capture(vec![file("a.bin", "")]);
        assert!(surface.has_class(&root, "captured"));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!surface.has_class(&root, "captured"));
    }

    #[tokio::test]
    async fn test_text_snippet_is_filled_in() {
        let surface = surface();
        let handle = widget(Arc::clone(&surface), WidgetConfig::default()).await;
        handle.capture(vec![FileContent::new("n.txt", "text/plain", 1, b"a\n\n\nb   c".to_vec())]);

        let mut snippet = None;
        for _ in 0..100 {
            snippet = handle.items()[0].snippet.clone();
            if snippet.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(snippet.as_deref(), Some("a b c"));

        let list = surface.list(&handle.config().anchors.list).unwrap();
        assert_eq!(list.entries[0].snippet.as_deref(), Some("a b c"));
    }

    #[tokio::test]
    async fn test_hover_intent_close() {
        let mut config = WidgetConfig::default();
        config.hover_close_delay_ms = 20;
        let handle = widget(surface(), config).await;

        handle.open();
        handle.pointer_leave();
        handle.pointer_enter();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.panel_state(), PanelState::Open);

        handle.pointer_leave();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.panel_state(), PanelState::Closed);
    }

    #[tokio::test]
    async fn test_keyboard_and_outside_click() {
        let handle = widget(surface(), WidgetConfig::default()).await;

        assert!(handle.capsule_key("Enter"));
        assert_eq!(handle.panel_state(), PanelState::Open);
        handle.document_click(true);
        assert_eq!(handle.panel_state(), PanelState::Open);
        handle.document_click(false);
        assert_eq!(handle.panel_state(), PanelState::Closed);

        handle.capsule_double_click();
        handle.document_key("Escape");
        assert_eq!(handle.panel_state(), PanelState::Closed);
        assert!(!handle.capsule_key("Escape"));
    }

    #[tokio::test]
    async fn test_capsule_pointer_tracking() {
        let surface = surface();
        let handle = widget(Arc::clone(&surface), WidgetConfig::default()).await;
        let capsule = handle.config().anchors.capsule.clone();
        let rect = PointerRect { left: 10.0, top: 0.0, width: 100.0, height: 50.0 };

        handle.capsule_pointer_move(60.0, 25.0, rect);
        assert_eq!(surface.element(&capsule).style.get("--mx").map(String::as_str), Some("50%"));
        assert_eq!(surface.element(&capsule).style.get("--my").map(String::as_str), Some("50%"));

        handle.capsule_pointer_leave();
        assert!(surface.element(&capsule).style.is_empty());
    }

    #[tokio::test]
    async fn test_clear_and_flush() {
        let handle = widget(surface(), WidgetConfig::default()).await;
        handle.capture(vec![file("a.txt", "text/plain")]);
        handle.flush().await;
        assert_eq!(handle.shared.store.count().await, 1);

        handle.clear();
        handle.flush().await;
        assert_eq!(handle.shared.store.count().await, 0);
        assert!(handle.items().is_empty());
    }

    #[tokio::test]
    async fn test_drag_payload_for_entry() {
        let handle = widget(surface(), WidgetConfig::default()).await;
        handle.capture(vec![file("a.txt", "text/plain")]);
        let id = handle.items()[0].id.clone();

        let payload = handle.drag_payload(&id).unwrap();
        assert_eq!(payload.text_plain, "a.txt");
        assert!(payload.file.is_some());
        assert!(handle.drag_payload("missing").is_none());
    }
}
