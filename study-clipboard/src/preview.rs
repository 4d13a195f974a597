//! Preview classification for clipboard items
//!
//! Picks a preview kind and icon from the item's MIME type, creates local
//! `blob:` URLs for image content, and extracts short text snippets.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::interface::{PreviewIcon, PreviewKind};
use crate::models::{ClipboardItem, FileContent};

/// Structured-text MIME types that get a snippet like `text/*`
const TEXT_SNIPPET_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "application/x-javascript",
    "application/svg+xml",
];

/// Bytes read from the start of a file when extracting a snippet
pub const SNIPPET_READ_BYTES: usize = 4096;

/// Visible characters kept in a snippet before the ellipsis
pub const SNIPPET_CHAR_LIMIT: usize = 160;

/// Result of MIME classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewClass {
    Image,
    Text,
    Icon(PreviewIcon),
}

/// Classify a MIME type. First match wins; comparison is case-insensitive.
pub fn classify(mime_type: &str) -> PreviewClass {
    let mime = mime_type.to_lowercase();
    let has_any = |needles: &[&str]| needles.iter().any(|n| mime.contains(n));

    if mime.starts_with("image/") {
        PreviewClass::Image
    } else if mime.starts_with("text/") || TEXT_SNIPPET_TYPES.contains(&mime.as_str()) {
        PreviewClass::Text
    } else if mime.starts_with("video/") {
        PreviewClass::Icon(PreviewIcon::Clapper)
    } else if mime.starts_with("audio/") {
        PreviewClass::Icon(PreviewIcon::MusicNote)
    } else if mime.contains("pdf") {
        PreviewClass::Icon(PreviewIcon::Page)
    } else if has_any(&["zip", "compressed", "archive"]) {
        PreviewClass::Icon(PreviewIcon::Compressed)
    } else if has_any(&["sheet", "excel", "spreadsheet"]) {
        PreviewClass::Icon(PreviewIcon::Chart)
    } else if has_any(&["presentation", "powerpoint", "slideshow"]) {
        PreviewClass::Icon(PreviewIcon::Slides)
    } else if has_any(&["word", "document", "msword"]) {
        PreviewClass::Icon(PreviewIcon::Sheet)
    } else {
        PreviewClass::Icon(PreviewIcon::GenericPage)
    }
}

/// Icon used when an item has no visual preview and no stored icon
pub fn fallback_icon(mime_type: &str) -> PreviewIcon {
    match classify(mime_type) {
        PreviewClass::Icon(icon) => icon,
        PreviewClass::Text => PreviewIcon::Note,
        PreviewClass::Image => PreviewIcon::GenericPage,
    }
}

/// Assign preview kind, icon and URL once per item.
///
/// Returns true when the caller should schedule snippet extraction.
pub fn prepare_preview(item: &mut ClipboardItem, urls: &dyn PreviewUrls) -> bool {
    if item.preview_prepared {
        return false;
    }

    let mut needs_snippet = false;
    match classify(&item.mime_type) {
        PreviewClass::Image => {
            item.preview_kind = Some(PreviewKind::Image);
            if let Some(remote) = &item.remote_url {
                item.preview_url = Some(remote.clone());
            } else if item.preview_url.is_none() {
                if let Some(content) = &item.content {
                    item.preview_url = Some(urls.create(content));
                }
            }
        }
        PreviewClass::Text => {
            item.preview_kind = Some(PreviewKind::Icon);
            item.preview_icon = Some(PreviewIcon::Note);
            needs_snippet = item.snippet.is_none() && item.content.is_some();
        }
        PreviewClass::Icon(icon) => {
            item.preview_kind = Some(PreviewKind::Icon);
            item.preview_icon = Some(icon);
        }
    }

    item.preview_prepared = true;
    needs_snippet
}

// ─────────────────────────────────────────────────────────────────────────────
// SNIPPETS
// ─────────────────────────────────────────────────────────────────────────────

/// Collapse whitespace runs to single spaces and trim
pub fn sanitize_snippet(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Snippet from the first 4096 bytes of `content`, or None when there is no text
pub fn extract_snippet(content: &FileContent) -> Option<String> {
    let head = content.head(SNIPPET_READ_BYTES);
    let text = String::from_utf8_lossy(head);
    let cleaned = sanitize_snippet(&text);
    if cleaned.is_empty() {
        return None;
    }

    if cleaned.chars().count() > SNIPPET_CHAR_LIMIT {
        let truncated: String = cleaned.chars().take(SNIPPET_CHAR_LIMIT).collect();
        Some(format!("{}…", truncated))
    } else {
        Some(cleaned)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// LOCAL PREVIEW URLS
// ─────────────────────────────────────────────────────────────────────────────

/// Creates and releases ephemeral preview references for local content
pub trait PreviewUrls: Send + Sync {
    /// Create a new reference for `content`
    fn create(&self, content: &FileContent) -> String;

    /// Release a reference. Returns false if it was unknown or already released.
    fn revoke(&self, url: &str) -> bool;
}

/// In-process `blob:` URL registry
///
/// Holds the content alive until the URL is revoked, so hosts can resolve a
/// preview URL back to its bytes.
pub struct ObjectUrlRegistry {
    origin: String,
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    live: HashMap<String, FileContent>,
    revoked_count: usize,
}

impl ObjectUrlRegistry {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn resolve(&self, url: &str) -> Option<FileContent> {
        self.state.lock().live.get(url).cloned()
    }

    pub fn live_count(&self) -> usize {
        self.state.lock().live.len()
    }

    /// Number of URLs released so far
    pub fn revoked_count(&self) -> usize {
        self.state.lock().revoked_count
    }
}

impl Default for ObjectUrlRegistry {
    fn default() -> Self {
        Self::new("study-clipboard")
    }
}

impl PreviewUrls for ObjectUrlRegistry {
    fn create(&self, content: &FileContent) -> String {
        let url = format!("blob:{}/{}", self.origin, uuid::Uuid::new_v4());
        self.state.lock().live.insert(url.clone(), content.clone());
        url
    }

    fn revoke(&self, url: &str) -> bool {
        let mut state = self.state.lock();
        if state.live.remove(url).is_some() {
            state.revoked_count += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, mime: &str, body: &[u8]) -> ClipboardItem {
        ClipboardItem::from_captured(FileContent::new(name, mime, 1, body.to_vec()))
    }

    #[test]
    fn test_classification_priority() {
        assert_eq!(classify("image/png"), PreviewClass::Image);
        assert_eq!(classify("IMAGE/JPEG"), PreviewClass::Image);
        assert_eq!(classify("text/plain"), PreviewClass::Text);
        assert_eq!(classify("application/json"), PreviewClass::Text);
        assert_eq!(classify("application/svg+xml"), PreviewClass::Text);
        assert_eq!(classify("video/mp4"), PreviewClass::Icon(PreviewIcon::Clapper));
        assert_eq!(classify("audio/mpeg"), PreviewClass::Icon(PreviewIcon::MusicNote));
        assert_eq!(classify("application/pdf"), PreviewClass::Icon(PreviewIcon::Page));
        assert_eq!(classify("application/zip"), PreviewClass::Icon(PreviewIcon::Compressed));
        assert_eq!(classify("application/x-7z-compressed"), PreviewClass::Icon(PreviewIcon::Compressed));
        assert_eq!(classify("application/vnd.ms-excel"), PreviewClass::Icon(PreviewIcon::Chart));
        assert_eq!(classify("application/vnd.ms-powerpoint"), PreviewClass::Icon(PreviewIcon::Slides));
        assert_eq!(classify("application/msword"), PreviewClass::Icon(PreviewIcon::Sheet));
        assert_eq!(classify(""), PreviewClass::Icon(PreviewIcon::GenericPage));
        assert_eq!(classify("application/octet-stream"), PreviewClass::Icon(PreviewIcon::GenericPage));
    }

    #[test]
    fn test_office_open_xml_types_resolve_by_order() {
        // Every OOXML type contains "officedocument"; the earlier rules must win.
        assert_eq!(
            classify("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            PreviewClass::Icon(PreviewIcon::Chart)
        );
        assert_eq!(
            classify("application/vnd.openxmlformats-officedocument.presentationml.presentation"),
            PreviewClass::Icon(PreviewIcon::Slides)
        );
        assert_eq!(
            classify("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            PreviewClass::Icon(PreviewIcon::Sheet)
        );
    }

    #[test]
    fn test_image_gets_local_url_once() {
        let urls = ObjectUrlRegistry::default();
        let mut image = item("photo.png", "image/png", &[0x89, 0x50]);

        assert!(!prepare_preview(&mut image, &urls));
        assert_eq!(image.preview_kind, Some(PreviewKind::Image));
        let url = image.preview_url.clone().expect("preview url");
        assert!(url.starts_with("blob:"));
        assert_eq!(urls.resolve(&url).unwrap().bytes(), &[0x89, 0x50]);

        // Prepared items are left alone
        prepare_preview(&mut image, &urls);
        assert_eq!(urls.live_count(), 1);
    }

    #[test]
    fn test_image_prefers_remote_url() {
        let urls = ObjectUrlRegistry::default();
        let mut image = item("photo.png", "image/png", &[1]);
        image.remote_url = Some("https://cdn.example.com/p.png".into());

        prepare_preview(&mut image, &urls);
        assert_eq!(image.preview_url.as_deref(), Some("https://cdn.example.com/p.png"));
        assert_eq!(urls.live_count(), 0);
    }

    #[test]
    fn test_text_requests_snippet_only_when_missing() {
        let urls = ObjectUrlRegistry::default();
        let mut text = item("a.txt", "text/plain", b"hello");
        assert!(prepare_preview(&mut text, &urls));
        assert_eq!(text.preview_icon, Some(PreviewIcon::Note));

        let mut with_snippet = item("b.txt", "text/plain", b"hello");
        with_snippet.snippet = Some("hello".into());
        assert!(!prepare_preview(&mut with_snippet, &urls));
    }

    #[test]
    fn test_snippet_collapses_whitespace() {
        let content = FileContent::new("a.txt", "text/plain", 1, b"a\n\n\nb   c".to_vec());
        assert_eq!(extract_snippet(&content).as_deref(), Some("a b c"));
    }

    #[test]
    fn test_snippet_truncates_long_lines() {
        let body = "x".repeat(300);
        let content = FileContent::new("a.txt", "text/plain", 1, body.into_bytes());
        let snippet = extract_snippet(&content).unwrap();
        assert_eq!(snippet, format!("{}…", "x".repeat(160)));
    }

    #[test]
    fn test_snippet_reads_only_head() {
        let mut body = " ".repeat(SNIPPET_READ_BYTES);
        body.push_str("hidden");
        let content = FileContent::new("a.txt", "text/plain", 1, body.into_bytes());
        assert_eq!(extract_snippet(&content), None);
    }

    #[test]
    fn test_registry_revokes_once() {
        let urls = ObjectUrlRegistry::default();
        let content = FileContent::new("a.png", "image/png", 1, vec![1, 2, 3]);
        let url = urls.create(&content);

        assert!(urls.revoke(&url));
        assert!(!urls.revoke(&url));
        assert_eq!(urls.revoked_count(), 1);
        assert_eq!(urls.live_count(), 0);
        assert!(urls.resolve(&url).is_none());
    }

    #[test]
    fn test_registry_state_stays_bounded_under_churn() {
        let urls = ObjectUrlRegistry::default();
        let content = FileContent::new("a.png", "image/png", 1, vec![1, 2, 3]);
        for _ in 0..1000 {
            let url = urls.create(&content);
            assert!(urls.revoke(&url));
        }
        assert_eq!(urls.live_count(), 0);
        assert_eq!(urls.revoked_count(), 1000);
        assert!(urls.state.lock().live.capacity() < 1000);
    }
}
