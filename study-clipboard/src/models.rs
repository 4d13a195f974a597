//! Core data models for the clipboard widget
//!
//! `ClipboardItem` is the in-memory representation the widget renders.
//! `ItemRecord` is its flattened, storable form: one row in the durable store,
//! or one JSON object when exported.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::interface::{PreviewIcon, PreviewKind};

/// Display label used when neither a MIME type nor an extension is known
pub const UNKNOWN_DISPLAY_TYPE: &str = "File";

// ─────────────────────────────────────────────────────────────────────────────
// FILE CONTENT (binary handle)
// ─────────────────────────────────────────────────────────────────────────────

/// Binary handle for a captured file.
///
/// Cloning shares the underlying bytes, so handing the handle to an upload or a
/// drag payload never copies the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub name: String,
    pub mime_type: String,
    /// Modification time in epoch milliseconds
    pub last_modified: i64,
    data: Arc<[u8]>,
}

impl FileContent {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        last_modified: i64,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            last_modified,
            data: data.into(),
        }
    }

    /// Read a file from disk. The MIME type is sniffed from the bytes, then
    /// guessed from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = tokio::fs::read(path).await?;
        let metadata = tokio::fs::metadata(path).await?;
        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or_else(now_millis);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mime_type = detect_mime(path, &data);
        Ok(Self::new(name, mime_type, last_modified, data))
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// At most `max_bytes` from the start of the file
    pub fn head(&self, max_bytes: usize) -> &[u8] {
        &self.data[..self.data.len().min(max_bytes)]
    }

    /// True when both handles point at the same allocation
    pub fn shares_data_with(&self, other: &FileContent) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// MIME type from magic bytes, falling back to the file extension. Empty when neither is known.
pub fn detect_mime(path: &Path, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        return kind.mime_type().to_string();
    }
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(mime_from_extension)
        .unwrap_or_default()
        .to_string()
}

/// Best-effort MIME type for common extensions
pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "js" => "application/javascript",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => return None,
    };
    Some(mime)
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ─────────────────────────────────────────────────────────────────────────────
// CLIPBOARD ITEM
// ─────────────────────────────────────────────────────────────────────────────

/// One captured artifact
#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardItem {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub display_type: String,
    pub file_name: String,
    pub file_last_modified: i64,
    /// Capture time in epoch milliseconds
    pub captured_at: i64,
    /// Local binary handle, absent for remote-only items
    pub content: Option<FileContent>,
    pub snippet: Option<String>,
    pub preview_kind: Option<PreviewKind>,
    pub preview_icon: Option<PreviewIcon>,
    /// Local `blob:` URL or the remote URL once an upload succeeded
    pub preview_url: Option<String>,
    pub preview_prepared: bool,
    pub remote_path: Option<String>,
    pub remote_url: Option<String>,
}

impl ClipboardItem {
    /// Build a new item from a dropped file
    pub fn from_captured(content: FileContent) -> Self {
        let now = now_millis();
        let display_type = compute_display_type(&content.name, &content.mime_type);
        let name = if content.name.is_empty() {
            UNKNOWN_DISPLAY_TYPE.to_string()
        } else {
            content.name.clone()
        };
        let file_name = if content.name.is_empty() {
            "file".to_string()
        } else {
            content.name.clone()
        };
        let file_last_modified = if content.last_modified > 0 {
            content.last_modified
        } else {
            now
        };

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            size: content.len(),
            mime_type: content.mime_type.clone(),
            display_type,
            file_name,
            file_last_modified,
            captured_at: now,
            content: Some(content),
            snippet: None,
            preview_kind: None,
            preview_icon: None,
            preview_url: None,
            preview_prepared: false,
            remote_path: None,
            remote_url: None,
        }
    }

    /// Whether `preview_url` points at a local `blob:` reference that must be revoked
    pub fn has_local_preview(&self) -> bool {
        match (&self.preview_url, &self.remote_url) {
            (Some(url), Some(remote)) => url != remote,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// Flatten into a storable record
    pub fn to_record(&self) -> ItemRecord {
        let display_type = if self.display_type.is_empty() {
            if self.mime_type.is_empty() {
                UNKNOWN_DISPLAY_TYPE.to_string()
            } else {
                self.mime_type.clone()
            }
        } else {
            self.display_type.clone()
        };

        ItemRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            size: self.size,
            mime_type: self.mime_type.clone(),
            display_type,
            snippet: self.snippet.clone().unwrap_or_default(),
            preview_kind: self.preview_kind.map(|k| k.as_str().to_string()).unwrap_or_default(),
            preview_icon: self.preview_icon.map(|i| i.as_str().to_string()).unwrap_or_default(),
            captured_at: self.captured_at,
            file_name: self.file_name.clone(),
            file_last_modified: self.file_last_modified,
            remote_path: self.remote_path.clone(),
            remote_url: self.remote_url.clone(),
            file_blob: self.content.as_ref().map(|c| c.bytes().to_vec()),
        }
    }

    /// Rebuild an item from a stored record
    pub fn from_record(record: ItemRecord) -> Self {
        let now = now_millis();
        let display_type = if !record.display_type.is_empty() {
            record.display_type
        } else if !record.mime_type.is_empty() {
            record.mime_type.clone()
        } else {
            UNKNOWN_DISPLAY_TYPE.to_string()
        };
        let file_name = if record.file_name.is_empty() {
            record.name.clone()
        } else {
            record.file_name
        };
        let file_last_modified = if record.file_last_modified > 0 {
            record.file_last_modified
        } else {
            now
        };
        let captured_at = if record.captured_at > 0 { record.captured_at } else { now };

        let content = record.file_blob.map(|blob| {
            FileContent::new(file_name.clone(), record.mime_type.clone(), file_last_modified, blob)
        });

        let mut item = Self {
            id: record.id,
            name: record.name,
            size: record.size,
            mime_type: record.mime_type,
            display_type,
            file_name,
            file_last_modified,
            captured_at,
            content,
            snippet: Some(record.snippet).filter(|s| !s.is_empty()),
            preview_kind: PreviewKind::from_stored(&record.preview_kind),
            preview_icon: PreviewIcon::from_stored(&record.preview_icon),
            preview_url: None,
            preview_prepared: false,
            remote_path: None,
            remote_url: None,
        };

        if let Some(remote_url) = record.remote_url {
            item.preview_url = Some(remote_url.clone());
            item.remote_url = Some(remote_url);
            item.remote_path = record.remote_path;
            item.preview_prepared = true;
            item.preview_kind = item.preview_kind.or(Some(PreviewKind::Image));
        }

        item
    }
}

/// Label shown in the details line: MIME type, else uppercased extension, else "File"
pub fn compute_display_type(name: &str, mime_type: &str) -> String {
    if !mime_type.is_empty() {
        return mime_type.to_string();
    }
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_uppercase(),
        _ => UNKNOWN_DISPLAY_TYPE.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// STORED RECORD
// ─────────────────────────────────────────────────────────────────────────────

/// Flattened item as written to the durable store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub display_type: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub preview_kind: String,
    #[serde(default)]
    pub preview_icon: String,
    #[serde(default)]
    pub captured_at: i64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_last_modified: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    #[serde(default, with = "blob_base64", skip_serializing_if = "Option::is_none")]
    pub file_blob: Option<Vec<u8>>,
}

/// JSON carries blobs as standard base64
mod blob_base64 {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(blob: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match blob {
            Some(bytes) => serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| {
                base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
    }
}
