//! Drag-and-drop capture
//!
//! Only drags that carry files are handled; anything else (text selections,
//! internal reordering) is left to the host.

use crate::models::{ClipboardItem, FileContent};

/// Type manifest entry announcing a file drag
pub const FILES_TYPE: &str = "Files";

/// What a drag event carries
#[derive(Debug, Clone, Default)]
pub struct DataTransfer {
    pub types: Vec<String>,
    pub files: Vec<FileContent>,
}

impl DataTransfer {
    /// Transfer of dropped files with the usual type manifest
    pub fn with_files(files: Vec<FileContent>) -> Self {
        Self {
            types: vec![FILES_TYPE.to_string()],
            files,
        }
    }

    /// Non-file transfer, e.g. a dragged list entry or text selection
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            files: Vec::new(),
        }
    }
}

/// A drag is a file drag if the manifest says so or files are attached
pub fn is_file_drag(transfer: &DataTransfer) -> bool {
    transfer.types.iter().any(|t| t == FILES_TYPE) || !transfer.files.is_empty()
}

/// How the host should treat a drag event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragResponse {
    /// Not a file drag; let it through untouched
    Ignored,
    /// Prevent the default action and show a copy cursor
    Accepted { drag_ready: bool },
}

/// Tracks nested enter/leave pairs so child elements don't flicker the ready state
#[derive(Debug, Default)]
pub struct DropZone {
    depth: usize,
}

impl DropZone {
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_ready(&self) -> bool {
        self.depth > 0
    }

    pub fn enter(&mut self, transfer: &DataTransfer) -> DragResponse {
        if !is_file_drag(transfer) {
            return DragResponse::Ignored;
        }
        self.depth += 1;
        DragResponse::Accepted { drag_ready: true }
    }

    pub fn over(&self, transfer: &DataTransfer) -> DragResponse {
        if !is_file_drag(transfer) {
            return DragResponse::Ignored;
        }
        DragResponse::Accepted { drag_ready: self.is_ready() }
    }

    pub fn leave(&mut self, transfer: &DataTransfer) -> DragResponse {
        if !is_file_drag(transfer) {
            return DragResponse::Ignored;
        }
        self.depth = self.depth.saturating_sub(1);
        DragResponse::Accepted { drag_ready: self.is_ready() }
    }

    /// Reset the depth and hand back the dropped files, or None for non-file drags
    pub fn drop_files(&mut self, transfer: DataTransfer) -> Option<Vec<FileContent>> {
        if !is_file_drag(&transfer) {
            return None;
        }
        self.depth = 0;
        Some(transfer.files)
    }
}

/// Prepend new items (newest first) and pop overflow beyond `max_items`.
///
/// Returns the evicted items, oldest capture last in the list order.
pub fn insert_captured(
    items: &mut Vec<ClipboardItem>,
    captured: Vec<ClipboardItem>,
    max_items: usize,
) -> Vec<ClipboardItem> {
    let mut evicted = Vec::new();
    for item in captured {
        items.insert(0, item);
        if items.len() > max_items {
            if let Some(removed) = items.pop() {
                evicted.push(removed);
            }
        }
    }
    evicted
}
