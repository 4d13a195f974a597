//! Rendering: projects the item list onto display entries
//!
//! Every update rebuilds the whole list; there is no incremental diffing.

use serde::Serialize;

use crate::config::AnchorIds;
use crate::interface::PreviewKind;
use crate::models::{ClipboardItem, FileContent, UNKNOWN_DISPLAY_TYPE};
use crate::preview::fallback_icon;
use crate::surface::Surface;

/// Custom data type carrying the structured drag payload
pub const DRAG_DATA_TYPE: &str = "application/x-study-clipboard";

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable size with base-1024 units
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut index = 0;
    while value >= 1024.0 && index < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }
    if value.fract() == 0.0 {
        format!("{:.0} {}", value, SIZE_UNITS[index])
    } else {
        format!("{:.1} {}", value, SIZE_UNITS[index])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewView {
    Image { url: String, alt: String },
    Icon { glyph: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub item_id: String,
    pub draggable: bool,
    pub preview: PreviewView,
    pub title: String,
    pub snippet: Option<String>,
    /// `"{display type} · {size}"`
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListView {
    pub entries: Vec<RenderedEntry>,
}

impl ListView {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn has_items(&self) -> bool {
        !self.entries.is_empty()
    }
}

pub fn render_entry(item: &ClipboardItem) -> RenderedEntry {
    let preview = match (&item.preview_kind, &item.preview_url) {
        (Some(PreviewKind::Image), Some(url)) => PreviewView::Image {
            url: url.clone(),
            alt: item.name.clone(),
        },
        _ => PreviewView::Icon {
            glyph: item
                .preview_icon
                .unwrap_or_else(|| fallback_icon(&item.mime_type))
                .glyph(),
        },
    };

    let display_type = if item.display_type.is_empty() {
        UNKNOWN_DISPLAY_TYPE
    } else {
        item.display_type.as_str()
    };

    RenderedEntry {
        item_id: item.id.clone(),
        draggable: true,
        preview,
        title: item.name.clone(),
        snippet: item.snippet.clone().filter(|s| !s.is_empty()),
        details: format!("{} · {}", display_type, format_bytes(item.size)),
    }
}

/// Project items, in their current order, onto a list view
pub fn render(items: &[ClipboardItem]) -> ListView {
    ListView {
        entries: items.iter().map(render_entry).collect(),
    }
}

/// Push a view to the surface: list children, count, and container state
pub fn apply_view(surface: &dyn Surface, anchors: &AnchorIds, view: &ListView) {
    let has_items = view.has_items();

    surface.set_text(&anchors.count, &view.count().to_string());
    surface.set_attribute(&anchors.count, "aria-hidden", bool_attr(!has_items));
    surface.toggle_class(&anchors.root, "has-items", has_items);
    surface.toggle_class(&anchors.root, "empty", !has_items);
    surface.set_attribute(&anchors.empty, "aria-hidden", bool_attr(has_items));
    surface.render_list(&anchors.list, view);
}

pub(crate) fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DRAG OUT
// ─────────────────────────────────────────────────────────────────────────────

/// Structured summary placed under [`DRAG_DATA_TYPE`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragSummary {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub display_type: String,
    pub mime: String,
}

/// Data exposed when an entry is dragged out of the list
#[derive(Debug, Clone, PartialEq)]
pub struct DragPayload {
    pub effect_allowed: &'static str,
    pub text_plain: String,
    /// (data type, JSON) pair, absent if the summary could not be encoded
    pub structured: Option<(&'static str, String)>,
    /// Raw file so the entry can be dropped into another application
    pub file: Option<FileContent>,
}

pub fn drag_payload(item: &ClipboardItem) -> DragPayload {
    let summary = DragSummary {
        name: item.name.clone(),
        size: item.size,
        display_type: if item.display_type.is_empty() {
            UNKNOWN_DISPLAY_TYPE.to_string()
        } else {
            item.display_type.clone()
        },
        mime: item.mime_type.clone(),
    };

    DragPayload {
        effect_allowed: "copy",
        text_plain: item.name.clone(),
        structured: serde_json::to_string(&summary).ok().map(|json| (DRAG_DATA_TYPE, json)),
        file: item.content.clone(),
    }
}
