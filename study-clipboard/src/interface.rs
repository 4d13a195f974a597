//! Study Clipboard shared interface types
//!
//! Enums and the error type used across the store, the preview pipeline and the
//! widget. Host pages and the CLI only need what is re-exported from here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ENUMS
// ═══════════════════════════════════════════════════════════════════════════════

/// How an item is previewed in the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewKind {
    Image,
    Icon,
}

impl PreviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewKind::Image => "image",
            PreviewKind::Icon => "icon",
        }
    }

    /// Parse the stored representation. Empty or unknown strings mean "not computed yet".
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            "image" => Some(PreviewKind::Image),
            "icon" => Some(PreviewKind::Icon),
            _ => None,
        }
    }
}

/// Icon shown for items without a visual preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewIcon {
    Note,
    Clapper,
    MusicNote,
    Page,
    Compressed,
    Chart,
    Slides,
    Sheet,
    GenericPage,
}

impl PreviewIcon {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewIcon::Note => "note",
            PreviewIcon::Clapper => "clapper",
            PreviewIcon::MusicNote => "music-note",
            PreviewIcon::Page => "page",
            PreviewIcon::Compressed => "compressed",
            PreviewIcon::Chart => "chart",
            PreviewIcon::Slides => "slides",
            PreviewIcon::Sheet => "sheet",
            PreviewIcon::GenericPage => "generic-page",
        }
    }

    pub fn from_stored(value: &str) -> Option<Self> {
        let icon = match value {
            "note" => PreviewIcon::Note,
            "clapper" => PreviewIcon::Clapper,
            "music-note" => PreviewIcon::MusicNote,
            "page" => PreviewIcon::Page,
            "compressed" => PreviewIcon::Compressed,
            "chart" => PreviewIcon::Chart,
            "slides" => PreviewIcon::Slides,
            "sheet" => PreviewIcon::Sheet,
            "generic-page" => PreviewIcon::GenericPage,
            _ => return None,
        };
        Some(icon)
    }

    /// Glyph rendered in the preview region
    pub fn glyph(&self) -> &'static str {
        match self {
            PreviewIcon::Note => "📝",
            PreviewIcon::Clapper => "🎬",
            PreviewIcon::MusicNote => "🎵",
            PreviewIcon::Page => "📕",
            PreviewIcon::Compressed => "🗜️",
            PreviewIcon::Chart => "📊",
            PreviewIcon::Slides => "📽️",
            PreviewIcon::Sheet => "📃",
            PreviewIcon::GenericPage => "📄",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Error type for the fallible public surface (config loading, CLI, uploads)
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("Upload error: {0}")]
    Upload(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Durable store unavailable")]
    Unavailable,
}

impl From<crate::upload::UploadError> for ClipboardError {
    fn from(e: crate::upload::UploadError) -> Self {
        ClipboardError::Upload(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_stored_roundtrip() {
        for icon in [
            PreviewIcon::Note,
            PreviewIcon::Clapper,
            PreviewIcon::MusicNote,
            PreviewIcon::Page,
            PreviewIcon::Compressed,
            PreviewIcon::Chart,
            PreviewIcon::Slides,
            PreviewIcon::Sheet,
            PreviewIcon::GenericPage,
        ] {
            assert_eq!(PreviewIcon::from_stored(icon.as_str()), Some(icon));
        }
        assert_eq!(PreviewIcon::from_stored(""), None);
    }

    #[test]
    fn test_upload_error_converts() {
        let err: ClipboardError = crate::upload::UploadError::Rejected("quota".into()).into();
        assert!(matches!(&err, ClipboardError::Upload(msg) if msg.contains("quota")));
    }

    #[test]
    fn test_preview_kind_unset_when_empty() {
        assert_eq!(PreviewKind::from_stored(""), None);
        assert_eq!(PreviewKind::from_stored("image"), Some(PreviewKind::Image));
    }
}
