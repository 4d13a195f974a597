//! Widget configuration
//!
//! Every field has a default, so hosts only override what they need, either in
//! code or from a JSON document.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::interface::ClipboardError;

pub const MAX_ITEMS_DEFAULT: usize = 32;
pub const CHANNEL_NAME: &str = "study-space-clipboard-channel";
pub const STORAGE_SYNC_KEY: &str = "study-space-clipboard-sync";
pub const PERSIST_DEBOUNCE_MS: u64 = 220;
pub const HOVER_CLOSE_DELAY_MS: u64 = 240;
pub const CAPTURE_ANIMATION_MS: u64 = 620;

/// Identifiers of the host anchors the widget attaches to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnchorIds {
    pub root: String,
    pub capsule: String,
    pub panel: String,
    pub list: String,
    pub count: String,
    pub empty: String,
}

impl Default for AnchorIds {
    fn default() -> Self {
        Self {
            root: "homeClipboard".to_string(),
            capsule: "homeClipboardCapsule".to_string(),
            panel: "homeClipboardPanel".to_string(),
            list: "homeClipboardList".to_string(),
            count: "homeClipboardCount".to_string(),
            empty: "homeClipboardEmpty".to_string(),
        }
    }
}

impl AnchorIds {
    /// Anchors without which the widget cannot be built
    pub fn required(&self) -> [&str; 4] {
        [
            self.root.as_str(),
            self.capsule.as_str(),
            self.panel.as_str(),
            self.list.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetConfig {
    pub anchors: AnchorIds,
    pub max_items: usize,
    pub channel_name: String,
    pub storage_sync_key: String,
    pub persist_debounce_ms: u64,
    pub hover_close_delay_ms: u64,
    pub capture_animation_ms: u64,
    pub reduced_motion: bool,
    /// Fixed instance id; a random one is generated when absent
    pub instance_id: Option<String>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            anchors: AnchorIds::default(),
            max_items: MAX_ITEMS_DEFAULT,
            channel_name: CHANNEL_NAME.to_string(),
            storage_sync_key: STORAGE_SYNC_KEY.to_string(),
            persist_debounce_ms: PERSIST_DEBOUNCE_MS,
            hover_close_delay_ms: HOVER_CLOSE_DELAY_MS,
            capture_animation_ms: CAPTURE_ANIMATION_MS,
            reduced_motion: false,
            instance_id: None,
        }
    }
}

impl WidgetConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ClipboardError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClipboardError> {
        if self.max_items == 0 {
            return Err(ClipboardError::InvalidInput("maxItems must be at least 1".to_string()));
        }
        if self.anchors.required().iter().any(|id| id.is_empty()) {
            return Err(ClipboardError::InvalidInput("anchor ids must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    pub fn with_reduced_motion(mut self, reduced_motion: bool) -> Self {
        self.reduced_motion = reduced_motion;
        self
    }

    pub fn with_persist_debounce(mut self, delay: Duration) -> Self {
        self.persist_debounce_ms = delay.as_millis() as u64;
        self
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn hover_close_delay(&self) -> Duration {
        Duration::from_millis(self.hover_close_delay_ms)
    }

    pub fn capture_animation(&self) -> Duration {
        Duration::from_millis(self.capture_animation_ms)
    }
}
