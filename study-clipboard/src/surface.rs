//! Host page integration surface
//!
//! The widget never touches a concrete UI toolkit. It talks to a [`Surface`]
//! addressed by anchor ids; hosts implement it over their own element tree.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use parking_lot::Mutex;

use crate::render::ListView;

pub trait Surface: Send + Sync {
    /// Whether an anchor with this id exists
    fn has_anchor(&self, id: &str) -> bool;

    /// Replace the children of the list anchor with `view`'s entries
    fn render_list(&self, list_id: &str, view: &ListView);

    fn set_text(&self, id: &str, text: &str);

    fn set_attribute(&self, id: &str, name: &str, value: &str);

    fn toggle_class(&self, id: &str, class: &str, on: bool);

    fn reset_scroll(&self, id: &str);

    /// Set a CSS custom property, or remove it when `value` is None
    fn set_style_property(&self, id: &str, name: &str, value: Option<&str>);
}

/// Recorded state of one anchor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementState {
    pub text: String,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub scroll_resets: usize,
}

/// Surface that records everything applied to it
#[derive(Default)]
pub struct MemorySurface {
    anchors: HashSet<String>,
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    elements: HashMap<String, ElementState>,
    lists: HashMap<String, ListView>,
    renders: usize,
}

impl MemorySurface {
    pub fn with_anchors<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            anchors: ids.into_iter().map(Into::into).collect(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    pub fn element(&self, id: &str) -> ElementState {
        self.state.lock().elements.get(id).cloned().unwrap_or_default()
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.element(id).classes.contains(class)
    }

    pub fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.element(id).attributes.get(name).cloned()
    }

    pub fn list(&self, id: &str) -> Option<ListView> {
        self.state.lock().lists.get(id).cloned()
    }

    /// Number of full list rebuilds so far
    pub fn render_count(&self) -> usize {
        self.state.lock().renders
    }
}

impl Surface for MemorySurface {
    fn has_anchor(&self, id: &str) -> bool {
        self.anchors.contains(id)
    }

    fn render_list(&self, list_id: &str, view: &ListView) {
        let mut state = self.state.lock();
        state.lists.insert(list_id.to_string(), view.clone());
        state.renders += 1;
    }

    fn set_text(&self, id: &str, text: &str) {
        self.state.lock().elements.entry(id.to_string()).or_default().text = text.to_string();
    }

    fn set_attribute(&self, id: &str, name: &str, value: &str) {
        self.state
            .lock()
            .elements
            .entry(id.to_string())
            .or_default()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn toggle_class(&self, id: &str, class: &str, on: bool) {
        let mut state = self.state.lock();
        let classes = &mut state.elements.entry(id.to_string()).or_default().classes;
        if on {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn reset_scroll(&self, id: &str) {
        self.state.lock().elements.entry(id.to_string()).or_default().scroll_resets += 1;
    }

    fn set_style_property(&self, id: &str, name: &str, value: Option<&str>) {
        let mut state = self.state.lock();
        let style = &mut state.elements.entry(id.to_string()).or_default().style;
        match value {
            Some(v) => {
                style.insert(name.to_string(), v.to_string());
            }
            None => {
                style.remove(name);
            }
        }
    }
}
