//! Panel open/close state machine

use crate::config::AnchorIds;
use crate::render::bool_attr;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

impl PanelState {
    pub fn is_open(&self) -> bool {
        matches!(self, PanelState::Open)
    }
}

/// Keys the widget reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other,
}

impl Key {
    /// Map a host key name (`KeyboardEvent.key` style) to a [`Key`]
    pub fn from_name(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelInput {
    /// Double activation of the capsule
    CapsuleDoubleClick,
    CapsuleKey(Key),
    DocumentKey(Key),
    /// Click whose target is outside the widget root
    OutsideClick,
    /// Files were captured by a drop
    Captured,
    /// Hover-intent delay ran out after the pointer left
    HoverCloseElapsed { root_hovered: bool },
    Open,
    Close,
}

#[derive(Debug, Default)]
pub struct Panel {
    state: PanelState,
}

impl Panel {
    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Apply an input. Returns the new state when it changed.
    pub fn apply(&mut self, input: PanelInput) -> Option<PanelState> {
        let open = self.state.is_open();
        let next = match input {
            PanelInput::CapsuleDoubleClick => toggle(self.state),
            PanelInput::CapsuleKey(Key::Enter | Key::Space) => toggle(self.state),
            PanelInput::CapsuleKey(Key::Escape) | PanelInput::DocumentKey(Key::Escape) if open => {
                PanelState::Closed
            }
            PanelInput::OutsideClick if open => PanelState::Closed,
            PanelInput::HoverCloseElapsed { root_hovered: false } if open => PanelState::Closed,
            PanelInput::Captured | PanelInput::Close => PanelState::Closed,
            PanelInput::Open => PanelState::Open,
            _ => self.state,
        };

        if next == self.state {
            return None;
        }
        self.state = next;
        Some(next)
    }
}

fn toggle(state: PanelState) -> PanelState {
    match state {
        PanelState::Open => PanelState::Closed,
        PanelState::Closed => PanelState::Open,
    }
}

/// Mirror the state onto the surface: root class, aria attributes, scroll reset on close
pub fn mirror_state(surface: &dyn Surface, anchors: &AnchorIds, state: PanelState) {
    let open = state.is_open();
    surface.toggle_class(&anchors.root, "open", open);
    surface.set_attribute(&anchors.capsule, "aria-expanded", bool_attr(open));
    surface.set_attribute(&anchors.panel, "aria-hidden", bool_attr(!open));
    if !open {
        surface.reset_scroll(&anchors.panel);
    }
}
