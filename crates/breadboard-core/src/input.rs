//! Pointer and keyboard input, and the keyboard shortcut map.

use crate::tools::ToolMode;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether a click should toggle membership instead of replacing the selection.
    pub fn toggles_selection(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

/// Editor commands reachable from the keyboard or a toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorAction {
    DeleteSelection,
    RotateSelection,
    Cancel,
    ZoomIn,
    ZoomOut,
    ResetView,
    ToggleGrid,
    SetMode(ToolMode),
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub action: EditorAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, action: EditorAction, description: &'static str) -> Self {
        Self {
            key,
            action,
            description,
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete", EditorAction::DeleteSelection, "Delete selected parts"),
            Shortcut::new("Backspace", EditorAction::DeleteSelection, "Delete selected parts"),
            Shortcut::new("R", EditorAction::RotateSelection, "Rotate selected parts 90°"),
            Shortcut::new("Escape", EditorAction::Cancel, "Cancel pending wire"),
            Shortcut::new("+", EditorAction::ZoomIn, "Zoom in"),
            Shortcut::new("=", EditorAction::ZoomIn, "Zoom in"),
            Shortcut::new("-", EditorAction::ZoomOut, "Zoom out"),
            Shortcut::new("0", EditorAction::ResetView, "Reset zoom and pan"),
            Shortcut::new("G", EditorAction::ToggleGrid, "Toggle grid"),
            Shortcut::new("V", EditorAction::SetMode(ToolMode::Select), "Select tool"),
            Shortcut::new("H", EditorAction::SetMode(ToolMode::Pan), "Pan tool"),
            Shortcut::new("W", EditorAction::SetMode(ToolMode::Wire), "Wire tool"),
        ]
    }

    /// Look up the action bound to a key. Chorded keys are left to the host.
    pub fn action_for(key: &str, modifiers: Modifiers) -> Option<EditorAction> {
        if modifiers.ctrl || modifiers.meta || modifiers.alt {
            return None;
        }
        Self::all()
            .into_iter()
            .find(|s| s.key.eq_ignore_ascii_case(key))
            .map(|s| s.action)
    }
}
