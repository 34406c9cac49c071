//! Tool modes for the canvas.

mod wire;

pub use wire::{ConnectionError, PendingWire, WireClick, WireState, WireTool};

use serde::{Deserialize, Serialize};

/// Available tool modes. The mode gates which gestures are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Click to select, drag selected parts.
    #[default]
    Select,
    /// Drag to pan the canvas.
    Pan,
    /// Click connectors to create wires.
    Wire,
}

impl ToolMode {
    /// Display name of the mode.
    pub fn display_name(&self) -> &'static str {
        match self {
            ToolMode::Select => "Select",
            ToolMode::Pan => "Pan",
            ToolMode::Wire => "Wire",
        }
    }

    /// Whether connectors are interactive in this mode.
    pub fn shows_connectors(&self) -> bool {
        matches!(self, ToolMode::Wire)
    }
}
