//! Two-click wire connection.

use crate::scene::ConnectorRef;
use kurbo::{Line, Point};
use thiserror::Error;

/// Errors raised when a wire cannot be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Connector {connector_id} on part {part_id} does not resolve")]
    UnresolvedEndpoint {
        part_id: String,
        connector_id: String,
    },
    #[error("Cannot connect part {0} to itself")]
    SelfConnection(String),
}

/// The first endpoint of a wire being created.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingWire {
    pub from: ConnectorRef,
    /// World position of the first connector when it was clicked.
    pub from_world: Point,
    /// Last known pointer position in world coordinates.
    pub pointer_world: Point,
}

/// Wire connection state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WireState {
    #[default]
    Idle,
    Pending(PendingWire),
}

/// Outcome of clicking a connector.
#[derive(Debug, Clone, PartialEq)]
pub enum WireClick {
    /// The first endpoint was captured.
    Started,
    /// The click was on the pending wire's own part and was ignored.
    SelfConnectionIgnored,
    /// Both endpoints are known; the caller creates the wire.
    Complete { from: ConnectorRef, to: ConnectorRef },
}

/// Drives the connect gesture. Holds only transient state, never scene data.
#[derive(Debug, Clone, Default)]
pub struct WireTool {
    state: WireState,
}

impl WireTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WireState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingWire> {
        match &self.state {
            WireState::Pending(pending) => Some(pending),
            WireState::Idle => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending().is_some()
    }

    /// Handle a click on a connector at `world`.
    pub fn click_connector(&mut self, connector: ConnectorRef, world: Point) -> WireClick {
        match &self.state {
            WireState::Idle => {
                log::debug!("Wire started at {:?}", connector);
                self.state = WireState::Pending(PendingWire {
                    from: connector,
                    from_world: world,
                    pointer_world: world,
                });
                WireClick::Started
            }
            WireState::Pending(pending) if pending.from.part_id == connector.part_id => {
                log::debug!("Ignoring self-connection on part {}", connector.part_id);
                WireClick::SelfConnectionIgnored
            }
            WireState::Pending(pending) => {
                let from = pending.from.clone();
                self.state = WireState::Idle;
                WireClick::Complete {
                    from,
                    to: connector,
                }
            }
        }
    }

    /// Discard the pending endpoint. Returns whether anything was pending.
    pub fn abort(&mut self) -> bool {
        let was_pending = self.is_pending();
        if was_pending {
            log::debug!("Wire aborted");
        }
        self.state = WireState::Idle;
        was_pending
    }

    /// Record the pointer position for the preview.
    pub fn track_pointer(&mut self, world: Point) {
        if let WireState::Pending(pending) = &mut self.state {
            pending.pointer_world = world;
        }
    }

    /// The dashed preview segment from the first endpoint to the pointer.
    pub fn preview(&self) -> Option<Line> {
        self.pending()
            .map(|pending| Line::new(pending.from_world, pending.pointer_world))
    }

    /// Whether the pending wire starts on the given part.
    pub fn starts_on(&self, part_id: &str) -> bool {
        self.pending().is_some_and(|p| p.from.part_id == part_id)
    }
}
