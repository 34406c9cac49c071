//! Part definitions and their visual footprints.
//!
//! A part is described by an XML descriptor (title, properties, tags,
//! connectors) and a separate footprint asset (SVG markup) that holds the
//! pixel anchors of its connectors. The two are parsed independently:
//! descriptors feed the catalog, footprints are loaded lazily per placed part.

mod asset;
mod cache;
mod descriptor;
mod resolver;

pub use asset::{Footprint, load_footprint, parse_footprint};
pub use cache::{FootprintCache, FootprintEntry, FootprintRequest};
pub use descriptor::parse_descriptor;
pub use resolver::{AssetResolver, DEFAULT_ASSET_PREFIX, DirectoryAssets, MemoryAssets};

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised while parsing descriptors or loading footprints.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Descriptor has no module id")]
    MissingModuleId,
    #[error("Asset unavailable: {0}")]
    AssetUnavailable(String),
    #[error("Malformed descriptor: {0}")]
    MalformedDescriptor(String),
}

/// Electrical role of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    /// A "male" lead or pin.
    Source,
    /// A "female" socket.
    Sink,
    #[default]
    Bidirectional,
}

impl ConnectorKind {
    /// Map a descriptor `type` attribute to a connector kind.
    pub fn from_descriptor(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" | "source" => ConnectorKind::Source,
            "female" | "sink" => ConnectorKind::Sink,
            _ => ConnectorKind::Bidirectional,
        }
    }
}

/// A named terminal on a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorDefinition {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: ConnectorKind,
    #[serde(default)]
    pub description: String,
    /// Footprint element id of the connector's pin graphic.
    #[serde(default)]
    pub svg_id: String,
    /// Footprint element id of the connector's terminal point.
    #[serde(default)]
    pub terminal_id: String,
    /// Explicit position in footprint-local pixels, if known up front.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_position: Option<Point>,
}

impl ConnectorDefinition {
    /// Create a connector with no footprint hint.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ConnectorKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: String::new(),
            svg_id: String::new(),
            terminal_id: String::new(),
            local_position: None,
        }
    }

    /// Whether the descriptor told us where to find this connector in the footprint.
    pub fn has_view_hint(&self) -> bool {
        !self.svg_id.is_empty() || !self.terminal_id.is_empty()
    }

    /// Locate the connector in footprint-local pixel space.
    ///
    /// The terminal element wins over the pin element; an explicit
    /// `local_position` is used when the footprint has neither.
    pub fn locate(&self, footprint: Option<&Footprint>) -> Option<Point> {
        footprint
            .and_then(|fp| {
                [&self.terminal_id, &self.svg_id]
                    .into_iter()
                    .filter(|id| !id.is_empty())
                    .find_map(|id| fp.connector_position(id))
            })
            .or(self.local_position)
    }
}

/// An immutable catalog entry describing one kind of component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDefinition {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque reference to the footprint asset, resolved by an [`AssetResolver`].
    #[serde(default)]
    pub footprint_ref: String,
    #[serde(default)]
    pub connectors: Vec<ConnectorDefinition>,
}

impl PartDefinition {
    /// Property key used for faceted filtering.
    pub const FAMILY_KEY: &'static str = "family";

    /// Create an empty definition with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            author: String::new(),
            properties: BTreeMap::new(),
            tags: Vec::new(),
            footprint_ref: String::new(),
            connectors: Vec::new(),
        }
    }

    /// The part family, if set and non-empty.
    pub fn family(&self) -> Option<&str> {
        self.properties
            .get(Self::FAMILY_KEY)
            .map(|s| s.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Look up a connector by id.
    pub fn connector(&self, id: &str) -> Option<&ConnectorDefinition> {
        self.connectors.iter().find(|c| c.id == id)
    }

    /// Whether this definition declares a connector with the given id.
    pub fn has_connector(&self, id: &str) -> bool {
        self.connector(id).is_some()
    }
}
