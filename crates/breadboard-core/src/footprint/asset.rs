//! Footprint asset loading and connector anchor extraction.

use super::{AssetResolver, ParseError};
use kurbo::{Point, Size};
use roxmltree::{Document, Node, ParsingOptions};
use std::collections::HashMap;

/// Size assumed when the asset declares neither dimensions nor a viewBox.
const FALLBACK_DIMENSION: f64 = 100.0;

/// Substring marking footprint elements that anchor connectors.
const CONNECTOR_MARKER: &str = "connector";

/// A parsed footprint asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Footprint {
    /// The asset markup, untouched, for the renderer.
    pub raw_markup: String,
    /// Declared width in footprint-local pixels.
    pub width: f64,
    /// Declared height in footprint-local pixels.
    pub height: f64,
    /// Connector anchors keyed by element id.
    pub connector_positions: HashMap<String, Point>,
}

impl Footprint {
    /// Footprint size.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Anchor of a connector element, if the asset has one with this id.
    pub fn connector_position(&self, element_id: &str) -> Option<Point> {
        self.connector_positions.get(element_id).copied()
    }

    /// Whether any connector anchors were found.
    ///
    /// An empty footprint means "no wire endpoints available", not an error.
    pub fn has_connectors(&self) -> bool {
        !self.connector_positions.is_empty()
    }
}

/// Fetch an asset through the resolver and parse it.
pub async fn load_footprint<R>(resolver: &R, asset_ref: &str) -> Result<Footprint, ParseError>
where
    R: AssetResolver + ?Sized,
{
    let markup = resolver.fetch(asset_ref).await?;
    let footprint = parse_footprint(markup)?;
    if !footprint.has_connectors() {
        log::debug!("Footprint {} has no connector anchors", asset_ref);
    }
    Ok(footprint)
}

/// Parse footprint markup into dimensions and connector anchors.
pub fn parse_footprint(markup: String) -> Result<Footprint, ParseError> {
    let (width, height, connector_positions) = {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(&markup, options)
            .map_err(|e| ParseError::MalformedDescriptor(format!("Invalid footprint markup: {}", e)))?;
        let root = doc.root_element();

        let view_box = root.attribute("viewBox").and_then(parse_view_box);
        let width = root
            .attribute("width")
            .and_then(parse_length)
            .or(view_box.map(|s| s.width))
            .unwrap_or(FALLBACK_DIMENSION);
        let height = root
            .attribute("height")
            .and_then(parse_length)
            .or(view_box.map(|s| s.height))
            .unwrap_or(FALLBACK_DIMENSION);

        let mut positions = HashMap::new();
        for node in root.descendants().filter(|n| n.is_element()) {
            let Some(id) = node.attribute("id") else {
                continue;
            };
            if !id.contains(CONNECTOR_MARKER) {
                continue;
            }
            if let Some(anchor) = anchor_of(&node) {
                positions.insert(id.to_string(), anchor);
            }
        }
        (width, height, positions)
    };

    Ok(Footprint {
        raw_markup: markup,
        width,
        height,
        connector_positions,
    })
}

/// Anchor point of a connector marker, by element kind.
fn anchor_of(node: &Node) -> Option<Point> {
    let num = |name: &str| node.attribute(name).and_then(parse_length).unwrap_or(0.0);
    match node.tag_name().name() {
        "circle" | "ellipse" => Some(Point::new(num("cx"), num("cy"))),
        "line" => Some(Point::new(num("x2"), num("y2"))),
        "rect" => Some(Point::new(
            num("x") + num("width") / 2.0,
            num("y") + num("height") / 2.0,
        )),
        _ => None,
    }
}

/// Parse the leading number of a length attribute, ignoring any unit suffix.
fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| {
            !(c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0))
        })
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the size component of a `viewBox` attribute.
fn parse_view_box(value: &str) -> Option<Size> {
    let numbers: Vec<f64> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    match numbers.as_slice() {
        [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some(Size::new(*w, *h)),
        _ => None,
    }
}
