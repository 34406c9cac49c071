//! Scene model: placed parts and the wires between them.

use crate::catalog::PartCatalog;
use crate::footprint::{ConnectorDefinition, Footprint};
use crate::tools::ConnectionError;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Color given to wires when none is configured.
pub const DEFAULT_WIRE_COLOR: &str = "#ff0000";

fn default_wire_color() -> String {
    DEFAULT_WIRE_COLOR.to_string()
}

/// Errors raised while reading scene data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("Rotation must be 0, 90, 180 or 270 degrees, got {0}")]
    InvalidRotation(i64),
}

/// Quarter-turn rotation of a placed part, clockwise on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Rotation in degrees.
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Advance by 90 degrees, wrapping 270 back to 0.
    pub fn rotated_cw(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// Rotate a local offset. Exact for quarter turns, no trigonometry.
    pub fn apply(self, v: Vec2) -> Vec2 {
        match self {
            Rotation::Deg0 => v,
            Rotation::Deg90 => Vec2::new(-v.y, v.x),
            Rotation::Deg180 => Vec2::new(-v.x, -v.y),
            Rotation::Deg270 => Vec2::new(v.y, -v.x),
        }
    }

    /// Undo [`Rotation::apply`].
    pub fn invert(self, v: Vec2) -> Vec2 {
        match self {
            Rotation::Deg0 => v,
            Rotation::Deg90 => Vec2::new(v.y, -v.x),
            Rotation::Deg180 => Vec2::new(-v.x, -v.y),
            Rotation::Deg270 => Vec2::new(-v.y, v.x),
        }
    }
}

impl TryFrom<i64> for Rotation {
    type Error = SceneError;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(SceneError::InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for i64 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// A part instance on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedPart {
    pub id: String,
    /// Catalog id of the definition. Weak: the definition may be missing.
    pub definition_id: String,
    /// Top-left corner in world coordinates.
    pub position: Point,
    #[serde(default)]
    pub rotation: Rotation,
    /// Per-instance property overrides.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl PlacedPart {
    /// Create a part with a fresh id.
    pub fn new(definition_id: impl Into<String>, position: Point) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            definition_id: definition_id.into(),
            position,
            rotation: Rotation::Deg0,
            properties: Map::new(),
        }
    }

    /// World position of a connector on this part.
    ///
    /// Local coordinates are rotated about the part's top-left corner.
    pub fn connector_world_position(
        &self,
        connector: &ConnectorDefinition,
        footprint: Option<&Footprint>,
    ) -> Option<Point> {
        connector
            .locate(footprint)
            .map(|local| self.position + self.rotation.apply(local.to_vec2()))
    }

    /// Axis-aligned world bounds of a footprint of `size` placed here.
    pub fn bounds(&self, size: Size) -> Rect {
        let corners = [
            Vec2::ZERO,
            Vec2::new(size.width, 0.0),
            Vec2::new(0.0, size.height),
            Vec2::new(size.width, size.height),
        ];
        let mut rect = Rect::from_points(self.position, self.position);
        for corner in corners {
            rect = rect.union_pt(self.position + self.rotation.apply(corner));
        }
        rect
    }

    /// Whether a world point lies on a footprint of `size` placed here.
    pub fn contains(&self, point: Point, size: Size) -> bool {
        let local = self.rotation.invert(point - self.position);
        Rect::from_origin_size(Point::ORIGIN, size).contains(local.to_point())
    }
}

/// One end of a wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectorRef {
    pub part_id: String,
    pub connector_id: String,
}

impl ConnectorRef {
    pub fn new(part_id: impl Into<String>, connector_id: impl Into<String>) -> Self {
        Self {
            part_id: part_id.into(),
            connector_id: connector_id.into(),
        }
    }
}

/// A connection between connectors on two different parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    pub id: String,
    pub from_part_id: String,
    pub from_connector_id: String,
    pub to_part_id: String,
    pub to_connector_id: String,
    #[serde(default = "default_wire_color")]
    pub color: String,
}

impl Wire {
    pub fn from_ref(&self) -> ConnectorRef {
        ConnectorRef::new(&self.from_part_id, &self.from_connector_id)
    }

    pub fn to_ref(&self) -> ConnectorRef {
        ConnectorRef::new(&self.to_part_id, &self.to_connector_id)
    }

    /// Whether either end is on the given part.
    pub fn touches(&self, part_id: &str) -> bool {
        self.from_part_id == part_id || self.to_part_id == part_id
    }
}

/// The placed parts and wires of one project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Parts in paint order, back to front.
    #[serde(default)]
    pub parts: Vec<PlacedPart>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new part and return its id.
    pub fn add_part(&mut self, definition_id: impl Into<String>, position: Point) -> String {
        let part = PlacedPart::new(definition_id, position);
        let id = part.id.clone();
        self.parts.push(part);
        id
    }

    pub fn part(&self, id: &str) -> Option<&PlacedPart> {
        self.parts.iter().find(|p| p.id == id)
    }

    pub fn part_mut(&mut self, id: &str) -> Option<&mut PlacedPart> {
        self.parts.iter_mut().find(|p| p.id == id)
    }

    pub fn wire(&self, id: &str) -> Option<&Wire> {
        self.wires.iter().find(|w| w.id == id)
    }

    /// Remove parts and every wire touching them.
    ///
    /// Returns the number of parts and wires removed.
    pub fn remove_parts(&mut self, ids: &[String]) -> (usize, usize) {
        let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let parts_before = self.parts.len();
        let wires_before = self.wires.len();

        self.parts.retain(|p| !ids.contains(p.id.as_str()));
        self.wires
            .retain(|w| !ids.contains(w.from_part_id.as_str()) && !ids.contains(w.to_part_id.as_str()));

        (
            parts_before - self.parts.len(),
            wires_before - self.wires.len(),
        )
    }

    /// Rotate parts by 90 degrees. Returns how many were rotated.
    pub fn rotate_parts(&mut self, ids: &[String]) -> usize {
        let mut rotated = 0;
        for part in self.parts.iter_mut().filter(|p| ids.contains(&p.id)) {
            part.rotation = part.rotation.rotated_cw();
            rotated += 1;
        }
        rotated
    }

    /// Check that an endpoint names a placed part and one of its connectors.
    ///
    /// A part whose definition is not in the catalog cannot take new wires.
    pub fn resolve_endpoint<'a>(
        &self,
        endpoint: &ConnectorRef,
        catalog: &'a PartCatalog,
    ) -> Result<&'a ConnectorDefinition, ConnectionError> {
        self.part(&endpoint.part_id)
            .and_then(|part| catalog.get(&part.definition_id))
            .and_then(|definition| definition.connector(&endpoint.connector_id))
            .ok_or_else(|| ConnectionError::UnresolvedEndpoint {
                part_id: endpoint.part_id.clone(),
                connector_id: endpoint.connector_id.clone(),
            })
    }

    /// Add a validated wire between two connectors.
    pub fn connect(
        &mut self,
        from: &ConnectorRef,
        to: &ConnectorRef,
        color: &str,
        catalog: &PartCatalog,
    ) -> Result<&Wire, ConnectionError> {
        if from.part_id == to.part_id {
            return Err(ConnectionError::SelfConnection(from.part_id.clone()));
        }
        self.resolve_endpoint(from, catalog)?;
        self.resolve_endpoint(to, catalog)?;

        let wire = Wire {
            id: Uuid::new_v4().to_string(),
            from_part_id: from.part_id.clone(),
            from_connector_id: from.connector_id.clone(),
            to_part_id: to.part_id.clone(),
            to_connector_id: to.connector_id.clone(),
            color: color.to_string(),
        };
        log::debug!("Connected {:?} to {:?}", from, to);
        self.wires.push(wire);
        Ok(&self.wires[self.wires.len() - 1])
    }

    pub fn remove_wire(&mut self, id: &str) -> Option<Wire> {
        let index = self.wires.iter().position(|w| w.id == id)?;
        Some(self.wires.remove(index))
    }

    /// Drop wires that cannot be drawn. Returns how many were dropped.
    ///
    /// A wire is dropped when it loops on one part, when an endpoint part is
    /// missing, or when the endpoint's definition is known but has no such
    /// connector. Parts whose definition is missing keep their wires.
    pub fn sanitize_wires(&mut self, catalog: &PartCatalog) -> usize {
        let before = self.wires.len();
        let parts = &self.parts;
        let resolves = |part_id: &str, connector_id: &str| -> bool {
            let Some(part) = parts.iter().find(|p| p.id == part_id) else {
                return false;
            };
            match catalog.get(&part.definition_id) {
                Some(definition) => definition.has_connector(connector_id),
                None => true,
            }
        };

        self.wires.retain(|wire| {
            let keep = wire.from_part_id != wire.to_part_id
                && resolves(&wire.from_part_id, &wire.from_connector_id)
                && resolves(&wire.to_part_id, &wire.to_connector_id);
            if !keep {
                log::warn!(
                    "Dropping dangling wire {} ({}:{} -> {}:{})",
                    wire.id,
                    wire.from_part_id,
                    wire.from_connector_id,
                    wire.to_part_id,
                    wire.to_connector_id
                );
            }
            keep
        });
        before - self.wires.len()
    }

    /// Serialize the scene to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize a scene from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wired_scene() -> (Scene, PartCatalog, String, String, String) {
        let catalog = PartCatalog::samples();
        let mut scene = Scene::new();
        let led = scene.add_part("led-red", Point::new(0.0, 0.0));
        let resistor = scene.add_part("resistor-330", Point::new(100.0, 0.0));
        let arduino = scene.add_part("arduino-uno", Point::new(0.0, 200.0));
        scene
            .connect(
                &ConnectorRef::new(&led, "connector0"),
                &ConnectorRef::new(&resistor, "connector1"),
                DEFAULT_WIRE_COLOR,
                &catalog,
            )
            .unwrap();
        scene
            .connect(
                &ConnectorRef::new(&resistor, "connector0"),
                &ConnectorRef::new(&arduino, "connector0"),
                DEFAULT_WIRE_COLOR,
                &catalog,
            )
            .unwrap();
        (scene, catalog, led, resistor, arduino)
    }

    #[test]
    fn test_rotation_cycle() {
        let mut rotation = Rotation::Deg0;
        let mut seen = Vec::new();
        for _ in 0..4 {
            rotation = rotation.rotated_cw();
            seen.push(rotation.degrees());
        }
        assert_eq!(seen, vec![90, 180, 270, 0]);
        assert_eq!(rotation, Rotation::Deg0);
    }

    #[test]
    fn test_rotation_apply_invert() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(Rotation::Deg90.apply(v), Vec2::new(-4.0, 3.0));
        for rotation in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg180, Rotation::Deg270] {
            assert_eq!(rotation.invert(rotation.apply(v)), v);
        }
    }

    #[test]
    fn test_rotation_serde() {
        assert_eq!(serde_json::to_string(&Rotation::Deg270).unwrap(), "270");
        assert_eq!(serde_json::from_str::<Rotation>("90").unwrap(), Rotation::Deg90);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn test_part_contains_rotated() {
        let mut part = PlacedPart::new("p", Point::new(100.0, 100.0));
        let size = Size::new(40.0, 20.0);
        assert!(part.contains(Point::new(130.0, 110.0), size));
        assert!(!part.contains(Point::new(90.0, 110.0), size));

        // Rotated 90 clockwise about the top-left, the part extends to the left.
        part.rotation = Rotation::Deg90;
        assert!(part.contains(Point::new(90.0, 130.0), size));
        assert!(!part.contains(Point::new(130.0, 110.0), size));
        assert_eq!(part.bounds(size), Rect::new(80.0, 100.0, 100.0, 140.0));
    }

    #[test]
    fn test_connector_world_position() {
        let mut connector = ConnectorDefinition::new(
            "c0",
            "pin",
            crate::footprint::ConnectorKind::Source,
        );
        connector.local_position = Some(Point::new(10.0, 0.0));
        let mut part = PlacedPart::new("p", Point::new(50.0, 50.0));
        assert_eq!(
            part.connector_world_position(&connector, None),
            Some(Point::new(60.0, 50.0))
        );
        part.rotation = Rotation::Deg90;
        assert_eq!(
            part.connector_world_position(&connector, None),
            Some(Point::new(50.0, 60.0))
        );
    }

    #[test]
    fn test_connect_rejects_self_and_unresolved() {
        let (mut scene, catalog, led, resistor, _) = wired_scene();
        let result = scene.connect(
            &ConnectorRef::new(&led, "connector0"),
            &ConnectorRef::new(&led, "connector1"),
            DEFAULT_WIRE_COLOR,
            &catalog,
        );
        assert!(matches!(result, Err(ConnectionError::SelfConnection(_))));

        let result = scene.connect(
            &ConnectorRef::new(&led, "connector0"),
            &ConnectorRef::new(&resistor, "connector9"),
            DEFAULT_WIRE_COLOR,
            &catalog,
        );
        assert!(matches!(result, Err(ConnectionError::UnresolvedEndpoint { .. })));
        assert_eq!(scene.wires.len(), 2);
        assert!(scene.wires.iter().all(|w| w.from_part_id != w.to_part_id));
    }

    #[test]
    fn test_remove_parts_cascades() {
        let (mut scene, _, _, resistor, _) = wired_scene();
        let (parts, wires) = scene.remove_parts(&[resistor.clone()]);
        assert_eq!((parts, wires), (1, 2));
        assert!(scene.wires.iter().all(|w| !w.touches(&resistor)));
        assert_eq!(scene.parts.len(), 2);
    }

    #[test]
    fn test_sanitize_wires() {
        let (mut scene, catalog, led, resistor, _) = wired_scene();
        scene.wires.push(Wire {
            id: "ghost".into(),
            from_part_id: led.clone(),
            from_connector_id: "connector0".into(),
            to_part_id: "missing-part".into(),
            to_connector_id: "connector0".into(),
            color: DEFAULT_WIRE_COLOR.into(),
        });
        scene.wires.push(Wire {
            id: "bad-connector".into(),
            from_part_id: led.clone(),
            from_connector_id: "connector7".into(),
            to_part_id: resistor.clone(),
            to_connector_id: "connector0".into(),
            color: DEFAULT_WIRE_COLOR.into(),
        });
        assert_eq!(scene.sanitize_wires(&catalog), 2);
        assert_eq!(scene.wires.len(), 2);

        // Unknown definitions keep their wires.
        scene.part_mut(&led).unwrap().definition_id = "retired-part".into();
        assert_eq!(scene.sanitize_wires(&catalog), 0);
    }

    #[test]
    fn test_json_round_trip() {
        let (mut scene, _, led, _, _) = wired_scene();
        scene.part_mut(&led).unwrap().rotation = Rotation::Deg180;
        scene
            .part_mut(&led)
            .unwrap()
            .properties
            .insert("label".into(), Value::String("D1".into()));

        let json = scene.to_json().unwrap();
        assert!(json.contains("\"definitionId\""));
        assert!(json.contains("\"fromConnectorId\""));
        assert_eq!(Scene::from_json(&json).unwrap(), scene);
    }

    #[test]
    fn test_wire_color_defaults() {
        let wire: Wire = serde_json::from_str(
            r#"{"id":"w","fromPartId":"a","fromConnectorId":"c0","toPartId":"b","toConnectorId":"c1"}"#,
        )
        .unwrap();
        assert_eq!(wire.color, DEFAULT_WIRE_COLOR);
    }
}
