//! Hit testing and render queries.

use super::Editor;
use crate::footprint::{Footprint, FootprintEntry};
use crate::scene::{ConnectorRef, PlacedPart, Rotation, Wire};
use crate::tools::ToolMode;
use kurbo::{CubicBez, Line, ParamCurveNearest, Point, Rect, Size, Vec2};
use std::sync::Arc;

/// Maximum horizontal control-point offset of a wire curve.
const MAX_WIRE_BEND: f64 = 50.0;

/// What lies under a screen point.
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    Connector {
        part_id: String,
        connector_id: String,
        world: Point,
    },
    Part(String),
    Wire(String),
    Background,
}

/// A wire ready to stroke, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct WirePath {
    pub wire_id: String,
    pub color: String,
    pub path: CubicBez,
}

/// A connector hit target shown in wire mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorMarker {
    pub part_id: String,
    pub connector_id: String,
    pub world: Point,
    /// Whether this is the first endpoint of the pending wire.
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// The footprint is being fetched.
    Loading,
    Ready,
    /// No footprint is available; a fixed-size box is drawn.
    Placeholder,
}

/// How to draw one placed part.
#[derive(Debug, Clone)]
pub struct PartFrame {
    pub part_id: String,
    pub title: String,
    pub bounds: Rect,
    pub rotation: Rotation,
    pub selected: bool,
    pub state: FrameState,
    pub footprint: Option<Arc<Footprint>>,
}

/// Bezier from one connector to another, bending horizontally.
pub fn wire_curve(from: Point, to: Point) -> CubicBez {
    let dx = to.x - from.x;
    let offset = (0.2 * (to - from).hypot()).min(MAX_WIRE_BEND);
    let bend = if dx > 0.0 { offset } else { -offset };
    CubicBez::new(
        from,
        from + Vec2::new(bend, 0.0),
        to - Vec2::new(bend, 0.0),
        to,
    )
}

impl Editor {
    fn footprint_for(&self, part: &PlacedPart) -> (FrameState, Option<Arc<Footprint>>) {
        let Some(definition) = self.catalog.get(&part.definition_id) else {
            return (FrameState::Placeholder, None);
        };
        if definition.footprint_ref.is_empty() {
            return (FrameState::Placeholder, None);
        }
        match self.footprints.entry(&definition.footprint_ref) {
            Some(FootprintEntry::Ready(footprint)) => (FrameState::Ready, Some(footprint.clone())),
            Some(FootprintEntry::Failed(_)) => (FrameState::Placeholder, None),
            Some(FootprintEntry::Loading) | None => (FrameState::Loading, None),
        }
    }

    fn part_size(&self, footprint: Option<&Footprint>) -> Size {
        footprint.map(Footprint::size).unwrap_or_else(|| {
            Size::new(self.config.placeholder_size, self.config.placeholder_size)
        })
    }

    /// World position of a connector, if its part, definition and location resolve.
    pub fn connector_position(&self, connector: &ConnectorRef) -> Option<Point> {
        let part = self.scene.part(&connector.part_id)?;
        let definition = self.catalog.get(&part.definition_id)?;
        let connector = definition.connector(&connector.connector_id)?;
        let footprint = self.footprints.get(&definition.footprint_ref);
        part.connector_world_position(connector, footprint.map(|f| &**f))
    }

    /// Every resolvable connector on a part, in definition order.
    fn part_connectors(&self, part: &PlacedPart) -> Vec<(String, Point)> {
        let Some(definition) = self.catalog.get(&part.definition_id) else {
            return Vec::new();
        };
        let footprint = self.footprints.get(&definition.footprint_ref);
        definition
            .connectors
            .iter()
            .filter_map(|c| {
                part.connector_world_position(c, footprint.map(|f| &**f))
                    .map(|world| (c.id.clone(), world))
            })
            .collect()
    }

    fn wire_curve_for(&self, wire: &Wire) -> Option<CubicBez> {
        let from = self.connector_position(&wire.from_ref())?;
        let to = self.connector_position(&wire.to_ref())?;
        Some(wire_curve(from, to))
    }

    /// Find what lies under a screen point.
    ///
    /// Connectors (wire mode only) win over parts, topmost part first, then wires.
    pub fn hit_test(&self, screen: Point) -> HitTarget {
        let world = self.viewport.screen_to_world(screen);
        let zoom = self.viewport.zoom;

        if self.mode.shows_connectors() {
            let radius = self.config.connector_hit_radius / zoom;
            for part in self.scene.parts.iter().rev() {
                for (connector_id, position) in self.part_connectors(part) {
                    if (position - world).hypot() <= radius {
                        return HitTarget::Connector {
                            part_id: part.id.clone(),
                            connector_id,
                            world: position,
                        };
                    }
                }
            }
        }

        for part in self.scene.parts.iter().rev() {
            let (_, footprint) = self.footprint_for(part);
            if part.contains(world, self.part_size(footprint.as_deref())) {
                return HitTarget::Part(part.id.clone());
            }
        }

        let tolerance = self.config.wire_hit_tolerance / zoom;
        for wire in self.scene.wires.iter().rev() {
            let Some(curve) = self.wire_curve_for(wire) else {
                continue;
            };
            if curve.nearest(world, 1e-3).distance_sq <= tolerance * tolerance {
                return HitTarget::Wire(wire.id.clone());
            }
        }

        HitTarget::Background
    }

    /// Curves for every wire whose endpoints both resolve.
    pub fn wire_paths(&self) -> Vec<WirePath> {
        self.scene
            .wires
            .iter()
            .filter_map(|wire| {
                self.wire_curve_for(wire).map(|path| WirePath {
                    wire_id: wire.id.clone(),
                    color: wire.color.clone(),
                    path,
                })
            })
            .collect()
    }

    /// The pending wire's preview segment.
    pub fn wire_preview(&self) -> Option<Line> {
        if self.mode != ToolMode::Wire {
            return None;
        }
        self.wire_tool.preview()
    }

    /// Connector markers, shown only in wire mode.
    pub fn connector_markers(&self) -> Vec<ConnectorMarker> {
        if !self.mode.shows_connectors() {
            return Vec::new();
        }
        let pending = self.wire_tool.pending();
        let mut markers = Vec::new();
        for part in &self.scene.parts {
            for (connector_id, world) in self.part_connectors(part) {
                let active = pending.is_some_and(|p| {
                    p.from.part_id == part.id && p.from.connector_id == connector_id
                });
                markers.push(ConnectorMarker {
                    part_id: part.id.clone(),
                    connector_id,
                    world,
                    active,
                });
            }
        }
        markers
    }

    /// Frames for every placed part, bottom to top.
    pub fn part_frames(&self) -> Vec<PartFrame> {
        self.scene
            .parts
            .iter()
            .map(|part| {
                let (state, footprint) = self.footprint_for(part);
                let title = self
                    .catalog
                    .get(&part.definition_id)
                    .map(|d| d.title.clone())
                    .unwrap_or_else(|| part.definition_id.clone());
                PartFrame {
                    part_id: part.id.clone(),
                    title,
                    bounds: part.bounds(self.part_size(footprint.as_deref())),
                    rotation: part.rotation,
                    selected: self.selection.contains(&part.id),
                    state,
                    footprint,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::ParamCurve;

    #[test]
    fn test_wire_curve_bends_toward_target() {
        let curve = wire_curve(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        assert_eq!(curve.p1, Point::new(20.0, 0.0));
        assert_eq!(curve.p2, Point::new(80.0, 0.0));

        let curve = wire_curve(Point::new(100.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(curve.p1, Point::new(80.0, 0.0));
        assert_eq!(curve.p2, Point::new(20.0, 0.0));
    }

    #[test]
    fn test_wire_curve_bend_is_capped() {
        let curve = wire_curve(Point::new(0.0, 0.0), Point::new(1000.0, 200.0));
        assert_eq!(curve.p1, Point::new(50.0, 0.0));
        assert_eq!(curve.p2, Point::new(950.0, 200.0));
        assert_eq!(curve.eval(1.0), Point::new(1000.0, 200.0));
    }
}
