//! Grid snapping for placement and dragging.

use kurbo::{Point, Vec2};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Snap a point to the nearest grid intersection, each axis independently.
///
/// A non-positive grid size leaves the point untouched.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= 0.0 {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Snap a point if grid snapping is enabled.
pub fn snap_point(point: Point, grid_size: f64, enabled: bool) -> Point {
    if enabled {
        snap_to_grid(point, grid_size)
    } else {
        point
    }
}

/// Correct a drag delta so that `anchor + delta` lands on the grid.
///
/// Applying the returned delta to every dragged item keeps their relative
/// offsets intact while the anchor item ends up grid-aligned.
pub fn snap_delta(anchor: Point, delta: Vec2, grid_size: f64, enabled: bool) -> Vec2 {
    if !enabled {
        return delta;
    }
    snap_to_grid(anchor + delta, grid_size) - anchor
}
