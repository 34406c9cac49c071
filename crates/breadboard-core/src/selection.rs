//! Selection set and pointer gestures (part drag, canvas pan).

use crate::snap::snap_delta;
use kurbo::{Point, Vec2};

/// The set of selected part ids, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    /// Replace the selection with a single part.
    pub fn replace(&mut self, id: impl Into<String>) {
        self.ids.clear();
        self.ids.push(id.into());
    }

    /// Add the part if absent, remove it if present.
    pub fn toggle(&mut self, id: &str) {
        if let Some(index) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(index);
        } else {
            self.ids.push(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

/// State for moving the selected parts together.
#[derive(Debug, Clone)]
pub struct MultiMoveState {
    /// World position of the pointer when the drag started.
    pub start_point: Point,
    /// Current world position of the pointer.
    pub current_point: Point,
    /// Part that was grabbed; its position is the one snapped to the grid.
    pub anchor_id: String,
    /// Positions of every dragged part when the drag started.
    pub original_positions: Vec<(String, Point)>,
}

impl MultiMoveState {
    /// Create a new multi-move state.
    pub fn new(start_point: Point, anchor_id: String, original_positions: Vec<(String, Point)>) -> Self {
        Self {
            start_point,
            current_point: start_point,
            anchor_id,
            original_positions,
        }
    }

    /// Get the raw pointer delta.
    pub fn delta(&self) -> Vec2 {
        self.current_point - self.start_point
    }

    /// The delta actually applied to every part.
    ///
    /// We snap the grabbed part's target position, not the cursor, and move
    /// the rest by the same amount.
    pub fn applied_delta(&self, grid_size: f64, snap: bool) -> Vec2 {
        let anchor = self
            .original_positions
            .iter()
            .find(|(id, _)| *id == self.anchor_id)
            .or(self.original_positions.first())
            .map(|(_, position)| *position);
        match anchor {
            Some(anchor) => snap_delta(anchor, self.delta(), grid_size, snap),
            None => self.delta(),
        }
    }

    /// New position of every dragged part.
    pub fn positions(&self, grid_size: f64, snap: bool) -> Vec<(String, Point)> {
        let delta = self.applied_delta(grid_size, snap);
        self.original_positions
            .iter()
            .map(|(id, original)| (id.clone(), *original + delta))
            .collect()
    }
}

/// State for panning the canvas. Works in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanState {
    pub start_screen: Point,
    pub initial_pan: Vec2,
}

impl PanState {
    pub fn new(start_screen: Point, initial_pan: Vec2) -> Self {
        Self {
            start_screen,
            initial_pan,
        }
    }

    /// Pan offset for the given pointer screen position.
    pub fn pan_at(&self, screen: Point) -> Vec2 {
        self.initial_pan + (screen - self.start_screen)
    }
}

/// In-progress pointer gesture.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    DraggingParts(MultiMoveState),
    PanningCanvas(PanState),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::{GRID_SIZE, snap_to_grid};

    #[test]
    fn test_replace_and_toggle() {
        let mut selection = Selection::new();
        selection.replace("a");
        selection.toggle("b");
        assert_eq!(selection.ids(), ["a".to_string(), "b".to_string()]);
        selection.toggle("a");
        assert_eq!(selection.ids(), ["b".to_string()]);
        selection.replace("c");
        assert_eq!(selection.len(), 1);
        assert!(selection.contains("c"));
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn test_rigid_move_preserves_offsets() {
        let originals = vec![
            ("a".to_string(), Point::new(20.0, 40.0)),
            ("b".to_string(), Point::new(57.0, 13.0)),
            ("c".to_string(), Point::new(-31.5, 88.25)),
        ];
        let deltas = [
            Vec2::new(7.0, 3.0),
            Vec2::new(-13.3, 29.9),
            Vec2::new(101.0, -0.4),
        ];

        for snap in [false, true] {
            for delta in deltas {
                let mut state =
                    MultiMoveState::new(Point::new(25.0, 45.0), "a".into(), originals.clone());
                state.current_point = state.start_point + delta;
                let moved = state.positions(GRID_SIZE, snap);

                for (i, j) in [(0, 1), (0, 2), (1, 2)] {
                    let before = originals[i].1 - originals[j].1;
                    let after = moved[i].1 - moved[j].1;
                    assert!((before - after).hypot() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_anchor_lands_on_grid() {
        let originals = vec![
            ("a".to_string(), Point::new(20.0, 40.0)),
            ("b".to_string(), Point::new(57.0, 13.0)),
        ];
        let mut state = MultiMoveState::new(Point::ZERO, "a".into(), originals);
        state.current_point = Point::new(12.0, 7.0);
        let moved = state.positions(GRID_SIZE, true);
        assert_eq!(moved[0].1, Point::new(40.0, 40.0));
        assert_eq!(moved[0].1, snap_to_grid(moved[0].1, GRID_SIZE));
        assert_eq!(moved[1].1, Point::new(77.0, 13.0));
    }

    #[test]
    fn test_pan_is_screen_space() {
        let pan = PanState::new(Point::new(100.0, 100.0), Vec2::new(10.0, -5.0));
        assert_eq!(pan.pan_at(Point::new(130.0, 90.0)), Vec2::new(40.0, -15.0));
    }
}
