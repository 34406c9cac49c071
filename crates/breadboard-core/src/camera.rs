//! Viewport module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level that corresponds to "100%" in the UI.
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Smallest zoom factor the viewport accepts.
pub const MIN_ZOOM: f64 = 0.3;
/// Largest zoom factor the viewport accepts.
pub const MAX_ZOOM: f64 = 3.0;
/// Multiplicative step applied by a single zoom-in/zoom-out action.
pub const ZOOM_STEP: f64 = 1.2;

/// Viewport manages the view transform for the canvas.
///
/// World coordinates map to screen coordinates as `screen = world * zoom + pan`.
/// Zoom actions keep the screen origin fixed; the pan offset is never
/// compensated when the zoom factor changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset in screen pixels.
    pub pan: Vec2,
    /// Current zoom factor.
    pub zoom: f64,
    /// Minimum allowed zoom factor.
    pub min_zoom: f64,
    /// Maximum allowed zoom factor.
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a viewport with custom zoom limits.
    ///
    /// An unusable range (non-positive, NaN, or min above max) falls back
    /// to [`MIN_ZOOM`]..[`MAX_ZOOM`].
    pub fn with_limits(min_zoom: f64, max_zoom: f64) -> Self {
        let mut viewport = Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        };
        (viewport.min_zoom, viewport.max_zoom) = viewport.limits();
        viewport.set_zoom(DEFAULT_ZOOM);
        viewport
    }

    /// The zoom range in effect. The fields are public, so they are checked here.
    pub fn limits(&self) -> (f64, f64) {
        let valid = self.min_zoom.is_finite()
            && self.max_zoom.is_finite()
            && self.min_zoom > 0.0
            && self.min_zoom <= self.max_zoom;
        if valid {
            (self.min_zoom, self.max_zoom)
        } else {
            (MIN_ZOOM, MAX_ZOOM)
        }
    }

    /// Get the affine transform for rendering (world -> screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (screen -> world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan the viewport by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom factor, clamped to the viewport limits. NaN is ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        let (min, max) = self.limits();
        self.zoom = zoom.clamp(min, max);
    }

    /// Multiply the zoom factor by `step`.
    pub fn zoom_in(&mut self, step: f64) {
        self.set_zoom(self.zoom * step);
    }

    /// Divide the zoom factor by `step`.
    pub fn zoom_out(&mut self, step: f64) {
        self.set_zoom(self.zoom / step);
    }

    /// Zoom as a whole percentage, for display.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Reset pan and zoom to their defaults.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.set_zoom(DEFAULT_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport() {
        let viewport = Viewport::new();
        assert_eq!(viewport.pan, Vec2::ZERO);
        assert!((viewport.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_pan() {
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(50.0, 100.0);
        let world = viewport.screen_to_world(Point::new(100.0, 200.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut viewport = Viewport::new();
        viewport.zoom = 2.0;
        viewport.pan = Vec2::new(10.0, 20.0);
        let world = viewport.screen_to_world(Point::new(110.0, 220.0));
        assert!((world.x - 50.0).abs() < 1e-10);
        assert!((world.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(30.0, -20.0);
        viewport.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let back = viewport.world_to_screen(viewport.screen_to_world(original));

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_two_zoom_steps() {
        let mut viewport = Viewport::new();
        viewport.set_zoom(1.0);
        viewport.zoom_in(ZOOM_STEP);
        viewport.zoom_in(ZOOM_STEP);
        assert!((viewport.zoom - 1.44).abs() < 1e-9);
        assert_eq!(viewport.zoom_percent(), 144);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut viewport = Viewport::new();
        for _ in 0..20 {
            viewport.zoom_in(ZOOM_STEP);
        }
        assert!((viewport.zoom - MAX_ZOOM).abs() < f64::EPSILON);

        for _ in 0..40 {
            viewport.zoom_out(ZOOM_STEP);
        }
        assert!((viewport.zoom - MIN_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_keeps_origin_fixed() {
        let mut viewport = Viewport::new();
        viewport.pan = Vec2::new(40.0, 40.0);
        viewport.zoom_in(ZOOM_STEP);
        assert_eq!(viewport.pan, Vec2::new(40.0, 40.0));
        let origin = viewport.world_to_screen(Point::ZERO);
        assert!((origin.x - 40.0).abs() < 1e-10);
    }

    #[test]
    fn test_inverted_limits_fall_back() {
        let mut viewport = Viewport::with_limits(4.0, 2.0);
        assert_eq!((viewport.min_zoom, viewport.max_zoom), (MIN_ZOOM, MAX_ZOOM));
        viewport.zoom_in(ZOOM_STEP);
        assert!((viewport.zoom - 1.2).abs() < 1e-9);

        // Limits written directly are checked when zooming.
        viewport.min_zoom = f64::NAN;
        viewport.max_zoom = 0.5;
        for _ in 0..20 {
            viewport.zoom_in(ZOOM_STEP);
        }
        assert_eq!(viewport.zoom, MAX_ZOOM);
        viewport.set_zoom(f64::NAN);
        assert_eq!(viewport.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_reset() {
        let mut viewport = Viewport::with_limits(1.5, 2.5);
        assert_eq!(viewport.zoom, 1.5);
        viewport.pan_by(Vec2::new(5.0, 5.0));
        viewport.zoom_in(ZOOM_STEP);
        viewport.reset();
        assert_eq!(viewport.pan, Vec2::ZERO);
        assert_eq!(viewport.zoom, 1.5);
    }

    #[test]
    fn test_pan() {
        let mut viewport = Viewport::new();
        viewport.pan_by(Vec2::new(10.0, 20.0));
        assert!((viewport.pan.x - 10.0).abs() < f64::EPSILON);
        assert!((viewport.pan.y - 20.0).abs() < f64::EPSILON);
    }
}
