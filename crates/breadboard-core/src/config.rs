//! Editor configuration.

use crate::camera::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::scene::DEFAULT_WIRE_COLOR;
use crate::snap::GRID_SIZE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Editor configuration. Missing keys take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid pitch in world units.
    pub grid_size: f64,
    /// Initial grid and snap toggle.
    pub show_grid: bool,
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Color of newly created wires.
    pub wire_color: String,
    /// Connector hit radius in screen pixels.
    pub connector_hit_radius: f64,
    /// Wire hit tolerance in screen pixels.
    pub wire_hit_tolerance: f64,
    /// Maximum pointer travel in screen pixels for a press to count as a click.
    pub click_tolerance: f64,
    /// Footprint size assumed while loading or after a failed load.
    pub placeholder_size: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            show_grid: true,
            zoom_step: ZOOM_STEP,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            wire_color: DEFAULT_WIRE_COLOR.to_string(),
            connector_hit_radius: 6.0,
            wire_hit_tolerance: 4.0,
            click_tolerance: 3.0,
            placeholder_size: 64.0,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config, then repair values that would break the editor.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn validated(mut self) -> Self {
        let defaults = Self::default();
        if !(self.zoom_step > 1.0) {
            log::warn!("zoom_step {} must exceed 1, using {}", self.zoom_step, defaults.zoom_step);
            self.zoom_step = defaults.zoom_step;
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            log::warn!(
                "Zoom range {}..{} is invalid, using {}..{}",
                self.min_zoom,
                self.max_zoom,
                defaults.min_zoom,
                defaults.max_zoom
            );
            self.min_zoom = defaults.min_zoom;
            self.max_zoom = defaults.max_zoom;
        }
        if !(self.grid_size > 0.0) {
            log::warn!("grid_size {} must be positive, using {}", self.grid_size, defaults.grid_size);
            self.grid_size = defaults.grid_size;
        }
        if !(self.placeholder_size > 0.0) {
            self.placeholder_size = defaults.placeholder_size;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r##"{"grid_size": 10, "wire_color": "#00ff00"}"##).unwrap();
        assert_eq!(config.grid_size, 10.0);
        assert_eq!(config.wire_color, "#00ff00");
        assert_eq!(config.zoom_step, 1.2);
        assert!(config.show_grid);
    }

    #[test]
    fn test_invalid_values_are_repaired() {
        let config =
            EditorConfig::from_json(r#"{"zoom_step": 0.5, "min_zoom": 4, "max_zoom": 2, "grid_size": 0}"#)
                .unwrap();
        let defaults = EditorConfig::default();
        assert_eq!(config.zoom_step, defaults.zoom_step);
        assert_eq!((config.min_zoom, config.max_zoom), (0.3, 3.0));
        assert_eq!(config.grid_size, 20.0);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{"show_grid": false}"#).unwrap();
        assert!(!EditorConfig::load(&path).unwrap().show_grid);
        assert!(matches!(
            EditorConfig::load(&dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
