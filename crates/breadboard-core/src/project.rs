//! Project documents: a scene plus metadata and canvas settings.

use crate::camera::Viewport;
use crate::scene::{PlacedPart, Scene, Wire};
use chrono::{DateTime, Utc};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Persisted canvas state. Unknown keys are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<Vec2>,
    #[serde(
        default,
        rename = "showGrid",
        skip_serializing_if = "Option::is_none"
    )]
    pub show_grid: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CanvasSettings {
    /// Write the viewport and grid toggle, leaving other keys alone.
    pub fn store_viewport(&mut self, viewport: &Viewport, show_grid: bool) {
        self.zoom = Some(viewport.zoom);
        self.pan = Some(viewport.pan);
        self.show_grid = Some(show_grid);
    }

    /// Apply stored values onto a viewport. Zoom is clamped to its limits.
    pub fn restore_viewport(&self, viewport: &mut Viewport) {
        if let Some(zoom) = self.zoom.filter(|z| z.is_finite()) {
            viewport.set_zoom(zoom);
        }
        if let Some(pan) = self.pan.filter(|p| p.is_finite()) {
            viewport.pan = pan;
        }
    }
}

/// A saved circuit design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parts: Vec<PlacedPart>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default)]
    pub canvas_settings: CanvasSettings,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a project from its initial fields with a fresh id and timestamps.
    pub fn create(new: NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: new.name,
            description: new.description,
            parts: new.parts,
            wires: new.wires,
            canvas_settings: new.canvas_settings,
            created_at: now,
            updated_at: now,
        }
    }

    /// The scene portion of the project.
    pub fn scene(&self) -> Scene {
        Scene {
            parts: self.parts.clone(),
            wires: self.wires.clone(),
        }
    }

    /// Apply a partial update and bump `updated_at`.
    pub fn apply(&mut self, update: ProjectUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(parts) = update.parts {
            self.parts = parts;
        }
        if let Some(wires) = update.wires {
            self.wires = wires;
        }
        if let Some(canvas_settings) = update.canvas_settings {
            self.canvas_settings = canvas_settings;
        }
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// A copy under a new id, named `"<name> (Copy)"` unless a name is given.
    pub fn duplicate(&self, new_name: Option<&str>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: new_name
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} (Copy)", self.name)),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Serialize for export.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize an exported document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Fields for creating a project; the store assigns id and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parts: Vec<PlacedPart>,
    #[serde(default)]
    pub wires: Vec<Wire>,
    #[serde(default)]
    pub canvas_settings: CanvasSettings,
}

impl NewProject {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Partial project update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<PlacedPart>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wires: Option<Vec<Wire>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_settings: Option<CanvasSettings>,
}

impl ProjectUpdate {
    /// An update carrying the whole scene.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            parts: Some(scene.parts.clone()),
            wires: Some(scene.wires.clone()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.parts.is_none()
            && self.wires.is_none()
            && self.canvas_settings.is_none()
    }

    /// Fold a later update into this one; fields set in `newer` win.
    pub fn merge(&mut self, newer: ProjectUpdate) {
        if newer.name.is_some() {
            self.name = newer.name;
        }
        if newer.description.is_some() {
            self.description = newer.description;
        }
        if newer.parts.is_some() {
            self.parts = newer.parts;
        }
        if newer.wires.is_some() {
            self.wires = newer.wires;
        }
        if newer.canvas_settings.is_some() {
            self.canvas_settings = newer.canvas_settings;
        }
    }
}
