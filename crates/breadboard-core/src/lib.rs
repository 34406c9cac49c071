//! Breadboard Core Library
//!
//! Platform-agnostic core of the Breadboard circuit editor: part catalog,
//! footprint parsing, scene model, canvas interaction and project persistence.

use std::future::Future;
use std::pin::Pin;

pub mod camera;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod footprint;
pub mod input;
pub mod notice;
pub mod project;
pub mod scene;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod tools;

/// Boxed future returned by the async storage and asset traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

pub use camera::Viewport;
pub use catalog::{CatalogError, FzpDirectory, PartCatalog, PartFilter, PartPatch, PartSource};
pub use config::{ConfigError, EditorConfig};
pub use editor::{Editor, HitTarget, PartFrame, WirePath};
pub use footprint::{
    AssetResolver, ConnectorDefinition, ConnectorKind, DirectoryAssets, Footprint, MemoryAssets,
    ParseError, PartDefinition,
};
pub use input::{EditorAction, Modifiers, MouseButton, PointerEvent, ShortcutRegistry};
pub use notice::{Notice, NoticeLevel};
pub use project::{CanvasSettings, NewProject, Project, ProjectUpdate};
pub use scene::{ConnectorRef, PlacedPart, Rotation, Scene, SceneError, Wire};
pub use selection::{Gesture, MultiMoveState, Selection};
pub use snap::{GRID_SIZE, snap_point, snap_to_grid};
pub use storage::{FileStore, MemoryStore, ProjectSession, ProjectStore, StoreError};
pub use tools::{ConnectionError, ToolMode, WireTool};
