//! The canvas editor: scene, viewport, tools and gestures driven by input events.
//!
//! Everything happens on the caller's thread in event order. Footprint loads
//! are handed out as [`FootprintRequest`]s so the host can perform them
//! without blocking pointer interaction, and committed scene changes are
//! handed out as [`ProjectUpdate`]s for the persistence session.

mod view;

pub use view::{ConnectorMarker, FrameState, HitTarget, PartFrame, WirePath, wire_curve};

use crate::camera::Viewport;
use crate::catalog::PartCatalog;
use crate::config::EditorConfig;
use crate::footprint::{
    AssetResolver, Footprint, FootprintCache, FootprintRequest, ParseError, load_footprint,
};
use crate::input::{EditorAction, Modifiers, MouseButton, PointerEvent, ShortcutRegistry};
use crate::notice::Notice;
use crate::project::{CanvasSettings, Project, ProjectUpdate};
use crate::scene::{ConnectorRef, Scene};
use crate::selection::{Gesture, MultiMoveState, PanState, Selection};
use crate::snap::snap_point;
use crate::tools::{ToolMode, WireClick, WireTool};
use kurbo::Point;

/// A pointer press that may turn into a click.
#[derive(Debug, Clone, Copy)]
struct Press {
    screen: Point,
    button: MouseButton,
    modifiers: Modifiers,
}

/// Interactive editor state for one open project.
pub struct Editor {
    scene: Scene,
    viewport: Viewport,
    mode: ToolMode,
    selection: Selection,
    gesture: Gesture,
    wire_tool: WireTool,
    config: EditorConfig,
    catalog: PartCatalog,
    footprints: FootprintCache,
    show_grid: bool,
    canvas_settings: CanvasSettings,
    press: Option<Press>,
    pending_update: Option<ProjectUpdate>,
    notices: Vec<Notice>,
}

impl Editor {
    /// Create an editor with an empty scene.
    pub fn new(config: EditorConfig, catalog: PartCatalog) -> Self {
        Self {
            scene: Scene::new(),
            viewport: Viewport::with_limits(config.min_zoom, config.max_zoom),
            mode: ToolMode::default(),
            selection: Selection::new(),
            gesture: Gesture::Idle,
            wire_tool: WireTool::new(),
            show_grid: config.show_grid,
            config,
            catalog,
            footprints: FootprintCache::new(),
            canvas_settings: CanvasSettings::default(),
            press: None,
            pending_update: None,
            notices: Vec::new(),
        }
    }

    /// Open a project. Wires that cannot resolve are dropped.
    pub fn from_project(project: &Project, config: EditorConfig, catalog: PartCatalog) -> Self {
        let mut editor = Self::new(config, catalog);
        editor.scene = project.scene();
        let dropped = editor.scene.sanitize_wires(&editor.catalog);
        if dropped > 0 {
            log::warn!("Dropped {} dangling wire(s) from project {}", dropped, project.id);
        }
        editor.canvas_settings = project.canvas_settings.clone();
        editor.canvas_settings.restore_viewport(&mut editor.viewport);
        if let Some(show_grid) = editor.canvas_settings.show_grid {
            editor.show_grid = show_grid;
        }
        editor
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn wire_tool(&self) -> &WireTool {
        &self.wire_tool
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PartCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut PartCatalog {
        &mut self.catalog
    }

    pub fn footprints(&self) -> &FootprintCache {
        &self.footprints
    }

    /// Whether the grid is shown and snapping is on.
    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    /// Switch tool mode. Leaving wire mode discards a pending wire.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if self.mode == ToolMode::Wire && mode != ToolMode::Wire {
            self.wire_tool.abort();
        }
        self.mode = mode;
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { position, button } => self.pointer_up(position, button),
        }
    }

    pub fn pointer_down(&mut self, screen: Point, button: MouseButton, modifiers: Modifiers) {
        if !self.gesture.is_idle() {
            return;
        }
        self.press = Some(Press {
            screen,
            button,
            modifiers,
        });

        if button == MouseButton::Middle || (self.mode == ToolMode::Pan && button == MouseButton::Left) {
            log::debug!("Pan started at {:?}", screen);
            self.gesture = Gesture::PanningCanvas(PanState::new(screen, self.viewport.pan));
            return;
        }

        if self.mode != ToolMode::Select || button != MouseButton::Left {
            return;
        }
        if let HitTarget::Part(part_id) = self.hit_test(screen) {
            if self.selection.contains(&part_id) {
                self.begin_drag(screen, part_id);
            }
        }
    }

    fn begin_drag(&mut self, screen: Point, anchor_id: String) {
        let originals: Vec<(String, Point)> = self
            .scene
            .parts
            .iter()
            .filter(|p| self.selection.contains(&p.id))
            .map(|p| (p.id.clone(), p.position))
            .collect();
        log::debug!("Dragging {} part(s)", originals.len());
        let start = self.viewport.screen_to_world(screen);
        self.gesture = Gesture::DraggingParts(MultiMoveState::new(start, anchor_id, originals));
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let world = self.viewport.screen_to_world(screen);
        match &mut self.gesture {
            Gesture::DraggingParts(state) => {
                state.current_point = world;
                let positions = state.positions(self.config.grid_size, self.show_grid);
                for (id, position) in positions {
                    if let Some(part) = self.scene.part_mut(&id) {
                        part.position = position;
                    }
                }
            }
            Gesture::PanningCanvas(pan) => {
                self.viewport.pan = pan.pan_at(screen);
            }
            Gesture::Idle => {}
        }
        self.wire_tool.track_pointer(world);
    }

    pub fn pointer_up(&mut self, screen: Point, button: MouseButton) {
        // A gesture ends only on the button that started it.
        if !self.gesture.is_idle() && self.press.as_ref().is_some_and(|p| p.button != button) {
            return;
        }
        let press = self.press.take();
        let gesture = std::mem::take(&mut self.gesture);

        if let Gesture::DraggingParts(state) = &gesture {
            let moved = state.original_positions.iter().any(|(id, original)| {
                self.scene.part(id).is_some_and(|p| p.position != *original)
            });
            if moved {
                log::debug!("Moved {} part(s)", state.original_positions.len());
                self.commit();
                return;
            }
        }

        let Some(press) = press else {
            return;
        };
        let travel = (screen - press.screen).hypot();
        if press.button == button && button == MouseButton::Left && travel <= self.config.click_tolerance {
            self.click(screen, press.modifiers);
        }
    }

    /// Handle a click at a screen point.
    fn click(&mut self, screen: Point, modifiers: Modifiers) {
        match self.hit_test(screen) {
            HitTarget::Connector {
                part_id,
                connector_id,
                world,
            } => self.click_connector(ConnectorRef::new(part_id, connector_id), world),
            HitTarget::Part(part_id) => {
                if modifiers.toggles_selection() {
                    self.selection.toggle(&part_id);
                } else {
                    self.selection.replace(part_id);
                }
            }
            HitTarget::Wire(wire_id) => {
                if self.scene.remove_wire(&wire_id).is_some() {
                    log::info!("Deleted wire {}", wire_id);
                    self.commit();
                }
            }
            HitTarget::Background => {
                self.selection.clear();
                self.wire_tool.abort();
            }
        }
    }

    fn click_connector(&mut self, connector: ConnectorRef, world: Point) {
        if self.mode != ToolMode::Wire {
            return;
        }
        let WireClick::Complete { from, to } = self.wire_tool.click_connector(connector, world) else {
            return;
        };
        match self
            .scene
            .connect(&from, &to, &self.config.wire_color, &self.catalog)
        {
            Ok(wire) => {
                log::info!("Created wire {}", wire.id);
                self.notices
                    .push(Notice::success("Wire Connected", "Parts connected successfully"));
                self.commit();
            }
            Err(e) => log::warn!("Wire rejected: {}", e),
        }
    }

    /// Place a part from the catalog at a screen point. Returns the new part id.
    pub fn place_part(&mut self, definition_id: &str, screen: Point) -> Option<String> {
        let Some(definition) = self.catalog.get(definition_id) else {
            log::warn!("Cannot place unknown part {}", definition_id);
            self.notices
                .push(Notice::error("Error", "Failed to add part to canvas"));
            return None;
        };
        let title = definition.title.clone();

        let world = self.viewport.screen_to_world(screen);
        let position = snap_point(world, self.config.grid_size, self.show_grid);
        let id = self.scene.add_part(definition_id, position);
        log::info!("Placed {} at ({}, {})", definition_id, position.x, position.y);

        self.selection.replace(id.clone());
        self.notices
            .push(Notice::success("Part Added", format!("{} added to canvas", title)));
        self.commit();
        Some(id)
    }

    /// Rotate every selected part by 90 degrees.
    pub fn rotate_selected(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let rotated = self.scene.rotate_parts(self.selection.ids());
        if rotated > 0 {
            self.commit();
        }
        rotated > 0
    }

    /// Delete every selected part and the wires touching them.
    pub fn delete_selected(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        let ids = self.selection.ids().to_vec();
        let (parts, wires) = self.scene.remove_parts(&ids);
        if ids.iter().any(|id| self.wire_tool.starts_on(id)) {
            self.wire_tool.abort();
        }
        self.selection.clear();
        log::info!("Deleted {} part(s) and {} wire(s)", parts, wires);
        self.notices.push(Notice::success(
            "Parts Deleted",
            format!("{} part(s) removed", parts),
        ));
        self.commit();
        true
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out(self.config.zoom_step);
    }

    /// Return to 100% zoom with no pan.
    pub fn reset_view(&mut self) {
        self.viewport.reset();
    }

    pub fn toggle_grid(&mut self) {
        self.show_grid = !self.show_grid;
    }

    /// Handle a key press. Returns whether a shortcut ran.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        match ShortcutRegistry::action_for(key, modifiers) {
            Some(action) => self.apply(action),
            None => false,
        }
    }

    /// Run an editor action. Returns whether it had any effect.
    pub fn apply(&mut self, action: EditorAction) -> bool {
        match action {
            EditorAction::DeleteSelection => self.delete_selected(),
            EditorAction::RotateSelection => self.rotate_selected(),
            // Drags cannot be aborted; only a pending wire is cancelled.
            EditorAction::Cancel => self.wire_tool.abort(),
            EditorAction::ZoomIn => {
                self.zoom_in();
                true
            }
            EditorAction::ZoomOut => {
                self.zoom_out();
                true
            }
            EditorAction::ResetView => {
                self.reset_view();
                true
            }
            EditorAction::ToggleGrid => {
                self.toggle_grid();
                true
            }
            EditorAction::SetMode(mode) => {
                self.set_mode(mode);
                true
            }
        }
    }

    /// Footprint loads the host should start. Each asset is requested once.
    pub fn footprint_requests(&mut self) -> Vec<FootprintRequest> {
        let mut requests = Vec::new();
        for part in &self.scene.parts {
            let Some(definition) = self.catalog.get(&part.definition_id) else {
                continue;
            };
            let asset_ref = &definition.footprint_ref;
            if asset_ref.is_empty() || !self.footprints.is_unrequested(asset_ref) {
                continue;
            }
            self.footprints.mark_loading(asset_ref);
            requests.push(FootprintRequest {
                part_id: part.id.clone(),
                asset_ref: asset_ref.clone(),
            });
        }
        requests
    }

    /// Store a finished footprint load.
    ///
    /// The result is discarded when no placed part uses the asset any more.
    pub fn complete_footprint(
        &mut self,
        request: &FootprintRequest,
        result: Result<Footprint, ParseError>,
    ) {
        let still_used = self.scene.parts.iter().any(|part| {
            self.catalog
                .get(&part.definition_id)
                .is_some_and(|d| d.footprint_ref == request.asset_ref)
        });
        if !still_used {
            log::warn!(
                "Discarding footprint {} for removed part {}",
                request.asset_ref,
                request.part_id
            );
            self.footprints.forget_loading(&request.asset_ref);
            return;
        }
        self.footprints.complete(&request.asset_ref, result);
    }

    /// Load every requested footprint through a resolver.
    pub async fn load_footprints<R>(&mut self, resolver: &R)
    where
        R: AssetResolver + ?Sized,
    {
        for request in self.footprint_requests() {
            let result = load_footprint(resolver, &request.asset_ref).await;
            self.complete_footprint(&request, result);
        }
    }

    /// Record the current scene as a committed change.
    fn commit(&mut self) {
        let update = ProjectUpdate::from_scene(&self.scene);
        self.queue(update);
    }

    fn queue(&mut self, update: ProjectUpdate) {
        match &mut self.pending_update {
            Some(pending) => pending.merge(update),
            None => self.pending_update = Some(update),
        }
    }

    /// Take the committed changes since the last call.
    pub fn take_update(&mut self) -> Option<ProjectUpdate> {
        self.pending_update.take()
    }

    /// Canvas settings as they would be persisted.
    pub fn canvas_settings(&self) -> &CanvasSettings {
        &self.canvas_settings
    }

    /// Write the viewport and grid toggle into the canvas settings and queue them.
    pub fn persist_canvas_settings(&mut self) {
        self.canvas_settings
            .store_viewport(&self.viewport, self.show_grid);
        let update = ProjectUpdate {
            canvas_settings: Some(self.canvas_settings.clone()),
            ..Default::default()
        };
        self.queue(update);
    }

    /// Take all notices emitted since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
