//! One editing session.
//!
//! [`EditorState`] is the context object handed to the UI layer: it owns the
//! scene, the undo history, the tools and the clipboard, and turns
//! toolbar/keyboard/pointer input into calls on them. Create one per open
//! document; nothing here is global.

use scenekit_core::{AppEvent, EventBus, Point, SceneError, SelectionEvent};
use std::sync::Arc;

use crate::commands::{
    CreateElement, DeleteElements, DuplicateElements, SceneCommand, UpdateElement,
};
use crate::editor_settings::EditorSettings;
use crate::history::History;
use crate::model::{Element, ElementId, ElementKind, ElementPatch, Geometry};
use crate::scene_store::{hit_test, Scene, SceneStore};
use crate::tools::{HandleKind, PointerEvent, ToolContext, ToolId, ToolManager};

/// Editor session state.
#[derive(Debug)]
pub struct EditorState {
    scene: Scene,
    history: History,
    tools: ToolManager,
    settings: EditorSettings,
    bus: Arc<EventBus>,
    clipboard: Vec<Element>,
}

impl EditorState {
    pub fn new(settings: EditorSettings) -> Self {
        Self::with_event_bus(settings, Arc::new(EventBus::new()))
    }

    /// Session publishing history, tool and selection events on `bus`.
    pub fn with_event_bus(settings: EditorSettings, bus: Arc<EventBus>) -> Self {
        Self {
            scene: Scene::new(),
            history: History::with_event_bus(settings.max_undo_depth, bus.clone()),
            tools: ToolManager::new().with_event_bus(bus.clone()),
            settings,
            bus,
            clipboard: Vec::new(),
        }
    }

    /// Start from an existing scene (for example one loaded from disk).
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self.scene.clear_selection();
        self.history.clear();
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct access for hosts that need to patch non-undoable runtime
    /// fields such as resolved asset URLs.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn selection(&self) -> &[ElementId] {
        self.scene.selection()
    }

    pub fn active_tool(&self) -> ToolId {
        self.tools.active_id()
    }

    /// Topmost element under `point`, for hosts without their own hit testing.
    pub fn hit_test(&self, point: Point) -> Option<ElementId> {
        hit_test(&self.scene, point)
    }

    /// Frame to draw around the selection, recomputed from live geometry.
    pub fn selection_bounds(&self) -> Option<Geometry> {
        ToolManager::selection_bounds(&self.scene)
    }

    pub fn set_tool(&mut self, id: ToolId) -> bool {
        self.tracking_selection(|tools, ctx| tools.set_tool(ctx, id))
    }

    pub fn set_tool_by_name(&mut self, name: &str) -> bool {
        self.tracking_selection(|tools, ctx| tools.set_tool_by_name(ctx, name))
    }

    pub fn pointer_down(&mut self, event: PointerEvent) {
        self.tracking_selection(|tools, ctx| tools.pointer_down(ctx, &event));
    }

    pub fn pointer_move(&mut self, event: PointerEvent) {
        self.tracking_selection(|tools, ctx| tools.pointer_move(ctx, &event));
    }

    pub fn pointer_up(&mut self, event: PointerEvent) {
        self.tracking_selection(|tools, ctx| tools.pointer_up(ctx, &event));
    }

    pub fn pointer_cancel(&mut self) {
        self.tracking_selection(|tools, ctx| tools.pointer_cancel(ctx));
    }

    pub fn on_handle_pointer_down(&mut self, handle: HandleKind, event: PointerEvent) -> bool {
        self.tracking_selection(|tools, ctx| tools.on_handle_pointer_down(ctx, handle, &event))
    }

    pub fn on_handle_pointer_down_named(&mut self, handle: &str, event: PointerEvent) -> bool {
        self.tracking_selection(|tools, ctx| {
            tools.on_handle_pointer_down_named(ctx, handle, &event)
        })
    }

    /// Select (or toggle with `additive`) an element; `None` clears.
    pub fn select(&mut self, id: Option<ElementId>, additive: bool) {
        self.tracking_selection(|_, ctx| ctx.scene.select_element(id, additive));
    }

    /// Undo the last command. A gesture in progress is cancelled first.
    pub fn undo(&mut self) -> bool {
        self.tracking_selection(|tools, ctx| {
            tools.pointer_cancel(ctx);
            ctx.history.undo(&mut *ctx.scene)
        })
    }

    pub fn redo(&mut self) -> bool {
        self.tracking_selection(|tools, ctx| {
            tools.pointer_cancel(ctx);
            ctx.history.redo(&mut *ctx.scene)
        })
    }

    /// Add an element through the history, selecting it.
    pub fn create_element(
        &mut self,
        kind: ElementKind,
        x: f64,
        y: f64,
        overrides: ElementPatch,
    ) -> ElementId {
        let mut element = Element::new(kind, x, y);
        overrides.apply_to(&mut element);
        let id = element.id;
        self.run(CreateElement::new(element).into());
        id
    }

    /// Undoable property edit. Fails if the element does not exist; a patch
    /// that changes nothing records no command.
    pub fn update_element(&mut self, id: ElementId, patch: ElementPatch) -> Result<(), SceneError> {
        let element = self
            .scene
            .element(id)
            .ok_or_else(|| SceneError::ElementNotFound { id: id.to_string() })?;
        let command = UpdateElement::capture(element, patch.clone());
        if patch.capture_from(element) == patch {
            return Ok(());
        }
        self.run(command.into());
        Ok(())
    }

    /// Delete the selection. Returns false if nothing was selected.
    pub fn delete_selected(&mut self) -> bool {
        let ids = self.scene.selection().to_vec();
        if ids.is_empty() {
            return false;
        }
        self.run(DeleteElements::new(ids).into());
        true
    }

    /// Duplicate the selection with the configured offset, selecting the copies.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let command = DuplicateElements::new(
            self.scene.selected_elements(),
            self.settings.duplicate_offset,
        );
        let ids = command.ids();
        if !ids.is_empty() {
            self.run(command.into());
        }
        ids
    }

    /// Copy the selection to the clipboard. Returns the number copied.
    pub fn copy_selected(&mut self) -> usize {
        self.clipboard = self
            .scene
            .selected_elements()
            .into_iter()
            .cloned()
            .collect();
        self.clipboard.len()
    }

    /// Paste offset copies of the clipboard. Each paste cascades further
    /// from the previous one.
    pub fn paste(&mut self) -> Vec<ElementId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let command = DuplicateElements::new(&self.clipboard, self.settings.duplicate_offset);
        let ids = command.ids();
        self.clipboard = command.copies().to_vec();
        self.run(command.into());
        ids
    }

    fn run(&mut self, command: SceneCommand) {
        self.tracking_selection(|tools, ctx| {
            tools.pointer_cancel(ctx);
            ctx.history.execute(command, &mut *ctx.scene);
        });
    }

    /// Run `f` with split borrows and publish a selection event if the
    /// selection changed.
    fn tracking_selection<R>(
        &mut self,
        f: impl FnOnce(&mut ToolManager, &mut ToolContext<'_>) -> R,
    ) -> R {
        let before = self.scene.selection().to_vec();
        let result = {
            let mut ctx = ToolContext {
                scene: &mut self.scene,
                history: &mut self.history,
                settings: &self.settings,
            };
            f(&mut self.tools, &mut ctx)
        };
        if self.scene.selection() != before.as_slice() {
            let _ = self.bus.publish(AppEvent::Selection(SelectionEvent::Changed {
                count: self.scene.selection().len(),
            }));
        }
        result
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}
