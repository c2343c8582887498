//! Tool registry and event dispatch.

use scenekit_core::{AppEvent, EventBus, ToolEvent};
use std::collections::HashMap;
use std::sync::Arc;

use super::{
    DrawTool, HandleKind, PointerEvent, PointerTool, SelectTool, Tool, ToolContext, ToolId,
    ToolOutcome,
};
use crate::model::{ElementKind, Geometry};
use crate::scene_store::SceneStore;
use crate::transform::bounding_box_of;

/// Owns every registered tool and routes pointer events to the active one.
///
/// Events are handled synchronously and never queued.
#[derive(Debug)]
pub struct ToolManager {
    tools: HashMap<ToolId, Tool>,
    active: ToolId,
    bus: Option<Arc<EventBus>>,
}

impl ToolManager {
    /// Manager with the select tool active and draw tools for rectangles,
    /// ellipses, triangles and text.
    pub fn new() -> Self {
        let mut manager = Self {
            tools: HashMap::new(),
            active: ToolId::Select,
            bus: None,
        };
        manager.register(Tool::Select(SelectTool::new()));
        for kind in [
            ElementKind::Rectangle,
            ElementKind::Ellipse,
            ElementKind::Triangle,
            ElementKind::Text,
        ] {
            manager.register(Tool::Draw(DrawTool::new(kind)));
        }
        manager
    }

    /// Publish tool changes on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Add or replace a tool.
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.id(), tool);
    }

    pub fn is_registered(&self, id: ToolId) -> bool {
        self.tools.contains_key(&id)
    }

    pub fn active_id(&self) -> ToolId {
        self.active
    }

    pub fn active(&self) -> Option<&Tool> {
        self.tools.get(&self.active)
    }

    /// The select tool, for reading marquee or mode state.
    pub fn select_tool(&self) -> Option<&SelectTool> {
        self.tools.get(&ToolId::Select).and_then(Tool::as_select)
    }

    pub fn is_busy(&self) -> bool {
        self.active().is_some_and(|tool| tool.is_busy())
    }

    /// Make `id` the active tool.
    ///
    /// Unknown tools and re-selecting the active tool are no-ops. Switching
    /// to anything but select clears the selection. Returns whether the
    /// active tool changed.
    pub fn set_tool(&mut self, ctx: &mut ToolContext<'_>, id: ToolId) -> bool {
        if !self.tools.contains_key(&id) {
            tracing::warn!("Tool {} is not registered", id);
            return false;
        }
        if id == self.active {
            return false;
        }

        let previous = self.active;
        if let Some(tool) = self.tools.get_mut(&previous) {
            tool.on_deactivate(ctx);
        }
        self.active = id;
        if let Some(tool) = self.tools.get_mut(&id) {
            tool.on_activate(ctx);
        }
        if id != ToolId::Select {
            ctx.scene.clear_selection();
        }

        tracing::info!("Tool changed: {} -> {}", previous, id);
        self.publish(ToolEvent::Changed {
            from: previous.to_string(),
            to: id.to_string(),
        });
        true
    }

    /// [`set_tool`](Self::set_tool) by name; unknown names are logged and ignored.
    pub fn set_tool_by_name(&mut self, ctx: &mut ToolContext<'_>, name: &str) -> bool {
        match name.parse::<ToolId>() {
            Ok(id) => self.set_tool(ctx, id),
            Err(err) => {
                tracing::warn!("{}", err);
                false
            }
        }
    }

    pub fn pointer_down(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) {
        tracing::trace!("pointer down at {}", event.position);
        let outcome = match self.tools.get_mut(&self.active) {
            Some(tool) => tool.on_pointer_down(ctx, event),
            None => ToolOutcome::Continue,
        };
        self.follow(ctx, outcome);
    }

    pub fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) {
        tracing::trace!("pointer move to {}", event.position);
        let outcome = match self.tools.get_mut(&self.active) {
            Some(tool) => tool.on_pointer_move(ctx, event),
            None => ToolOutcome::Continue,
        };
        self.follow(ctx, outcome);
    }

    pub fn pointer_up(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) {
        tracing::trace!("pointer up at {}", event.position);
        let outcome = match self.tools.get_mut(&self.active) {
            Some(tool) => tool.on_pointer_up(ctx, event),
            None => ToolOutcome::Continue,
        };
        self.follow(ctx, outcome);
    }

    /// Abandon the active tool's gesture, if any.
    pub fn pointer_cancel(&mut self, ctx: &mut ToolContext<'_>) {
        let active = self.active;
        if let Some(tool) = self.tools.get_mut(&active) {
            if tool.is_busy() {
                tool.on_pointer_cancel(ctx);
                self.publish(ToolEvent::GestureCancelled {
                    tool: active.to_string(),
                });
            }
        }
    }

    /// Entry point for the renderer when a frame handle is grabbed.
    ///
    /// Puts the select tool into its transforming state. Ignored (and
    /// logged) when another tool is active.
    pub fn on_handle_pointer_down(
        &mut self,
        ctx: &mut ToolContext<'_>,
        handle: HandleKind,
        event: &PointerEvent,
    ) -> bool {
        if self.active != ToolId::Select {
            tracing::warn!("Handle {} grabbed while {} is active", handle, self.active);
            return false;
        }
        match self
            .tools
            .get_mut(&ToolId::Select)
            .and_then(Tool::as_select_mut)
        {
            Some(select) => select.begin_transform(ctx, handle, event),
            None => false,
        }
    }

    /// Handle grab by handle id (`tl`, `t`, ..., `l`, `rotate`).
    pub fn on_handle_pointer_down_named(
        &mut self,
        ctx: &mut ToolContext<'_>,
        handle: &str,
        event: &PointerEvent,
    ) -> bool {
        match handle.parse::<HandleKind>() {
            Ok(kind) => self.on_handle_pointer_down(ctx, kind, event),
            Err(err) => {
                tracing::warn!("{}", err);
                false
            }
        }
    }

    /// Frame to draw around the current selection.
    pub fn selection_bounds(scene: &dyn SceneStore) -> Option<Geometry> {
        let geometries: Vec<Geometry> = scene
            .selected_elements()
            .into_iter()
            .map(|e| e.geometry)
            .collect();
        bounding_box_of(&geometries)
    }

    fn follow(&mut self, ctx: &mut ToolContext<'_>, outcome: ToolOutcome) {
        if let ToolOutcome::SwitchTo(id) = outcome {
            self.set_tool(ctx, id);
        }
    }

    fn publish(&self, event: ToolEvent) {
        if let Some(bus) = &self.bus {
            let _ = bus.publish(AppEvent::Tool(event));
        }
    }
}

impl Default for ToolManager {
    fn default() -> Self {
        Self::new()
    }
}
