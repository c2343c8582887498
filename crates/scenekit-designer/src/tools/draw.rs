//! Draw tool: drag out a new element of one kind.

use scenekit_core::Point;

use super::{PointerEvent, PointerTool, ToolContext, ToolId, ToolOutcome};
use crate::commands::{CreateElement, SceneCommand};
use crate::model::{ElementId, ElementKind, ElementPatch, Geometry};

#[derive(Debug, Clone, Default)]
enum DrawState {
    #[default]
    Idle,
    Creating {
        id: ElementId,
        origin: Point,
        moved: bool,
    },
}

/// Creates elements of a single kind by dragging between two corners.
///
/// The element is added to the scene at pointer-down so it previews while
/// dragging, but the selection stays empty until pointer-up so the frame
/// handles do not get in the way.
#[derive(Debug, Clone)]
pub struct DrawTool {
    kind: ElementKind,
    state: DrawState,
}

impl DrawTool {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            state: DrawState::Idle,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Element being drawn, if a gesture is running.
    pub fn pending_element(&self) -> Option<ElementId> {
        match self.state {
            DrawState::Creating { id, .. } => Some(id),
            DrawState::Idle => None,
        }
    }

    fn stretch(ctx: &mut ToolContext<'_>, id: ElementId, origin: Point, to: Point) {
        let rect = Geometry::from_corners(origin, to);
        let patch = ElementPatch::position(rect.position()).with_size(rect.width, rect.height);
        ctx.scene.update_element(id, &patch);
    }

    fn discard(&mut self, ctx: &mut ToolContext<'_>) {
        if let DrawState::Creating { id, .. } = std::mem::take(&mut self.state) {
            tracing::debug!("Discarding unfinished {} {}", self.kind, id);
            ctx.scene.delete_elements(&[id]);
        }
    }
}

impl PointerTool for DrawTool {
    fn on_activate(&mut self, _ctx: &mut ToolContext<'_>) {
        self.state = DrawState::Idle;
    }

    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.discard(ctx);
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        if let DrawState::Creating { id, .. } = self.state {
            tracing::warn!("Pointer down while drawing {}, ignoring", id);
            return ToolOutcome::Continue;
        }
        ctx.scene.clear_selection();
        let origin = event.position;
        let id = ctx
            .scene
            .create_element(self.kind, origin.x, origin.y, ElementPatch::new());
        self.state = DrawState::Creating {
            id,
            origin,
            moved: false,
        };
        ToolOutcome::Continue
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        if let DrawState::Creating { id, origin, moved } = &mut self.state {
            *moved = true;
            Self::stretch(ctx, *id, *origin, event.position);
        }
        ToolOutcome::Continue
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        let DrawState::Creating { id, origin, moved } = std::mem::take(&mut self.state) else {
            tracing::warn!("Pointer up without a drawing gesture, ignoring");
            return ToolOutcome::Continue;
        };

        // A plain click keeps the kind's default size.
        if moved || event.position != origin {
            Self::stretch(ctx, id, origin, event.position);
        }

        let Some(element) = ctx.scene.element(id).cloned() else {
            tracing::debug!("Drawn element {} vanished before completion", id);
            return ToolOutcome::Continue;
        };
        tracing::debug!("Finished drawing {} {}", self.kind, id);
        ctx.history
            .execute(SceneCommand::from(CreateElement::new(element)), &mut *ctx.scene);
        ToolOutcome::SwitchTo(ToolId::Select)
    }

    fn on_pointer_cancel(&mut self, ctx: &mut ToolContext<'_>) {
        self.discard(ctx);
    }

    fn is_busy(&self) -> bool {
        matches!(self.state, DrawState::Creating { .. })
    }
}
