//! Select tool: click/drag to move, drag on empty canvas to marquee-select,
//! and resize/rotate through the selection frame handles.

use scenekit_core::Point;

use super::{HandleKind, PointerEvent, PointerTool, ToolContext, ToolOutcome};
use crate::commands::{MoveElements, MoveEntry, SceneCommand, TransformElements, TransformEntry};
use crate::model::{ElementId, ElementPatch, Geometry};
use crate::transform::{
    bounding_box_of, fit_group_to_bounds, normalize_angle, resize_from_handle, resize_rotated,
    rotate_about, snap_angle,
};

/// Marquee drags smaller than this on both axes count as a click.
const CLICK_SLOP: f64 = 1e-6;

/// Observable sub-state of the select tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    Idle,
    Dragging,
    Marquee,
    Transforming,
}

#[derive(Debug, Clone)]
struct TransformSession {
    handle: HandleKind,
    origin: Point,
    initial: Vec<(ElementId, Geometry)>,
    bounds: Geometry,
    start_angle: f64,
}

#[derive(Debug, Clone, Default)]
enum SelectState {
    #[default]
    Idle,
    Dragging {
        origin: Point,
        initial: Vec<(ElementId, Point)>,
    },
    Marquee {
        origin: Point,
        current: Point,
        additive: bool,
    },
    Transforming(TransformSession),
}

#[derive(Debug, Clone, Default)]
pub struct SelectTool {
    state: SelectState,
}

impl SelectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> SelectMode {
        match self.state {
            SelectState::Idle => SelectMode::Idle,
            SelectState::Dragging { .. } => SelectMode::Dragging,
            SelectState::Marquee { .. } => SelectMode::Marquee,
            SelectState::Transforming(_) => SelectMode::Transforming,
        }
    }

    /// Marquee rectangle to preview while marquee-selecting.
    pub fn marquee_rect(&self) -> Option<Geometry> {
        match self.state {
            SelectState::Marquee {
                origin, current, ..
            } => Some(Geometry::from_corners(origin, current)),
            _ => None,
        }
    }

    /// Enter the transforming sub-state from a handle grab.
    ///
    /// Returns false, leaving the tool untouched, when a gesture is already
    /// running or nothing transformable is selected.
    pub fn begin_transform(
        &mut self,
        ctx: &mut ToolContext<'_>,
        handle: HandleKind,
        event: &PointerEvent,
    ) -> bool {
        if !matches!(self.state, SelectState::Idle) {
            tracing::warn!("Handle {} grabbed during another gesture, ignoring", handle);
            return false;
        }
        let initial: Vec<(ElementId, Geometry)> = ctx
            .scene
            .selected_elements()
            .into_iter()
            .filter(|e| !e.locked)
            .map(|e| (e.id, e.geometry))
            .collect();
        let geometries: Vec<Geometry> = initial.iter().map(|(_, g)| *g).collect();
        let Some(bounds) = bounding_box_of(&geometries) else {
            tracing::warn!("Handle {} grabbed with nothing to transform", handle);
            return false;
        };

        tracing::debug!("Transform {} started on {} elements", handle, initial.len());
        self.state = SelectState::Transforming(TransformSession {
            handle,
            origin: event.position,
            initial,
            bounds,
            start_angle: event.position.angle_from(bounds.center()),
        });
        true
    }

    fn start_drag(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent, id: ElementId) {
        if event.modifiers.additive {
            ctx.scene.select_element(Some(id), true);
            if !ctx.scene.is_selected(id) {
                // Toggled off; nothing to drag.
                return;
            }
        } else if !ctx.scene.is_selected(id) {
            ctx.scene.select_element(Some(id), false);
        }

        let initial: Vec<(ElementId, Point)> = ctx
            .scene
            .selected_elements()
            .into_iter()
            .filter(|e| !e.locked)
            .map(|e| (e.id, e.position()))
            .collect();
        if !initial.is_empty() {
            self.state = SelectState::Dragging {
                origin: event.position,
                initial,
            };
        }
    }

    fn apply_drag(ctx: &mut ToolContext<'_>, origin: Point, initial: &[(ElementId, Point)], to: Point) {
        let delta = to - origin;
        for (id, start) in initial {
            ctx.scene
                .update_element(*id, &ElementPatch::position(*start + delta));
        }
    }

    fn apply_transform(ctx: &mut ToolContext<'_>, session: &TransformSession, to: Point) {
        let settings = ctx.settings;
        let delta = to - session.origin;
        let geometries: Vec<Geometry> = session.initial.iter().map(|(_, g)| *g).collect();

        let updated: Vec<Geometry> = match (session.handle, geometries.as_slice()) {
            (HandleKind::Resize(handle), [single]) => vec![resize_rotated(
                handle,
                single,
                delta.x,
                delta.y,
                settings.min_element_size,
            )],
            (HandleKind::Resize(handle), many) => {
                let target = resize_from_handle(
                    handle,
                    &session.bounds,
                    delta.x,
                    delta.y,
                    settings.min_element_size,
                );
                fit_group_to_bounds(many, &session.bounds, &target, settings.min_group_scale)
            }
            (HandleKind::Rotate, [single]) => {
                let swept = to.angle_from(session.bounds.center()) - session.start_angle;
                let rotation = snap_angle(
                    normalize_angle(single.rotation + swept),
                    settings.rotation_snap_step,
                    settings.rotation_snap_tolerance,
                );
                vec![single.with_rotation(rotation)]
            }
            (HandleKind::Rotate, many) => {
                let center = session.bounds.center();
                let swept = snap_angle(
                    normalize_angle(to.angle_from(center) - session.start_angle),
                    settings.rotation_snap_step,
                    settings.rotation_snap_tolerance,
                );
                rotate_about(many, center, swept)
            }
        };

        for ((id, _), geometry) in session.initial.iter().zip(updated) {
            ctx.scene
                .update_element(*id, &ElementPatch::geometry(geometry));
        }
    }

    fn finish_marquee(ctx: &mut ToolContext<'_>, rect: Geometry, additive: bool) {
        let is_click = rect.width < CLICK_SLOP && rect.height < CLICK_SLOP;
        let hits: Vec<ElementId> = if is_click {
            Vec::new()
        } else {
            ctx.scene
                .elements()
                .iter()
                .filter(|e| e.visible && e.geometry.axis_aligned_bounds().intersects(&rect))
                .map(|e| e.id)
                .collect()
        };

        let selection = if additive {
            let mut merged = ctx.scene.selection().to_vec();
            merged.extend(hits);
            merged
        } else {
            hits
        };
        ctx.scene.set_selection(selection);
        tracing::debug!("Marquee selected {} elements", ctx.scene.selection().len());
    }

    fn restore(&mut self, ctx: &mut ToolContext<'_>) {
        match std::mem::take(&mut self.state) {
            SelectState::Dragging { initial, .. } => {
                for (id, start) in initial {
                    ctx.scene.update_element(id, &ElementPatch::position(start));
                }
            }
            SelectState::Transforming(session) => {
                for (id, geometry) in session.initial {
                    ctx.scene
                        .update_element(id, &ElementPatch::geometry(geometry));
                }
            }
            SelectState::Marquee { .. } | SelectState::Idle => {}
        }
    }
}

impl PointerTool for SelectTool {
    fn on_activate(&mut self, _ctx: &mut ToolContext<'_>) {
        self.state = SelectState::Idle;
    }

    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.restore(ctx);
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        if !matches!(self.state, SelectState::Idle) {
            tracing::warn!("Pointer down during {:?}, ignoring", self.mode());
            return ToolOutcome::Continue;
        }

        match event.target.filter(|id| ctx.scene.contains(*id)) {
            Some(id) => self.start_drag(ctx, event, id),
            None => {
                if let Some(ghost) = event.target {
                    tracing::debug!("Pointer down on missing element {}", ghost);
                }
                self.state = SelectState::Marquee {
                    origin: event.position,
                    current: event.position,
                    additive: event.modifiers.additive,
                };
            }
        }
        ToolOutcome::Continue
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        match &mut self.state {
            SelectState::Idle => {}
            SelectState::Dragging { origin, initial } => {
                Self::apply_drag(ctx, *origin, initial, event.position);
            }
            SelectState::Marquee { current, .. } => *current = event.position,
            SelectState::Transforming(session) => {
                Self::apply_transform(ctx, session, event.position);
            }
        }
        ToolOutcome::Continue
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        match std::mem::take(&mut self.state) {
            SelectState::Idle => {
                tracing::warn!("Pointer up without a gesture, ignoring");
            }
            SelectState::Dragging { origin, initial } => {
                Self::apply_drag(ctx, origin, &initial, event.position);
                let moves = initial
                    .into_iter()
                    .filter_map(|(id, from)| {
                        ctx.scene.element(id).map(|e| MoveEntry {
                            id,
                            from,
                            to: e.position(),
                        })
                    })
                    .collect();
                let command = MoveElements::new(moves);
                if !command.is_empty() {
                    ctx.history
                        .execute(SceneCommand::from(command), &mut *ctx.scene);
                }
            }
            SelectState::Marquee {
                origin, additive, ..
            } => {
                Self::finish_marquee(ctx, Geometry::from_corners(origin, event.position), additive);
            }
            SelectState::Transforming(session) => {
                Self::apply_transform(ctx, &session, event.position);
                let entries = session
                    .initial
                    .into_iter()
                    .filter_map(|(id, from)| {
                        ctx.scene.element(id).map(|e| TransformEntry {
                            id,
                            from,
                            to: e.geometry,
                        })
                    })
                    .collect();
                let command = TransformElements::new(entries);
                if !command.is_empty() {
                    ctx.history
                        .execute(SceneCommand::from(command), &mut *ctx.scene);
                }
            }
        }
        ToolOutcome::Continue
    }

    fn on_pointer_cancel(&mut self, ctx: &mut ToolContext<'_>) {
        self.restore(ctx);
    }

    fn is_busy(&self) -> bool {
        !matches!(self.state, SelectState::Idle)
    }
}
