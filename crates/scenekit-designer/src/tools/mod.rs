//! Pointer tools.
//!
//! Each tool is a small state machine fed by pointer-down, pointer-move and
//! pointer-up events. The [`ToolManager`] owns one instance of every
//! registered tool and forwards each event synchronously to the active one.
//!
//! ```text
//! Select:  Idle --down on element--> Dragging --up--> Idle (+Move)
//!          Idle --down on canvas---> Marquee  --up--> Idle (selection)
//!          Idle --handle down------> Transforming --up--> Idle (+Transform)
//!
//! Draw:    Idle --down--> Creating --up--> Idle (+Create, switch to Select)
//! ```

mod draw;
mod manager;
mod select;

pub use draw::DrawTool;
pub use manager::ToolManager;
pub use select::{SelectMode, SelectTool};

use scenekit_core::Point;
use std::str::FromStr;

use crate::editor_settings::EditorSettings;
use crate::error::ToolError;
use crate::history::History;
use crate::model::{ElementId, ElementKind};
use crate::scene_store::SceneStore;
use crate::transform::ResizeHandle;

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on most platforms, Cmd on macOS. Extends or toggles selection.
    pub additive: bool,
}

/// A pointer event in scene coordinates.
///
/// `target` is the element under the pointer as reported by the renderer's
/// hit testing, or `None` for empty canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub position: Point,
    pub modifiers: Modifiers,
    pub target: Option<ElementId>,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            ..Self::default()
        }
    }

    pub fn on(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn additive(mut self) -> Self {
        self.modifiers.additive = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

/// Handle grabbed on the selection frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Resize(ResizeHandle),
    Rotate,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandleKind::Resize(handle) => write!(f, "{}", handle),
            HandleKind::Rotate => f.write_str("rotate"),
        }
    }
}

impl FromStr for HandleKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "rotate" {
            Ok(HandleKind::Rotate)
        } else {
            s.parse().map(HandleKind::Resize)
        }
    }
}

/// Registry key for tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    Select,
    Draw(ElementKind),
}

impl ToolId {
    pub fn name(&self) -> &'static str {
        match self {
            ToolId::Select => "select",
            ToolId::Draw(kind) => kind.name(),
        }
    }
}

impl std::fmt::Display for ToolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolId {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("select") {
            return Ok(ToolId::Select);
        }
        s.parse::<ElementKind>()
            .map(ToolId::Draw)
            .map_err(|_| ToolError::UnknownTool(s.to_string()))
    }
}

/// What a tool needs from the editor while handling an event.
pub struct ToolContext<'a> {
    pub scene: &'a mut dyn SceneStore,
    pub history: &'a mut History,
    pub settings: &'a EditorSettings,
}

/// Follow-up requested by a tool after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolOutcome {
    #[default]
    Continue,
    SwitchTo(ToolId),
}

/// The capability set every tool implements.
pub trait PointerTool {
    fn on_activate(&mut self, ctx: &mut ToolContext<'_>);

    /// Called when switching away. Any gesture in progress is abandoned.
    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>);

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome;

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome;

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome;

    /// Abandon the current gesture, reverting its live edits without
    /// recording a command.
    fn on_pointer_cancel(&mut self, ctx: &mut ToolContext<'_>);

    /// Whether a gesture is in progress.
    fn is_busy(&self) -> bool;
}

/// A registered tool.
#[derive(Debug, Clone)]
pub enum Tool {
    Select(SelectTool),
    Draw(DrawTool),
}

impl Tool {
    pub fn id(&self) -> ToolId {
        match self {
            Tool::Select(_) => ToolId::Select,
            Tool::Draw(tool) => ToolId::Draw(tool.kind()),
        }
    }

    pub fn as_select(&self) -> Option<&SelectTool> {
        match self {
            Tool::Select(tool) => Some(tool),
            Tool::Draw(_) => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut SelectTool> {
        match self {
            Tool::Select(tool) => Some(tool),
            Tool::Draw(_) => None,
        }
    }

    fn inner(&mut self) -> &mut dyn PointerTool {
        match self {
            Tool::Select(tool) => tool,
            Tool::Draw(tool) => tool,
        }
    }
}

impl PointerTool for Tool {
    fn on_activate(&mut self, ctx: &mut ToolContext<'_>) {
        self.inner().on_activate(ctx)
    }

    fn on_deactivate(&mut self, ctx: &mut ToolContext<'_>) {
        self.inner().on_deactivate(ctx)
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        self.inner().on_pointer_down(ctx, event)
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        self.inner().on_pointer_move(ctx, event)
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolContext<'_>, event: &PointerEvent) -> ToolOutcome {
        self.inner().on_pointer_up(ctx, event)
    }

    fn on_pointer_cancel(&mut self, ctx: &mut ToolContext<'_>) {
        self.inner().on_pointer_cancel(ctx)
    }

    fn is_busy(&self) -> bool {
        match self {
            Tool::Select(tool) => tool.is_busy(),
            Tool::Draw(tool) => tool.is_busy(),
        }
    }
}
