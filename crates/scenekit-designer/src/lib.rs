//! # SceneKit Designer
//!
//! The interaction core of the scene editor. Turns pointer input into
//! undoable edits of a scene of rectangles, ellipses, triangles, text and
//! images, and computes the selection frame and transform handles.
//!
//! ## Layers
//!
//! - [`model`]: elements, geometry and partial updates
//! - [`scene_store`]: the ordered element list and selection
//! - [`commands`] and [`history`]: reversible edits with bounded undo
//! - [`transform`]: pure bounding box, resize, rotate and snap math
//! - [`tools`]: select and draw tools behind a [`ToolManager`]
//! - [`editor_state`]: one editing session wiring everything together

pub mod commands;
pub mod editor_settings;
pub mod editor_state;
pub mod error;
pub mod history;
pub mod model;
pub mod scene_store;
pub mod tools;
pub mod transform;

pub use commands::{
    Command, CompositeCommand, CreateElement, DeleteElements, DuplicateElements, MoveElements,
    SceneCommand, TransformElements, UpdateElement,
};
pub use editor_settings::EditorSettings;
pub use editor_state::EditorState;
pub use error::{Result, ToolError};
pub use history::History;
pub use model::{
    Element, ElementId, ElementKind, ElementPatch, ElementStyle, Geometry, ImageFilters,
};
pub use scene_store::{hit_test, Scene, SceneStore};
pub use tools::{
    DrawTool, HandleKind, Modifiers, PointerEvent, PointerTool, SelectMode, SelectTool, Tool,
    ToolContext, ToolId, ToolManager, ToolOutcome,
};
pub use transform::{
    bounding_box_of, fit_group_to_bounds, group_resize, normalize_angle, resize_from_handle,
    resize_rotated, rotate_about, snap_angle, ResizeHandle,
};

pub use scenekit_core::Point;
