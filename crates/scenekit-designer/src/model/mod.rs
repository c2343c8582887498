//! Scene data model.

mod element;
mod geometry;
mod patch;

pub use element::{Element, ElementId, ElementKind, ElementStyle, ImageFilters};
pub use geometry::Geometry;
pub use patch::ElementPatch;
