use scenekit_core::Point;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::geometry::Geometry;
use crate::error::ToolError;

/// Opaque, immutable element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "el-{}", self.0.simple())
    }
}

/// The closed set of element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Triangle,
    Text,
    Image,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::Rectangle,
        ElementKind::Ellipse,
        ElementKind::Triangle,
        ElementKind::Text,
        ElementKind::Image,
    ];

    /// Short name used for tool ids.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Rectangle => "rect",
            ElementKind::Ellipse => "ellipse",
            ElementKind::Triangle => "triangle",
            ElementKind::Text => "text",
            ElementKind::Image => "image",
        }
    }

    /// Size a freshly created element starts with.
    ///
    /// Shapes begin at 1x1 and grow with the drawing drag; text and images
    /// get a usable box so a single click produces something visible.
    pub fn default_size(&self) -> (f64, f64) {
        match self {
            ElementKind::Text => (100.0, 30.0),
            ElementKind::Image => (200.0, 200.0),
            _ => (1.0, 1.0),
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rect" | "rectangle" => Ok(ElementKind::Rectangle),
            "ellipse" | "circle" => Ok(ElementKind::Ellipse),
            "triangle" => Ok(ElementKind::Triangle),
            "text" => Ok(ElementKind::Text),
            "image" => Ok(ElementKind::Image),
            other => Err(ToolError::UnknownElementKind(other.to_string())),
        }
    }
}

/// Fill, stroke and typography attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// `None` means no fill.
    pub fill_color: Option<String>,
    pub line_color: String,
    pub line_width: f64,
    pub font_size: f64,
    pub font_family: String,
    pub font_color: String,
}

impl ElementStyle {
    /// Style a new element of `kind` starts with.
    pub fn for_kind(kind: ElementKind) -> Self {
        let image = kind == ElementKind::Image;
        Self {
            fill_color: (!image).then(|| "#ffffff".to_string()),
            line_color: "#000000".to_string(),
            line_width: if image { 0.0 } else { 2.0 },
            font_size: 24.0,
            font_family: "Arial".to_string(),
            font_color: "#000000".to_string(),
        }
    }
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self::for_kind(ElementKind::Rectangle)
    }
}

/// Image adjustment filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFilters {
    pub blur: f64,
    pub brightness: f64,
    pub contrast: f64,
}

impl Default for ImageFilters {
    fn default() -> Self {
        Self {
            blur: 0.0,
            brightness: 1.0,
            contrast: 1.0,
        }
    }
}

/// A scene element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub style: ElementStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Persistent reference into the asset store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_key: Option<String>,
    /// Resolved URL for the asset; valid only for this session.
    #[serde(skip)]
    pub runtime_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ImageFilters>,
    pub visible: bool,
    pub locked: bool,
}

impl Element {
    /// New element of `kind` with its top-left corner at `(x, y)` and
    /// the per-type defaults applied.
    pub fn new(kind: ElementKind, x: f64, y: f64) -> Self {
        let (width, height) = kind.default_size();
        Self {
            id: ElementId::new(),
            kind,
            geometry: Geometry::new(x, y, width, height),
            style: ElementStyle::for_kind(kind),
            text: (kind == ElementKind::Text).then(|| "Double click to edit".to_string()),
            asset_key: None,
            runtime_url: None,
            filters: (kind == ElementKind::Image).then(ImageFilters::default),
            visible: true,
            locked: false,
        }
    }

    /// Copy without session-only state, as kept in undo snapshots.
    ///
    /// A restored element starts unresolved and gets a fresh URL through
    /// its own cache reference.
    pub fn detached(&self) -> Self {
        Self {
            runtime_url: None,
            ..self.clone()
        }
    }

    /// Copy with a fresh identity, shifted by `offset`.
    ///
    /// The copy shares nothing with the original. The resolved asset URL is
    /// not carried over because it belongs to the original's cache reference.
    pub fn duplicate(&self, offset: Point) -> Self {
        Self {
            id: ElementId::new(),
            geometry: self.geometry.translated(offset.x, offset.y),
            runtime_url: None,
            ..self.clone()
        }
    }

    pub fn position(&self) -> Point {
        self.geometry.position()
    }

    /// Hit test against the rotated outline.
    pub fn contains_point(&self, point: Point) -> bool {
        self.geometry.contains_point(point)
    }
}
