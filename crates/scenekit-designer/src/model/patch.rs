use scenekit_core::Point;
use serde::{Deserialize, Deserializer, Serialize};

use super::element::{Element, ElementStyle, ImageFilters};
use super::geometry::Geometry;

/// A partial update to an element. `None` fields are left untouched.
///
/// Optional element fields take `Some(None)` to clear them; in JSON that is
/// an explicit `null`, while an absent key leaves the field alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub style: Option<ElementStyle>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub text: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub asset_key: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub filters: Option<Option<ImageFilters>>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

/// A key that is present, even as `null`, sets the field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(point: Point) -> Self {
        Self {
            x: Some(point.x),
            y: Some(point.y),
            ..Self::default()
        }
    }

    pub fn geometry(geometry: Geometry) -> Self {
        Self {
            x: Some(geometry.x),
            y: Some(geometry.y),
            width: Some(geometry.width),
            height: Some(geometry.height),
            rotation: Some(geometry.rotation),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(Some(text.into()));
        self
    }

    pub fn clear_text(mut self) -> Self {
        self.text = Some(None);
        self
    }

    pub fn with_asset_key(mut self, key: impl Into<String>) -> Self {
        self.asset_key = Some(Some(key.into()));
        self
    }

    pub fn clear_asset_key(mut self) -> Self {
        self.asset_key = Some(None);
        self
    }

    pub fn with_filters(mut self, filters: ImageFilters) -> Self {
        self.filters = Some(Some(filters));
        self
    }

    pub fn clear_filters(mut self) -> Self {
        self.filters = Some(None);
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write every present field into `element`.
    pub fn apply_to(&self, element: &mut Element) {
        let g = &mut element.geometry;
        if let Some(x) = self.x {
            g.x = x;
        }
        if let Some(y) = self.y {
            g.y = y;
        }
        if let Some(width) = self.width {
            g.width = width.max(0.0);
        }
        if let Some(height) = self.height {
            g.height = height.max(0.0);
        }
        if let Some(rotation) = self.rotation {
            g.rotation = rotation;
        }
        if let Some(style) = &self.style {
            element.style = style.clone();
        }
        if let Some(text) = &self.text {
            element.text = text.clone();
        }
        if let Some(key) = &self.asset_key {
            // The resolved URL belongs to the old key.
            if element.asset_key != *key {
                element.runtime_url = None;
            }
            element.asset_key = key.clone();
        }
        if let Some(filters) = self.filters {
            element.filters = filters;
        }
        if let Some(visible) = self.visible {
            element.visible = visible;
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }
    }

    /// Current values of `element` for exactly the fields set in `self`.
    ///
    /// Applying the result undoes applying `self`, including clearing
    /// optional fields that were unset before.
    pub fn capture_from(&self, element: &Element) -> Self {
        let g = &element.geometry;
        Self {
            x: self.x.map(|_| g.x),
            y: self.y.map(|_| g.y),
            width: self.width.map(|_| g.width),
            height: self.height.map(|_| g.height),
            rotation: self.rotation.map(|_| g.rotation),
            style: self.style.as_ref().map(|_| element.style.clone()),
            text: self.text.as_ref().map(|_| element.text.clone()),
            asset_key: self.asset_key.as_ref().map(|_| element.asset_key.clone()),
            filters: self.filters.map(|_| element.filters),
            visible: self.visible.map(|_| element.visible),
            locked: self.locked.map(|_| element.locked),
        }
    }
}
