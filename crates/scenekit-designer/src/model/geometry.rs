use scenekit_core::Point;
use serde::{Deserialize, Serialize};

/// Placement of an element in scene space.
///
/// `(x, y)` is the top-left corner of the unrotated box; `rotation` is in
/// radians and applied about the box center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    /// Build a box from its center point.
    pub fn from_center(center: Point, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            x: center.x - width / 2.0,
            y: center.y - height / 2.0,
            width,
            height,
            rotation,
        }
    }

    /// Box spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::new(
            a.x.min(b.x),
            a.y.min(b.y),
            (a.x - b.x).abs(),
            (a.y - b.y).abs(),
        )
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Corners in scene space after rotation, clockwise from top-left.
    pub fn corners(&self) -> [Point; 4] {
        let center = self.center();
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
        .map(|corner| {
            if self.rotation == 0.0 {
                corner
            } else {
                corner.rotate_about(center, self.rotation)
            }
        })
    }

    /// Upright box enclosing the rotated corners.
    pub fn axis_aligned_bounds(&self) -> Self {
        let corners = self.corners();
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Whether `point` lies inside the rotated box (edges inclusive).
    pub fn contains_point(&self, point: Point) -> bool {
        let local = if self.rotation == 0.0 {
            point
        } else {
            point.rotate_about(self.center(), -self.rotation)
        };
        local.x >= self.x
            && local.x <= self.x + self.width
            && local.y >= self.y
            && local.y <= self.y + self.height
    }

    /// Overlap test between upright boxes; touching edges do not count.
    pub fn intersects(&self, other: &Geometry) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}
