//! Transform geometry.
//!
//! Pure functions over geometry snapshots, shared by the select tool and
//! by renderers that draw the selection frame and its handles. Angles are
//! radians unless a parameter name says degrees.

use scenekit_core::Point;
use std::str::FromStr;

use crate::error::ToolError;
use crate::model::Geometry;

/// The eight resize handles around a selection frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

/// Which edges of the box a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Edges {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::TopLeft,
        ResizeHandle::Top,
        ResizeHandle::TopRight,
        ResizeHandle::Right,
        ResizeHandle::BottomRight,
        ResizeHandle::Bottom,
        ResizeHandle::BottomLeft,
        ResizeHandle::Left,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeHandle::TopLeft => "tl",
            ResizeHandle::Top => "t",
            ResizeHandle::TopRight => "tr",
            ResizeHandle::Right => "r",
            ResizeHandle::BottomRight => "br",
            ResizeHandle::Bottom => "b",
            ResizeHandle::BottomLeft => "bl",
            ResizeHandle::Left => "l",
        }
    }

    pub fn edges(&self) -> Edges {
        use ResizeHandle::*;
        Edges {
            left: matches!(self, TopLeft | Left | BottomLeft),
            right: matches!(self, TopRight | Right | BottomRight),
            top: matches!(self, TopLeft | Top | TopRight),
            bottom: matches!(self, BottomLeft | Bottom | BottomRight),
        }
    }

    /// Where the handle sits on `frame`, in scene space.
    pub fn anchor_on(&self, frame: &Geometry) -> Point {
        let edges = self.edges();
        let fx = if edges.left {
            0.0
        } else if edges.right {
            1.0
        } else {
            0.5
        };
        let fy = if edges.top {
            0.0
        } else if edges.bottom {
            1.0
        } else {
            0.5
        };
        let local = Point::new(frame.x + frame.width * fx, frame.y + frame.height * fy);
        if frame.rotation == 0.0 {
            local
        } else {
            local.rotate_about(frame.center(), frame.rotation)
        }
    }
}

impl std::fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResizeHandle {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResizeHandle::ALL
            .into_iter()
            .find(|h| h.as_str() == s)
            .ok_or_else(|| ToolError::UnknownHandle(s.to_string()))
    }
}

/// Selection frame for a set of element geometries.
///
/// A single element keeps its own box and rotation so the frame follows its
/// tilt. Several elements get the upright union of their rotated corners.
/// Returns `None` for an empty slice.
pub fn bounding_box_of(items: &[Geometry]) -> Option<Geometry> {
    match items {
        [] => None,
        [single] => Some(*single),
        many => {
            let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
            let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for corner in many.iter().flat_map(|g| g.corners()) {
                min_x = min_x.min(corner.x);
                min_y = min_y.min(corner.y);
                max_x = max_x.max(corner.x);
                max_y = max_y.max(corner.y);
            }
            Some(Geometry::new(min_x, min_y, max_x - min_x, max_y - min_y))
        }
    }
}

/// Drag one handle of an upright box by `(dx, dy)`.
///
/// Each moved edge shifts by the matching delta. A dragged axis never shrinks
/// below `min_size`; when it would, the edge opposite the handle stays put
/// and the dragged edge is placed `min_size` away from it. Rotation is
/// carried through untouched.
pub fn resize_from_handle(
    handle: ResizeHandle,
    initial: &Geometry,
    dx: f64,
    dy: f64,
    min_size: f64,
) -> Geometry {
    let edges = handle.edges();
    let mut left = initial.x;
    let mut right = initial.x + initial.width;
    let mut top = initial.y;
    let mut bottom = initial.y + initial.height;

    if edges.left {
        left += dx;
    }
    if edges.right {
        right += dx;
    }
    if edges.top {
        top += dy;
    }
    if edges.bottom {
        bottom += dy;
    }

    if (edges.left || edges.right) && right - left < min_size {
        if edges.left {
            left = right - min_size;
        } else {
            right = left + min_size;
        }
    }
    if (edges.top || edges.bottom) && bottom - top < min_size {
        if edges.top {
            top = bottom - min_size;
        } else {
            bottom = top + min_size;
        }
    }

    Geometry {
        x: left,
        y: top,
        width: right - left,
        height: bottom - top,
        rotation: initial.rotation,
    }
}

/// Handle drag on a possibly rotated box.
///
/// The pointer delta is taken into the box's own frame, resized there, and
/// the result is placed so the edge opposite the handle keeps its position
/// in scene space. For an unrotated box this equals [`resize_from_handle`].
pub fn resize_rotated(
    handle: ResizeHandle,
    initial: &Geometry,
    dx: f64,
    dy: f64,
    min_size: f64,
) -> Geometry {
    if initial.rotation == 0.0 {
        return resize_from_handle(handle, initial, dx, dy, min_size);
    }
    let local_delta = Point::new(dx, dy).rotated(-initial.rotation);
    let upright = initial.with_rotation(0.0);
    let resized = resize_from_handle(handle, &upright, local_delta.x, local_delta.y, min_size);
    let shift = (resized.center() - upright.center()).rotated(initial.rotation);
    Geometry::from_center(
        initial.center() + shift,
        resized.width,
        resized.height,
        initial.rotation,
    )
}

/// Scale a group about the center of `initial_bounds`.
///
/// Item centers and extents are scaled relative to the group center, so the
/// layout is preserved. Factors below `min_scale` are raised to it.
pub fn group_resize(
    items: &[Geometry],
    initial_bounds: &Geometry,
    scale_x: f64,
    scale_y: f64,
    min_scale: f64,
) -> Vec<Geometry> {
    let floor = min_scale.max(f64::EPSILON);
    let sx = scale_x.max(floor);
    let sy = scale_y.max(floor);
    let origin = initial_bounds.center();

    items
        .iter()
        .map(|item| {
            let c = item.center();
            let center = Point::new(
                origin.x + (c.x - origin.x) * sx,
                origin.y + (c.y - origin.y) * sy,
            );
            Geometry::from_center(center, item.width * sx, item.height * sy, item.rotation)
        })
        .collect()
}

/// Fit a group from `initial_bounds` into `target`.
///
/// Scales with [`group_resize`] and then moves the group center onto the
/// target center. Degenerate axes keep a factor of 1.
pub fn fit_group_to_bounds(
    items: &[Geometry],
    initial_bounds: &Geometry,
    target: &Geometry,
    min_scale: f64,
) -> Vec<Geometry> {
    let factor = |to: f64, from: f64| if from > f64::EPSILON { to / from } else { 1.0 };
    let sx = factor(target.width, initial_bounds.width);
    let sy = factor(target.height, initial_bounds.height);
    let shift = target.center() - initial_bounds.center();

    group_resize(items, initial_bounds, sx, sy, min_scale)
        .into_iter()
        .map(|g| g.translated(shift.x, shift.y))
        .collect()
}

/// Rigid rotation of a group about `center`.
pub fn rotate_about(items: &[Geometry], center: Point, delta_angle: f64) -> Vec<Geometry> {
    items
        .iter()
        .map(|item| {
            let new_center = item.center().rotate_about(center, delta_angle);
            Geometry::from_center(
                new_center,
                item.width,
                item.height,
                item.rotation + delta_angle,
            )
        })
        .collect()
}

/// Wrap `angle` into (-π, π].
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Snap `angle` to the nearest multiple of `step_degrees` when it is within
/// `tolerance_degrees` of it; otherwise return it unchanged.
pub fn snap_angle(angle: f64, step_degrees: f64, tolerance_degrees: f64) -> f64 {
    if step_degrees <= 0.0 {
        return angle;
    }
    let degrees = angle.to_degrees();
    let nearest = (degrees / step_degrees).round() * step_degrees;
    if (degrees - nearest).abs() <= tolerance_degrees {
        nearest.to_radians()
    } else {
        angle
    }
}
