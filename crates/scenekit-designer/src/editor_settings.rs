//! Tunables consumed by the history and the tools.

use scenekit_core::Point;
use serde::{Deserialize, Serialize};

/// Editor behaviour settings.
///
/// Usually derived from the application config; `Default` matches the
/// stock configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Maximum number of undoable commands kept.
    pub max_undo_depth: usize,
    /// Smallest width/height a resize may produce.
    pub min_element_size: f64,
    /// Rotation snap step in degrees.
    pub rotation_snap_step: f64,
    /// Rotation snap tolerance in degrees.
    pub rotation_snap_tolerance: f64,
    /// Lower bound for group scale factors.
    pub min_group_scale: f64,
    /// Offset applied to duplicated and pasted elements.
    pub duplicate_offset: Point,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            max_undo_depth: 50,
            min_element_size: 5.0,
            rotation_snap_step: 45.0,
            rotation_snap_tolerance: 5.0,
            min_group_scale: 0.01,
            duplicate_offset: Point::new(20.0, 20.0),
        }
    }
}
