//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so they can be logged or replayed.

use serde::{Deserialize, Serialize};

/// Root event enum for all editor events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Undo/redo stack changes
    History(HistoryEvent),
    /// Active tool and gesture changes
    Tool(ToolEvent),
    /// Selection set changes
    Selection(SelectionEvent),
    /// Asset cache lifetime events
    Asset(AssetEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::History(_) => EventCategory::History,
            AppEvent::Tool(_) => EventCategory::Tool,
            AppEvent::Selection(_) => EventCategory::Selection,
            AppEvent::Asset(_) => EventCategory::Asset,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::History(e) => e.description(),
            AppEvent::Tool(e) => e.description(),
            AppEvent::Selection(e) => e.description(),
            AppEvent::Asset(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Undo/redo stack events.
    History,
    /// Tool switch and gesture events.
    Tool,
    /// Selection events.
    Selection,
    /// Asset cache events.
    Asset,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::History => write!(f, "History"),
            EventCategory::Tool => write!(f, "Tool"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Asset => write!(f, "Asset"),
        }
    }
}

/// Snapshot of undo/redo availability handed to history listeners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStatus {
    /// Whether `undo` would do anything.
    pub can_undo: bool,
    /// Whether `redo` would do anything.
    pub can_redo: bool,
    /// Number of undoable commands.
    pub undo_depth: usize,
    /// Number of redoable commands.
    pub redo_depth: usize,
    /// Name of the command `undo` would revert.
    pub undo_description: Option<String>,
    /// Name of the command `redo` would reapply.
    pub redo_description: Option<String>,
}

/// History events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEvent {
    /// Either stack changed; carries the state after the change.
    Changed(HistoryStatus),
}

impl HistoryEvent {
    /// Get a short description of this event
    pub fn description(&self) -> String {
        match self {
            HistoryEvent::Changed(status) => format!(
                "History changed (undo: {}, redo: {})",
                status.undo_depth, status.redo_depth
            ),
        }
    }
}

/// Tool events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ToolEvent {
    /// The active tool changed.
    Changed {
        /// Previously active tool name.
        from: String,
        /// Newly active tool name.
        to: String,
    },
    /// A gesture was abandoned before completion.
    GestureCancelled {
        /// Tool that owned the gesture.
        tool: String,
    },
}

impl ToolEvent {
    /// Get a short description of this event
    pub fn description(&self) -> String {
        match self {
            ToolEvent::Changed { from, to } => format!("Tool changed: {} -> {}", from, to),
            ToolEvent::GestureCancelled { tool } => format!("Gesture cancelled in {}", tool),
        }
    }
}

/// Selection events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SelectionEvent {
    /// The selection set changed.
    Changed {
        /// Number of selected elements afterwards.
        count: usize,
    },
}

impl SelectionEvent {
    /// Get a short description of this event
    pub fn description(&self) -> String {
        match self {
            SelectionEvent::Changed { count } => format!("Selection changed ({} selected)", count),
        }
    }
}

/// Asset cache events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssetEvent {
    /// A load finished and the asset is cached.
    Loaded {
        /// The asset key.
        key: String,
    },
    /// The last reference was released and the resource revoked.
    Released {
        /// The asset key.
        key: String,
    },
    /// The asset was forcibly evicted.
    Removed {
        /// The asset key.
        key: String,
    },
    /// A load failed.
    LoadFailed {
        /// The asset key.
        key: String,
        /// Failure reason.
        reason: String,
    },
}

impl AssetEvent {
    /// Get a short description of this event
    pub fn description(&self) -> String {
        match self {
            AssetEvent::Loaded { key } => format!("Asset loaded: {}", key),
            AssetEvent::Released { key } => format!("Asset released: {}", key),
            AssetEvent::Removed { key } => format!("Asset removed: {}", key),
            AssetEvent::LoadFailed { key, reason } => {
                format!("Asset load failed: {} ({})", key, reason)
            }
        }
    }
}
