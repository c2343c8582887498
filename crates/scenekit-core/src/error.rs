//! Error handling for SceneKit
//!
//! Provides error types for the layers of the editor core:
//! - Scene errors (element lookup, invalid edits)
//! - Asset errors (loading, storage, cache lifetime)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Scene error type
///
/// Raised by direct editing APIs. History replay never raises these; a
/// command that targets a missing element skips it instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Element does not exist in the scene
    #[error("Element not found: {id}")]
    ElementNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// Requested geometry is not representable
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry {
        /// Why the geometry was rejected.
        reason: String,
    },

    /// Operation needs a selection but none is present
    #[error("Nothing is selected")]
    EmptySelection,
}

/// Asset error type
///
/// Cloneable so one failed load can be handed to every coalesced waiter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    /// No asset is stored under the key
    #[error("Asset not found: {key}")]
    NotFound {
        /// The asset key.
        key: String,
    },

    /// The loader failed to resolve the asset
    #[error("Failed to load asset {key}: {reason}")]
    LoadFailed {
        /// The asset key.
        key: String,
        /// Loader supplied failure reason.
        reason: String,
    },

    /// The asset was removed while its load was in flight
    #[error("Asset {key} was removed while loading")]
    Removed {
        /// The asset key.
        key: String,
    },

    /// The load task ended without reporting a result
    #[error("Load of asset {key} was aborted")]
    LoadAborted {
        /// The asset key.
        key: String,
    },

    /// Backing store error
    #[error("Asset storage error: {reason}")]
    Storage {
        /// Underlying storage failure.
        reason: String,
    },
}

impl AssetError {
    /// Key this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::NotFound { key }
            | Self::LoadFailed { key, .. }
            | Self::Removed { key }
            | Self::LoadAborted { key } => Some(key),
            Self::Storage { .. } => None,
        }
    }
}

impl From<std::io::Error> for AssetError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            reason: err.to_string(),
        }
    }
}

/// Main error type for SceneKit
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Asset error
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a message
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

/// Result type for SceneKit operations
pub type Result<T> = std::result::Result<T, Error>;
