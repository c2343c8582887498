//! # SceneKit Core
//!
//! Core types and utilities shared by every SceneKit crate.
//! Provides the error taxonomy, basic 2D data types, and the event bus
//! used to broadcast history, tool, selection and asset notifications.

pub mod data;
pub mod error;
pub mod event_bus;

pub use data::Point;

pub use error::{AssetError, Error, Result, SceneError};

pub use event_bus::{
    AppEvent, AssetEvent, EventBus, EventBusError, EventCategory, EventFilter,
    HistoryEvent, HistoryStatus, SelectionEvent, SubscriptionId, ToolEvent,
};
