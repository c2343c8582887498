//! # Event Bus Module
//!
//! Publish/subscribe plumbing used by the editor core to notify outer
//! layers (toolbars, status bars, renderers) without depending on them.
//!
//! ## Overview
//!
//! - Publishers emit typed events without knowing subscribers
//! - Subscribers filter by category and receive events of interest
//! - Synchronous handlers run on the publishing thread; async consumers
//!   can poll a broadcast receiver instead
//!
//! There is no global instance. Construct one bus at startup and hand an
//! `Arc<EventBus>` to every component that publishes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scenekit_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::History]),
//!     |event| {
//!         if let AppEvent::History(history) = event {
//!             println!("history changed: {:?}", history);
//!         }
//!     },
//! );
//!
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
