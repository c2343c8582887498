//! Undo/redo history over scene commands.
//!
//! The undo stack is bounded: once it holds `max_depth` commands the oldest
//! is evicted. The redo stack is unbounded but emptied by every new
//! `execute`. Listeners are notified after each stack change with a
//! [`HistoryStatus`] snapshot, never while a command is running.

use scenekit_core::{
    AppEvent, EventBus, EventCategory, EventFilter, HistoryEvent, HistoryStatus, SubscriptionId,
};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::commands::Command;
use crate::scene_store::SceneStore;

pub const DEFAULT_MAX_DEPTH: usize = 50;

/// Undo/redo manager.
pub struct History {
    undo_stack: VecDeque<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
    max_depth: usize,
    bus: Arc<EventBus>,
}

impl History {
    /// History with its own private event bus.
    pub fn new(max_depth: usize) -> Self {
        Self::with_event_bus(max_depth, Arc::new(EventBus::new()))
    }

    /// History that publishes its changes on a shared bus.
    pub fn with_event_bus(max_depth: usize, bus: Arc<EventBus>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            bus,
        }
    }

    /// Run `command`, record it and drop everything redoable.
    pub fn execute<C>(&mut self, command: C, scene: &mut dyn SceneStore)
    where
        C: Command + 'static,
    {
        self.execute_boxed(Box::new(command), scene);
    }

    pub fn execute_boxed(&mut self, mut command: Box<dyn Command>, scene: &mut dyn SceneStore) {
        command.execute(scene);
        tracing::debug!("Executed {}", command.name());
        self.undo_stack.push_back(command);
        self.redo_stack.clear();
        self.trim();
        self.notify();
    }

    /// Undo the most recent command. Returns false if there was nothing to undo.
    pub fn undo(&mut self, scene: &mut dyn SceneStore) -> bool {
        let Some(mut command) = self.undo_stack.pop_back() else {
            return false;
        };
        command.undo(scene);
        tracing::debug!("Undid {}", command.name());
        self.redo_stack.push(command);
        self.notify();
        true
    }

    /// Re-run the most recently undone command. Returns false if there was
    /// nothing to redo.
    pub fn redo(&mut self, scene: &mut dyn SceneStore) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        command.execute(scene);
        tracing::debug!("Redid {}", command.name());
        self.undo_stack.push_back(command);
        self.trim();
        self.notify();
        true
    }

    /// Register a listener for stack changes.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(HistoryStatus) + Send + Sync + 'static,
    {
        self.bus.subscribe(
            EventFilter::Categories(vec![EventCategory::History]),
            move |event| {
                if let AppEvent::History(HistoryEvent::Changed(status)) = event {
                    listener(status);
                }
            },
        )
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.back().map(|c| c.name().to_string())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.name().to_string())
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Change the bound, evicting the oldest commands if needed.
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        if self.trim() {
            self.notify();
        }
    }

    /// Forget both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.notify();
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_depth: self.undo_depth(),
            redo_depth: self.redo_depth(),
            undo_description: self.undo_description(),
            redo_description: self.redo_description(),
        }
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    fn trim(&mut self) -> bool {
        let mut evicted = false;
        while self.undo_stack.len() > self.max_depth {
            if let Some(oldest) = self.undo_stack.pop_front() {
                tracing::trace!("Evicted {} from undo stack", oldest.name());
            }
            evicted = true;
        }
        evicted
    }

    fn notify(&self) {
        // No listeners is fine.
        let _ = self
            .bus
            .publish(AppEvent::History(HistoryEvent::Changed(self.status())));
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
