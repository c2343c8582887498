//! # SceneKit
//!
//! Interaction core of a 2D scene editor. Pointer input goes in; undoable
//! edits of a scene of shape, text and image elements come out, together
//! with the selection frame the renderer draws and the runtime URLs it
//! needs for images. Painting itself is left to the host.
//!
//! ## Architecture
//!
//! SceneKit is organized as a workspace with multiple crates:
//!
//! 1. **scenekit-core** - Shared errors, the event bus, basic geometry types
//! 2. **scenekit-designer** - Element model, scene store, commands and undo
//!    history, transform geometry, pointer tools, [`EditorState`]
//! 3. **scenekit-assets** - Asset stores and the reference-counted URL cache
//! 4. **scenekit-settings** - Configuration files
//! 5. **scenekit** - This crate: [`RuntimeUrls`] glue between the editor and the assets,
//!    logging setup and a headless demo binary

pub use scenekit_assets as assets;
pub use scenekit_designer as designer;
pub use scenekit_settings as settings;

pub use scenekit_core::{
    AppEvent, AssetError, AssetEvent, Error, EventBus, EventCategory,
    EventFilter, HistoryEvent, HistoryStatus, Point, Result, SceneError, SelectionEvent,
    SubscriptionId, ToolEvent,
};

pub use scenekit_designer::{
    bounding_box_of, group_resize, resize_from_handle, rotate_about, snap_angle, EditorSettings,
    EditorState, Element, ElementId, ElementKind, ElementPatch, Geometry, HandleKind, History,
    PointerEvent, ResizeHandle, Scene, SceneStore, ToolId,
};

pub use scenekit_assets::{
    AssetCache, AssetLibrary, AssetLoader, AssetStore, FsAssetStore, MemoryAssetStore,
    ObjectUrlLoader, ResolvedAsset, UrlRegistry,
};

pub use scenekit_settings::Config;

use std::collections::HashMap;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - `RUST_LOG` support, falling back to `default_level` (e.g. `"info"`)
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Cache references held on behalf of a scene's image elements.
///
/// An image element with an asset key is bound when it holds exactly one
/// reference for that key. [`sync`](Self::sync) brings the bindings in line
/// with the scene after any edit: references of elements that were deleted,
/// re-keyed or cleared are given back, and unbound images are resolved. A
/// `runtime_url` not backed by a binding, such as one restored from an old
/// snapshot, is treated as stale and replaced.
#[derive(Debug, Default)]
pub struct RuntimeUrls {
    held: HashMap<ElementId, String>,
}

/// What one [`RuntimeUrls::sync`] pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub hydrated: usize,
    pub released: usize,
}

impl RuntimeUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements currently holding a reference.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    pub fn is_bound(&self, id: ElementId) -> bool {
        self.held.contains_key(&id)
    }

    /// Release what the scene no longer needs, then resolve what it lacks.
    ///
    /// Elements whose asset cannot be loaded are logged and left without a
    /// URL; the next sync tries again.
    pub async fn sync(&mut self, scene: &mut Scene, library: &AssetLibrary) -> SyncReport {
        let mut report = SyncReport::default();

        let stale: Vec<ElementId> = self
            .held
            .iter()
            .filter(|(id, key)| match scene.element(**id) {
                Some(element) => {
                    element.asset_key.as_deref() != Some(key.as_str())
                        || element.runtime_url.is_none()
                }
                None => true,
            })
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            if let Some(key) = self.held.remove(&id) {
                library.release(&key);
                report.released += 1;
            }
            if let Some(element) = scene.element_mut(id) {
                element.runtime_url = None;
            }
        }

        let unbound: Vec<(ElementId, String)> = scene
            .elements()
            .iter()
            .filter(|e| e.kind == ElementKind::Image && !self.held.contains_key(&e.id))
            .filter_map(|e| e.asset_key.clone().map(|key| (e.id, key)))
            .collect();
        for (id, key) in unbound {
            let resolved = library.url_for(&key).await;
            let Some(element) = scene.element_mut(id) else {
                if resolved.is_ok() {
                    library.release(&key);
                }
                continue;
            };
            match resolved {
                Ok(url) => {
                    element.runtime_url = Some(url);
                    self.held.insert(id, key);
                    report.hydrated += 1;
                }
                Err(err) => {
                    element.runtime_url = None;
                    tracing::warn!("No runtime URL for element {}: {}", id, err);
                }
            }
        }

        if report != SyncReport::default() {
            tracing::debug!(
                "Runtime URLs: {} hydrated, {} released, {} held",
                report.hydrated,
                report.released,
                self.held.len()
            );
        }
        report
    }

    /// Give back every held reference and clear the URLs still in the
    /// scene. Returns the number released.
    pub fn release_all(&mut self, scene: &mut Scene, library: &AssetLibrary) -> usize {
        let released = self.held.len();
        for (id, key) in self.held.drain() {
            library.release(&key);
            if let Some(element) = scene.element_mut(id) {
                element.runtime_url = None;
            }
        }
        released
    }
}
