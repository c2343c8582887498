//! Reference-counted cache of resolved assets.
//!
//! `acquire` hands out a counted reference to a resolved asset, loading it on
//! first use. Concurrent acquires of a key that is still loading share the
//! one load. The resource is released through the loader when the count
//! drops to zero, or when the key is forcibly removed.
//!
//! Loads run on their own task and are never cancelled. If every reference
//! is released while the load is pending, the load still completes and its
//! resource is released immediately.

use parking_lot::Mutex;
use scenekit_core::{AppEvent, AssetError, AssetEvent, EventBus};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::loader::{AssetLoader, ResolvedAsset};

type LoadResult = Result<ResolvedAsset, AssetError>;

#[derive(Debug)]
struct CacheEntry {
    asset: ResolvedAsset,
    ref_count: usize,
    /// The load that produced this entry.
    load_id: u64,
}

#[derive(Debug)]
struct InFlightLoad {
    load_id: u64,
    /// References handed out while loading; becomes the entry's count.
    pending_refs: usize,
    done: watch::Receiver<Option<LoadResult>>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    in_flight: HashMap<String, InFlightLoad>,
    next_load_id: u64,
}

struct CacheInner {
    loader: Arc<dyn AssetLoader>,
    state: Mutex<CacheState>,
    bus: Option<Arc<EventBus>>,
}

/// Shared handle to the asset cache. Clones refer to the same cache.
#[derive(Clone)]
pub struct AssetCache {
    inner: Arc<CacheInner>,
}

impl AssetCache {
    pub fn new(loader: Arc<dyn AssetLoader>) -> Self {
        Self::build(loader, None)
    }

    /// Cache publishing load/release events on `bus`.
    pub fn with_event_bus(loader: Arc<dyn AssetLoader>, bus: Arc<EventBus>) -> Self {
        Self::build(loader, Some(bus))
    }

    fn build(loader: Arc<dyn AssetLoader>, bus: Option<Arc<EventBus>>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                loader,
                state: Mutex::new(CacheState::default()),
                bus,
            }),
        }
    }

    /// Take a reference to `key`, loading it if needed.
    ///
    /// Every successful call must be paired with one [`release`](Self::release).
    /// A failed load is reported to every caller waiting on it and leaves
    /// nothing cached. Dropping the future before it resolves gives its
    /// reference back.
    pub async fn acquire(&self, key: &str) -> LoadResult {
        let (load_id, done) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;

            if let Some(entry) = state.entries.get_mut(key) {
                entry.ref_count += 1;
                tracing::trace!("Asset {} cache hit ({} refs)", key, entry.ref_count);
                return Ok(entry.asset.clone());
            }

            match state.in_flight.get_mut(key) {
                Some(load) => {
                    load.pending_refs += 1;
                    tracing::trace!("Asset {} joins in-flight load {}", key, load.load_id);
                    (load.load_id, load.done.clone())
                }
                None => {
                    let load_id = state.next_load_id;
                    state.next_load_id += 1;
                    let (tx, rx) = watch::channel(None);
                    state.in_flight.insert(
                        key.to_string(),
                        InFlightLoad {
                            load_id,
                            pending_refs: 1,
                            done: rx.clone(),
                        },
                    );
                    self.spawn_load(key.to_string(), load_id, tx);
                    (load_id, rx)
                }
            }
        };

        let mut waiter = PendingRef {
            cache: self,
            key,
            load_id,
            armed: true,
        };
        let result = waiter.wait(done).await;
        waiter.armed = false;
        result
    }

    /// Give back one reference. The last one releases the resource.
    ///
    /// Releasing during a load gives back a reference the load would have
    /// handed out. Unknown keys are ignored.
    pub fn release(&self, key: &str) {
        self.release_from(key, None);
    }

    /// Give back a reference taken on load `load_id`, or on whatever is
    /// current when `None`. A reference from a load that was removed or
    /// failed no longer counts anywhere and is dropped.
    fn release_from(&self, key: &str, load_id: Option<u64>) {
        let matches = |id: u64| load_id.is_none_or(|wanted| wanted == id);
        let released = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;

            if let Some(entry) = state.entries.get_mut(key).filter(|entry| matches(entry.load_id)) {
                entry.ref_count = entry.ref_count.saturating_sub(1);
                tracing::trace!("Asset {} released ({} refs left)", key, entry.ref_count);
                if entry.ref_count == 0 {
                    state.entries.remove(key).map(|entry| entry.asset)
                } else {
                    None
                }
            } else if let Some(load) = state
                .in_flight
                .get_mut(key)
                .filter(|load| matches(load.load_id))
            {
                load.pending_refs = load.pending_refs.saturating_sub(1);
                tracing::trace!(
                    "Asset {} released while loading ({} pending)",
                    key,
                    load.pending_refs
                );
                None
            } else {
                tracing::debug!("Release of unknown or stale asset {}, ignoring", key);
                None
            }
        };

        if let Some(asset) = released {
            self.inner.release_resource(&asset);
        }
    }

    /// Drop `key` regardless of its reference count.
    ///
    /// A cached resource is released now. A pending load is forgotten: it
    /// still completes, but its resource is released at once and its
    /// waiters receive [`AssetError::Removed`]. Returns whether anything was
    /// cached or loading.
    pub fn remove(&self, key: &str) -> bool {
        let (entry, was_loading) = {
            let mut state = self.inner.state.lock();
            (
                state.entries.remove(key),
                state.in_flight.remove(key).is_some(),
            )
        };

        if let Some(entry) = &entry {
            self.inner.loader.release(&entry.asset);
        }
        let removed = entry.is_some() || was_loading;
        if removed {
            tracing::debug!("Asset {} removed from cache", key);
            self.inner.publish(AssetEvent::Removed {
                key: key.to_string(),
            });
        }
        removed
    }

    /// Current reference count of a cached key. `None` while loading or
    /// when not cached.
    pub fn ref_count(&self, key: &str) -> Option<usize> {
        self.inner
            .state
            .lock()
            .entries
            .get(key)
            .map(|entry| entry.ref_count)
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.inner.state.lock().in_flight.contains_key(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.state.lock().entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().entries.is_empty()
    }

    fn spawn_load(&self, key: String, load_id: u64, tx: watch::Sender<Option<LoadResult>>) {
        let inner = self.inner.clone();
        tokio::spawn(async move {
            tracing::debug!("Loading asset {} (load {})", key, load_id);
            let loaded = inner.loader.load(&key).await;
            let result = inner.finish_load(&key, load_id, loaded);
            tx.send_replace(Some(result));
        });
    }
}

impl std::fmt::Debug for AssetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("AssetCache")
            .field("entries", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish()
    }
}

impl CacheInner {
    /// Settle a finished load and decide what its waiters receive.
    fn finish_load(&self, key: &str, load_id: u64, loaded: LoadResult) -> LoadResult {
        let owned_key = || key.to_string();
        let mut state = self.state.lock();
        let current = state
            .in_flight
            .get(key)
            .is_some_and(|load| load.load_id == load_id);
        let pending_refs = if current {
            state.in_flight.remove(key).map(|load| load.pending_refs)
        } else {
            None
        };

        let (result, orphan, event) = match (loaded, pending_refs) {
            (Ok(asset), Some(refs)) if refs > 0 => {
                tracing::debug!("Asset {} loaded with {} refs", key, refs);
                state.entries.insert(
                    owned_key(),
                    CacheEntry {
                        asset: asset.clone(),
                        ref_count: refs,
                        load_id,
                    },
                );
                (Ok(asset), None, Some(AssetEvent::Loaded { key: owned_key() }))
            }
            (Ok(asset), Some(_)) => {
                tracing::debug!("Asset {} loaded after its last release", key);
                (
                    Err(AssetError::LoadAborted { key: owned_key() }),
                    Some(asset),
                    Some(AssetEvent::Released { key: owned_key() }),
                )
            }
            (Ok(asset), None) => {
                tracing::debug!("Asset {} loaded after removal", key);
                (Err(AssetError::Removed { key: owned_key() }), Some(asset), None)
            }
            (Err(err), Some(_)) => {
                tracing::warn!("Failed to load asset {}: {}", key, err);
                let event = AssetEvent::LoadFailed {
                    key: owned_key(),
                    reason: err.to_string(),
                };
                (Err(err), None, Some(event))
            }
            (Err(err), None) => {
                tracing::debug!("Load of removed asset {} failed: {}", key, err);
                (Err(AssetError::Removed { key: owned_key() }), None, None)
            }
        };
        drop(state);

        if let Some(asset) = orphan {
            self.loader.release(&asset);
        }
        if let Some(event) = event {
            self.publish(event);
        }
        result
    }

    fn release_resource(&self, asset: &ResolvedAsset) {
        self.loader.release(asset);
        self.publish(AssetEvent::Released {
            key: asset.key.clone(),
        });
    }

    fn publish(&self, event: AssetEvent) {
        if let Some(bus) = &self.bus {
            let _ = bus.publish(AppEvent::Asset(event));
        }
    }
}

/// A reference taken for a caller that is still waiting on a load.
struct PendingRef<'a> {
    cache: &'a AssetCache,
    key: &'a str,
    load_id: u64,
    armed: bool,
}

impl PendingRef<'_> {
    async fn wait(&self, mut done: watch::Receiver<Option<LoadResult>>) -> LoadResult {
        let aborted = || AssetError::LoadAborted {
            key: self.key.to_string(),
        };
        match done.wait_for(Option::is_some).await {
            Ok(value) => value.clone().unwrap_or_else(|| Err(aborted())),
            Err(_) => Err(aborted()),
        }
    }
}

impl Drop for PendingRef<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("Acquire of asset {} abandoned", self.key);
            self.cache.release_from(self.key, Some(self.load_id));
        }
    }
}
