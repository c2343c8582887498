//! Resolving asset keys to runtime URLs.

use async_trait::async_trait;
use parking_lot::RwLock;
use scenekit_core::AssetError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::store::AssetStore;

/// A loaded asset: the key it was loaded for and the URL the renderer uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub key: String,
    pub url: String,
}

/// Loads assets and releases what it loaded.
///
/// The cache guarantees `release` is called exactly once for every
/// successful `load`.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, key: &str) -> Result<ResolvedAsset, AssetError>;

    fn release(&self, asset: &ResolvedAsset);
}

/// Live runtime URLs and the bytes behind them.
///
/// Stands in for a browser-style object URL table: a minted URL resolves to
/// its bytes until it is revoked.
#[derive(Debug, Default)]
pub struct UrlRegistry {
    live: RwLock<HashMap<String, Arc<[u8]>>>,
    minted: AtomicUsize,
    revoked: AtomicUsize,
}

impl UrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under a fresh `{scheme}:scenekit/{uuid}` URL.
    pub fn mint(&self, scheme: &str, bytes: Arc<[u8]>) -> String {
        let url = format!("{}:scenekit/{}", scheme, uuid::Uuid::new_v4());
        self.live.write().insert(url.clone(), bytes);
        self.minted.fetch_add(1, Ordering::SeqCst);
        url
    }

    /// Returns false if the URL was not live.
    pub fn revoke(&self, url: &str) -> bool {
        let removed = self.live.write().remove(url).is_some();
        if removed {
            self.revoked.fetch_add(1, Ordering::SeqCst);
        }
        removed
    }

    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        self.live.read().get(url).cloned()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.live.read().contains_key(url)
    }

    pub fn live_count(&self) -> usize {
        self.live.read().len()
    }

    pub fn minted_count(&self) -> usize {
        self.minted.load(Ordering::SeqCst)
    }

    pub fn revoked_count(&self) -> usize {
        self.revoked.load(Ordering::SeqCst)
    }
}

/// Reads bytes from an [`AssetStore`] and mints an object URL for them.
pub struct ObjectUrlLoader {
    store: Arc<dyn AssetStore>,
    registry: Arc<UrlRegistry>,
    scheme: String,
}

impl ObjectUrlLoader {
    pub fn new(store: Arc<dyn AssetStore>) -> Self {
        Self {
            store,
            registry: Arc::new(UrlRegistry::new()),
            scheme: "blob".to_string(),
        }
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Share an existing registry, e.g. one the renderer reads from.
    pub fn with_registry(mut self, registry: Arc<UrlRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &Arc<UrlRegistry> {
        &self.registry
    }
}

impl std::fmt::Debug for ObjectUrlLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectUrlLoader")
            .field("scheme", &self.scheme)
            .field("live_urls", &self.registry.live_count())
            .finish()
    }
}

#[async_trait]
impl AssetLoader for ObjectUrlLoader {
    async fn load(&self, key: &str) -> Result<ResolvedAsset, AssetError> {
        let bytes = self
            .store
            .get(key)
            .await?
            .ok_or_else(|| AssetError::NotFound {
                key: key.to_string(),
            })?;
        let url = self.registry.mint(&self.scheme, Arc::from(bytes));
        tracing::debug!("Minted {} for asset {}", url, key);
        Ok(ResolvedAsset {
            key: key.to_string(),
            url,
        })
    }

    fn release(&self, asset: &ResolvedAsset) {
        if self.registry.revoke(&asset.url) {
            tracing::debug!("Revoked {} for asset {}", asset.url, asset.key);
        } else {
            tracing::warn!("URL {} for asset {} was not live", asset.url, asset.key);
        }
    }
}
