//! Asset import, lookup and deletion for one editor session.

use scenekit_core::{AssetError, EventBus};
use std::sync::Arc;

use crate::cache::AssetCache;
use crate::loader::{ObjectUrlLoader, UrlRegistry};
use crate::store::{generate_asset_key, AssetStore, MemoryAssetStore};

/// Pairs an [`AssetStore`] with the [`AssetCache`] that serves its URLs.
#[derive(Clone)]
pub struct AssetLibrary {
    store: Arc<dyn AssetStore>,
    cache: AssetCache,
    key_prefix: String,
}

impl AssetLibrary {
    pub fn new(store: Arc<dyn AssetStore>, cache: AssetCache) -> Self {
        Self {
            store,
            cache,
            key_prefix: "img".to_string(),
        }
    }

    /// Library over `store` resolving keys to object URLs of `scheme`.
    ///
    /// Returns the URL registry as well so the renderer can read the bytes
    /// behind each URL.
    pub fn with_object_urls(
        store: Arc<dyn AssetStore>,
        scheme: &str,
        bus: Option<Arc<EventBus>>,
    ) -> (Self, Arc<UrlRegistry>) {
        let loader = ObjectUrlLoader::new(store.clone()).with_scheme(scheme);
        let registry = loader.registry().clone();
        let loader = Arc::new(loader);
        let cache = match bus {
            Some(bus) => AssetCache::with_event_bus(loader, bus),
            None => AssetCache::new(loader),
        };
        (Self::new(store, cache), registry)
    }

    /// In-memory library with `blob:` URLs.
    pub fn in_memory() -> (Self, Arc<UrlRegistry>) {
        Self::with_object_urls(Arc::new(MemoryAssetStore::new()), "blob", None)
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn AssetStore> {
        &self.store
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Store `bytes` under a freshly generated key and return the key.
    pub async fn import(&self, bytes: Vec<u8>) -> Result<String, AssetError> {
        let key = generate_asset_key(&self.key_prefix);
        let size = bytes.len();
        self.store.put(&key, bytes).await?;
        tracing::info!("Imported asset {} ({} bytes)", key, size);
        Ok(key)
    }

    /// Runtime URL for `key`. Pair with [`release`](Self::release).
    pub async fn url_for(&self, key: &str) -> Result<String, AssetError> {
        self.cache.acquire(key).await.map(|asset| asset.url)
    }

    pub fn release(&self, key: &str) {
        self.cache.release(key);
    }

    /// Delete the asset outright, revoking its URL even if it is in use.
    /// Returns whether the store held it.
    pub async fn delete(&self, key: &str) -> Result<bool, AssetError> {
        self.cache.remove(key);
        let deleted = self.store.delete(key).await?;
        tracing::info!("Deleted asset {}", key);
        Ok(deleted)
    }
}

impl std::fmt::Debug for AssetLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLibrary")
            .field("cache", &self.cache)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}
