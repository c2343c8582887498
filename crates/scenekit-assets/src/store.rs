//! Persistent binary storage keyed by asset key.

use async_trait::async_trait;
use parking_lot::RwLock;
use scenekit_core::AssetError;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Key-value storage for asset bytes.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` under `key`, replacing any previous value.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), AssetError>;

    /// Bytes stored under `key`, or `None` if there are none.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AssetError>;

    /// Remove `key`. Returns whether anything was stored.
    async fn delete(&self, key: &str) -> Result<bool, AssetError>;

    async fn contains(&self, key: &str) -> Result<bool, AssetError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// A fresh key of the form `{prefix}_{unix_millis}_{random}`.
pub fn generate_asset_key(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", prefix, millis, &random[..10])
}

/// In-process store, mostly for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryAssetStore {
    assets: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), AssetError> {
        self.assets.write().insert(key.to_string(), bytes);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AssetError> {
        Ok(self.assets.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<bool, AssetError> {
        Ok(self.assets.write().remove(key).is_some())
    }

    async fn contains(&self, key: &str) -> Result<bool, AssetError> {
        Ok(self.assets.read().contains_key(key))
    }
}

/// One file per asset under a root directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    /// Store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, AssetError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(AssetError::Storage {
                reason: format!("invalid asset key '{}'", key),
            });
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), AssetError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Stored asset {} at {}", key, path.display());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AssetError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, AssetError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn contains(&self, key: &str) -> Result<bool, AssetError> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }
}
