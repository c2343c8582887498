//! # SceneKit Assets
//!
//! Binary assets (imported images) live in an [`AssetStore`] under generated
//! keys. Elements only ever persist the key; at runtime the renderer needs a
//! resolvable URL, which the [`AssetCache`] hands out with reference
//! counting and load coalescing. [`AssetLibrary`] ties the two together.

pub mod cache;
pub mod library;
pub mod loader;
pub mod store;

pub use cache::AssetCache;
pub use library::AssetLibrary;
pub use loader::{AssetLoader, ObjectUrlLoader, ResolvedAsset, UrlRegistry};
pub use store::{generate_asset_key, AssetStore, FsAssetStore, MemoryAssetStore};

pub use scenekit_core::AssetError;
