//! SceneKit Settings Crate
//!
//! Loads, validates and saves the editor configuration, and turns it into
//! the [`EditorSettings`](scenekit_designer::EditorSettings) the editor runs with.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, AssetSettings, Config, HistorySettings, LoggingSettings, ToolSettings,
};
pub use error::{ConfigError, SettingsError, SettingsResult};
