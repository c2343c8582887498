//! Configuration for SceneKit
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats stored in the platform configuration directory.
//!
//! Configuration is organized into logical sections:
//! - History (undo depth)
//! - Tools (resize limits, rotation snapping, duplicate offset)
//! - Assets (URL scheme and key prefix)
//! - Logging

use scenekit_designer::{EditorSettings, Point};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsResult};

/// Undo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Number of undoable commands kept before the oldest is evicted
    pub max_undo_depth: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { max_undo_depth: 50 }
    }
}

/// Pointer tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Smallest width/height a resize can produce
    pub min_element_size: f64,
    /// Rotation snaps to multiples of this many degrees
    pub rotation_snap_step_degrees: f64,
    /// How close (in degrees) a rotation must be to snap
    pub rotation_snap_tolerance_degrees: f64,
    /// Floor for group resize scale factors
    pub min_group_scale: f64,
    pub duplicate_offset_x: f64,
    pub duplicate_offset_y: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            min_element_size: 5.0,
            rotation_snap_step_degrees: 45.0,
            rotation_snap_tolerance_degrees: 5.0,
            min_group_scale: 0.01,
            duplicate_offset_x: 20.0,
            duplicate_offset_y: 20.0,
        }
    }
}

/// Asset settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Scheme of minted runtime URLs
    pub url_scheme: String,
    /// Prefix of generated asset keys
    pub key_prefix: String,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            url_scheme: "blob".to_string(),
            key_prefix: "img".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub history: HistorySettings,
    pub tools: ToolSettings,
    pub assets: AssetSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.max_undo_depth == 0 {
            return Err(ConfigError::out_of_range(
                "history.max_undo_depth",
                self.history.max_undo_depth,
            ));
        }

        let tools = &self.tools;
        if !(tools.min_element_size > 0.0) {
            return Err(ConfigError::out_of_range(
                "tools.min_element_size",
                tools.min_element_size,
            ));
        }
        if !(tools.rotation_snap_step_degrees > 0.0) {
            return Err(ConfigError::out_of_range(
                "tools.rotation_snap_step_degrees",
                tools.rotation_snap_step_degrees,
            ));
        }
        if !(tools.rotation_snap_tolerance_degrees >= 0.0
            && tools.rotation_snap_tolerance_degrees < tools.rotation_snap_step_degrees)
        {
            return Err(ConfigError::out_of_range(
                "tools.rotation_snap_tolerance_degrees",
                tools.rotation_snap_tolerance_degrees,
            ));
        }
        if !(tools.min_group_scale > 0.0 && tools.min_group_scale <= 1.0) {
            return Err(ConfigError::out_of_range(
                "tools.min_group_scale",
                tools.min_group_scale,
            ));
        }
        if !tools.duplicate_offset_x.is_finite() || !tools.duplicate_offset_y.is_finite() {
            return Err(ConfigError::out_of_range(
                "tools.duplicate_offset",
                format!("{},{}", tools.duplicate_offset_x, tools.duplicate_offset_y),
            ));
        }

        if self.assets.url_scheme.is_empty()
            || !self
                .assets
                .url_scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        {
            return Err(ConfigError::out_of_range(
                "assets.url_scheme",
                &self.assets.url_scheme,
            ));
        }
        if self.assets.key_prefix.is_empty() {
            return Err(ConfigError::out_of_range("assets.key_prefix", "\"\""));
        }

        Ok(())
    }
}

impl From<&Config> for EditorSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_undo_depth: config.history.max_undo_depth,
            min_element_size: config.tools.min_element_size,
            rotation_snap_step: config.tools.rotation_snap_step_degrees,
            rotation_snap_tolerance: config.tools.rotation_snap_tolerance_degrees,
            min_group_scale: config.tools.min_group_scale,
            duplicate_offset: Point::new(
                config.tools.duplicate_offset_x,
                config.tools.duplicate_offset_y,
            ),
        }
    }
}

/// `<config dir>/scenekit/config.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("scenekit").join("config.toml"))
        .ok_or(ConfigError::NoConfigDirectory)
}
