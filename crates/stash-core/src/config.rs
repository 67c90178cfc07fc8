//! Configuration types.
//!
//! Configuration lives in `<config dir>/stash/config.toml`. Every field has a
//! default, so a missing file or a partial file is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::view::ViewOptions;

/// Runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Appearance settings
    #[serde(default)]
    pub appearance: AppearanceConfig,

    /// View behavior
    #[serde(default)]
    pub behavior: BehaviorConfig,

    /// Library storage
    #[serde(default)]
    pub library: LibraryConfig,
}

/// Appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppearanceConfig {
    /// Theme mode: "light", "dark", or "system"
    #[serde(default)]
    pub theme: ThemeMode,

    /// Accent hue in degrees (0-360).
    #[serde(default = "default_accent_hue")]
    pub accent_hue: f32,
}

fn default_accent_hue() -> f32 {
    210.0
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::default(),
            accent_hue: default_accent_hue(),
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

/// How the view reacts to input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Quiet period before search and folder changes apply.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Items in a folder's "Latest" section.
    #[serde(default = "default_latest_count")]
    pub latest_count: usize,
}

fn default_debounce_ms() -> u64 {
    750
}

fn default_latest_count() -> usize {
    3
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            latest_count: default_latest_count(),
        }
    }
}

/// Where items live on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Library JSON file. Defaults to `<data dir>/stash/library.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Export destination. Defaults to the download directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Folders created for a fresh library.
    #[serde(default = "default_folders")]
    pub folders: Vec<String>,
}

fn default_folders() -> Vec<String> {
    vec!["Notes".to_string(), "Templates".to_string()]
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: None,
            export_dir: None,
            folders: default_folders(),
        }
    }
}

impl LibraryConfig {
    /// Resolved library file path.
    pub fn library_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| data_dir().map(|d| d.join("library.json")))
    }

    /// Resolved export directory.
    pub fn export_dir(&self) -> Option<PathBuf> {
        self.export_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
    }
}

impl AppConfig {
    /// Parse a TOML document.
    pub fn from_toml(source: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(source).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml(&source, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {} - using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Load from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.behavior.latest_count == 0 {
            return Err(ConfigError::Invalid {
                key: "behavior.latest_count",
                message: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=360.0).contains(&self.appearance.accent_hue) {
            return Err(ConfigError::Invalid {
                key: "appearance.accent_hue",
                message: format!("{} is outside 0-360", self.appearance.accent_hue),
            });
        }
        Ok(())
    }

    /// View tunables derived from the behavior section.
    pub fn view_options(&self) -> ViewOptions {
        ViewOptions {
            debounce: Duration::from_millis(self.behavior.debounce_ms),
            latest_count: self.behavior.latest_count,
        }
    }
}

/// Get the config directory path.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stash"))
}

/// Get the path to config.toml.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Get the data directory path.
pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("stash"))
}
