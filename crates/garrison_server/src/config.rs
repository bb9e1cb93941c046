//! Configuration management.
//!
//! All configuration is YAML under `config/` at the resource root. Core
//! settings (`garrison.yml`) and the database settings (`database.yml`) are
//! read once at start; per-plugin controller configuration lives under
//! `config/{vendor}/{project}/`. Files that do not exist yet are created
//! with serialized defaults so operators always have something to edit.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BootstrapError;
use crate::graph::PluginName;

/// Directory under the resource root holding every configuration file.
pub const CONFIG_DIR: &str = "config";
/// Core process settings.
pub const CORE_CONFIG_FILE: &str = "garrison.yml";
/// Built-in database controller settings.
pub const DATABASE_CONFIG_FILE: &str = "database.yml";

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map() -> String {
    "garrison".to_string()
}

fn default_game_type() -> String {
    "Garrison".to_string()
}

fn default_automatic() -> bool {
    true
}

/// Process-wide settings read once at bootstrap start.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub migrations: MigrationSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// Log level filter (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Host display settings pushed through the native surface at start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_map")]
    pub map: String,
    #[serde(default = "default_game_type")]
    pub game_type: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            map: default_map(),
            game_type: default_game_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSettings {
    /// Whether pending plugin migrations are applied automatically. When
    /// disabled, a plugin with schema drift aborts the bootstrap.
    #[serde(default = "default_automatic")]
    pub automatic: bool,
}

impl Default for MigrationSettings {
    fn default() -> Self {
        Self {
            automatic: default_automatic(),
        }
    }
}

/// Load a YAML configuration file into `T`. Missing or malformed files are
/// fatal configuration errors.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T, BootstrapError> {
    let raw = fs::read_to_string(path).map_err(|e| BootstrapError::Configuration {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    serde_yml::from_str(&raw).map_err(|e| BootstrapError::Configuration {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

/// Load a YAML configuration file, creating it from `T::default()` first if
/// it does not exist.
pub fn load_or_default<T>(path: &Path) -> Result<T, BootstrapError>
where
    T: DeserializeOwned + Serialize + Default,
{
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BootstrapError::Configuration {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
        }
        let raw =
            serde_yml::to_string(&T::default()).map_err(|e| BootstrapError::Configuration {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;
        fs::write(path, raw).map_err(|e| BootstrapError::Configuration {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        info!("Created default configuration file: {}", path.display());
    }
    load(path)
}

/// Path of a plugin controller's configuration file:
/// `config/{vendor}/{project}/{file_name}.yml` under the resource root.
pub fn plugin_config_path(root: &Path, name: &PluginName, file_name: &str) -> PathBuf {
    root.join(CONFIG_DIR)
        .join(&name.vendor)
        .join(&name.project)
        .join(format!("{file_name}.yml"))
}
