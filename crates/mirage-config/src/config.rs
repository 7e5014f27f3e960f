//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Registry synchronization settings.
    pub sync: SyncConfig,
    /// Transport edge settings.
    pub network: NetworkConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Registry synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    /// Re-define every item group on the client, not only virtual ones.
    ///
    /// Needed when the client runs other mods that also add groups the
    /// server knows about.
    pub force_group_resync: bool,
    /// Log how long each client synchronization took.
    pub log_sync_time: bool,
    /// Send the unfiltered block-state table after every full sync.
    pub debug_validate_states: bool,
}

/// Transport edge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NetworkConfig {
    /// Maximum framed payload size in bytes.
    pub max_payload_size: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            force_group_resync: false,
            log_sync_time: true,
            debug_validate_states: false,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 1_048_576,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for mirage (e.g. `~/.config/mirage`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("mirage"))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Persistence ---

fn read_file(path: &Path) -> Result<Config, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
    ron::from_str(&text).map_err(ConfigError::ParseError)
}

impl Config {
    /// Reads `config.ron` from `config_dir`, writing the defaults first if the
    /// file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let defaults = Self::default();
            defaults.save(config_dir)?;
            log::info!("Wrote default sync settings to {}", path.display());
            return Ok(defaults);
        }
        let config = read_file(&path)?;
        log::info!("Using sync settings from {}", path.display());
        Ok(config)
    }

    /// Writes `config.ron` into `config_dir`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::new().depth_limit(3))
            .map_err(ConfigError::SerializeError)?;
        std::fs::write(config_dir.join(CONFIG_FILE), text).map_err(ConfigError::WriteError)
    }

    /// Re-reads `config.ron`. `Some` only when the file differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = read_file(&config_dir.join(CONFIG_FILE))?;
        if fresh == *self {
            return Ok(None);
        }
        log::info!("Sync settings changed on disk");
        Ok(Some(fresh))
    }
}
