//! Data path resolution and `star.toml` loading.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::dependency::DEFAULT_MAX_DEPTH;

pub const CONFIG_FILE: &str = "star.toml";
pub const DATA_PATH_ENV: &str = "STAR_DATA_PATH";
pub const AVATAR_ENV: &str = "STAR_AVATAR_ID";

/// Settings read from `{data_path}/star.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    /// Root holding one folder per installed plugin; relative to the data path unless absolute.
    pub plugins_installed_path: PathBuf,
    /// Bound on nested creations while adding dependencies.
    pub max_dependency_depth: usize,
    /// Instruction budget for one plugin run; unbounded when absent.
    pub plugin_fuel: Option<u64>,
    /// Handed to every plugin as JSON.
    pub plugin_config: toml::Table,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            plugins_installed_path: PathBuf::from("plugins/installed"),
            max_dependency_depth: DEFAULT_MAX_DEPTH,
            plugin_fuel: None,
            plugin_config: toml::Table::new(),
        }
    }
}

impl StarConfig {
    pub fn plugins_root(&self, data_path: &Path) -> PathBuf {
        if self.plugins_installed_path.is_absolute() {
            self.plugins_installed_path.clone()
        } else {
            data_path.join(&self.plugins_installed_path)
        }
    }

    pub fn plugin_config_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.plugin_config)
            .unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }
}

/// Data path priority: explicit path > STAR_DATA_PATH env > ./.star (if exists) > ~/.star
pub fn resolve_data_path(explicit_path: Option<PathBuf>) -> PathBuf {
    explicit_path
        .or_else(|| std::env::var(DATA_PATH_ENV).ok().map(PathBuf::from))
        .or_else(|| {
            let local_path = Path::new(".star");
            if local_path.is_dir() {
                Some(local_path.to_path_buf())
            } else {
                None
            }
        })
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(".star"))
                .unwrap_or_else(|| PathBuf::from(".star"))
        })
}

/// Load `star.toml`, falling back to defaults when it is missing or malformed.
pub fn load_config(data_path: &Path) -> StarConfig {
    let config_path = data_path.join(CONFIG_FILE);
    if !config_path.exists() {
        return StarConfig::default();
    }

    match std::fs::read_to_string(&config_path) {
        Ok(contents) => match toml::from_str::<StarConfig>(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse {}: {}. Using default.",
                    config_path.display(),
                    e
                );
                StarConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                "Failed to read {}: {}. Using default.",
                config_path.display(),
                e
            );
            StarConfig::default()
        }
    }
}

/// Caller id forced through STAR_AVATAR_ID, if set and valid.
pub fn avatar_override() -> Option<Uuid> {
    let raw = std::env::var(AVATAR_ENV).ok()?;
    match Uuid::parse_str(raw.trim()) {
        Ok(id) => Some(id),
        Err(e) => {
            tracing::warn!("Ignoring {}={}: {}", AVATAR_ENV, raw, e);
            None
        }
    }
}
