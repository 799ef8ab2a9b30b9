use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::ResolverConfig;
use crate::storage::StorageStrategy;

/// Application configuration, optionally overridden by `config.json` in
/// the per-user config directory.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageStrategy,
    pub resolver: ResolverConfig,
}

impl AppConfig {
    /// Load the config file if one exists; any read or parse failure is
    /// logged and falls back to defaults.
    pub fn load() -> Self {
        let Some(dirs) = directories::ProjectDirs::from("app", "vibe", "downloader") else {
            return Self::default();
        };
        let path = dirs.config_dir().join("config.json");

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring malformed config");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config");
                Self::default()
            }
        }
    }
}
