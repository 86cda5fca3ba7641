//! Viewer configuration
//!
//! Passed from the host page as a plain object; every field is optional.

use serde::{Deserialize, Serialize};

/// Keys under which state is persisted
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageKeys {
    pub last_dance: String,
    pub catalog_cache: String,
    pub working_setlists: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            last_dance: "ceilidh_last_dance_id".to_string(),
            catalog_cache: "ceilidh_catalog_cache".to_string(),
            working_setlists: "ceilidh_working_setlists".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
    pub storage_keys: StorageKeys,
    /// "error", "warn", "info", "debug" or "trace"
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            storage_keys: StorageKeys::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parsed log level; unknown names fall back to `Info`
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', using info", self.log_level);
            log::LevelFilter::Info
        })
    }

    /// Apply the configured level to the global logger
    pub fn apply_log_level(&self) {
        log::set_max_level(self.level_filter());
    }
}
