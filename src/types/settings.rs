use serde::{Deserialize, Serialize};

use crate::managers::favorite_overlay::FAVORITES_STORAGE_KEY;

/// Top-level application settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppSettings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Where bookmarks and the local overlay are kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// SQLite database path. `None` uses `bookmarks.db` in the platform data dir.
    pub database_path: Option<String>,
    /// Local key-value file path. `None` uses `local_storage.json` in the platform data dir.
    pub local_storage_path: Option<String>,
    pub favorites_key: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_path: None,
            local_storage_path: None,
            favorites_key: FAVORITES_STORAGE_KEY.to_string(),
        }
    }
}

/// Backend request tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SyncSettings {
    pub request_timeout_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "smartmark=info".to_string(),
        }
    }
}

/// JSON-RPC server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub max_requests_per_second: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            max_requests_per_second: 200,
        }
    }
}
