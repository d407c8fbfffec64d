//! Application configuration model.
//!
//! Loaded from `config.toml` by the infrastructure `ConfigService`. Every
//! section and field has a default, so an empty or partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::storage::StorageKeys;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// `[auth]` section.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Artificial delay before register/login resolve, in milliseconds
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Placeholder token written alongside the session record
    #[serde(default = "default_token")]
    pub token: String,
}

pub const DEFAULT_SESSION_TOKEN: &str = "fake-jwt-token";

fn default_latency_ms() -> u64 {
    1000
}

fn default_token() -> String {
    DEFAULT_SESSION_TOKEN.to_string()
}

impl AuthSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            token: default_token(),
        }
    }
}

/// `[storage]` section.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Prefix for the `_users`, `_user` and `_token` keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Overrides the JSON file backing the key/value store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

fn default_key_prefix() -> String {
    StorageKeys::DEFAULT_PREFIX.to_string()
}

impl StorageSettings {
    pub fn keys(&self) -> StorageKeys {
        StorageKeys::with_prefix(&self.key_prefix)
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            data_file: None,
        }
    }
}

/// `[logging]` section.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "healthapp=info,warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
