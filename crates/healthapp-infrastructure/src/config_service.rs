//! Configuration service implementation.
//!
//! Loads `AppConfig` from `config.toml` (by default
//! `~/.config/healthapp/config.toml`) and caches it.

use crate::paths::HealthAppPaths;
use healthapp_core::config::AppConfig;
use healthapp_core::error::{HealthAppError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Configuration service that loads and caches the app configuration.
///
/// A missing or blank file yields the defaults; a malformed file is an error
/// rather than a silent fallback.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the default config path.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(HealthAppPaths::config_file()?))
    }

    /// Creates a ConfigService for a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<AppConfig> {
        if let Ok(cached) = self.config.read() {
            if let Some(ref config) = *cached {
                return Ok(config.clone());
            }
        }

        let loaded = Self::load_from(&self.path)?;

        if let Ok(mut cache) = self.config.write() {
            *cache = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut cache) = self.config.write() {
            *cache = None;
        }
    }

    fn load_from(path: &Path) -> Result<AppConfig> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(AppConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            HealthAppError::config(format!("Invalid config at {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        assert_eq!(service.get_config().unwrap(), AppConfig::default());
    }

    #[test]
    fn test_loads_and_caches() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[auth]\nlatency_ms = 5\n").unwrap();

        let service = ConfigService::with_path(path.clone());
        assert_eq!(service.get_config().unwrap().auth.latency_ms, 5);

        fs::write(&path, "[auth]\nlatency_ms = 50\n").unwrap();
        assert_eq!(service.get_config().unwrap().auth.latency_ms, 5);

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().auth.latency_ms, 50);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[auth\nlatency_ms = ").unwrap();

        let err = ConfigService::with_path(path).get_config().unwrap_err();
        assert!(matches!(err, HealthAppError::Config(_)));
    }
}
