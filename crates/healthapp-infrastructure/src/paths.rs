//! Path management for healthapp configuration and data files.
//!
//! ```text
//! ~/.config/healthapp/          # Config directory
//! └── config.toml               # Application configuration
//!
//! ~/.local/share/healthapp/     # Data directory
//! └── storage.json              # Key/value store (accounts, session)
//! ```
//!
//! Platform directories come from the `dirs` crate (XDG on Linux,
//! `Library/Application Support` on macOS, `AppData` on Windows).

use std::path::PathBuf;

const APP_DIR: &str = "healthapp";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config or data directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for healthapp_core::HealthAppError {
    fn from(err: PathError) -> Self {
        healthapp_core::HealthAppError::config(err.to_string())
    }
}

pub struct HealthAppPaths;

impl HealthAppPaths {
    /// Returns the healthapp configuration directory (e.g. `~/.config/healthapp/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the healthapp data directory (e.g. `~/.local/share/healthapp/`).
    pub fn data_dir() -> Result<PathBuf, PathError> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::HomeDirNotFound)
    }

    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the JSON file backing the key/value store.
    ///
    /// It holds account passwords in plain text; it is created with mode 600
    /// on Unix.
    pub fn storage_file() -> Result<PathBuf, PathError> {
        Ok(Self::data_dir()?.join("storage.json"))
    }
}
