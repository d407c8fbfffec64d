use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use healthapp_core::IdentityStore;
use healthapp_core::config::AppConfig;
use healthapp_core::latency::{Latency, NoLatency};
use healthapp_infrastructure::{ConfigService, HealthAppPaths, JsonFileKeyValueStore, TokioLatency};

use crate::logging;

/// Command-line overrides applied on top of `config.toml`.
#[derive(Debug, Default)]
pub struct BootstrapOptions {
    pub config_path: Option<PathBuf>,
    pub data_file: Option<PathBuf>,
    pub no_delay: bool,
}

pub struct AppBootstrap {
    pub identity: Arc<IdentityStore>,
}

/// Composition root: loads config, installs logging, builds and restores the
/// identity store.
pub fn bootstrap(options: BootstrapOptions) -> Result<AppBootstrap> {
    let config_service = match options.config_path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new().map_err(|e| anyhow!("Failed to locate config: {}", e))?,
    };
    let config = config_service
        .get_config()
        .map_err(|e| anyhow!("Failed to load config: {}", e))?;

    logging::init_tracing(&config.logging.level);
    tracing::debug!("[Bootstrap] Config loaded from {}", config_service.path().display());

    let data_file = resolve_data_file(options.data_file, &config)?;
    tracing::debug!("[Bootstrap] Using storage file {}", data_file.display());

    let latency: Arc<dyn Latency> = if options.no_delay {
        Arc::new(NoLatency)
    } else {
        Arc::new(TokioLatency)
    };

    let identity = IdentityStore::builder(Arc::new(JsonFileKeyValueStore::new(data_file)))
        .with_config(&config)
        .with_latency(latency)
        .build();
    identity.restore();

    Ok(AppBootstrap {
        identity: Arc::new(identity),
    })
}

/// Flag beats `[storage] data_file`, which beats the platform data directory.
fn resolve_data_file(flag: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    if let Some(path) = flag.or_else(|| config.storage.data_file.clone()) {
        return Ok(path);
    }
    HealthAppPaths::storage_file().map_err(|e| anyhow!("Failed to locate data directory: {}", e))
}
