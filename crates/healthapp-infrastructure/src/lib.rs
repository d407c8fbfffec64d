pub mod config_service;
pub mod latency;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::latency::TokioLatency;
pub use crate::paths::HealthAppPaths;
pub use crate::storage::{JsonFileKeyValueStore, MemoryKeyValueStore};
