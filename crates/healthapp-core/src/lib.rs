pub mod account;
pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod latency;
pub mod storage;

// Re-export common types
pub use error::{HealthAppError, Result};
pub use identity::{AppGate, AuthSnapshot, IdentityStore, Session};
pub use storage::{KeyValueStore, StorageKeys};
