//! Simulated request latency.
//!
//! Register and login pause before touching storage so sign-in screens can
//! show a busy indicator. The pause is injected so tests can skip it.

use async_trait::async_trait;
use std::time::Duration;

/// Waits out an artificial delay.
#[async_trait]
pub trait Latency: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Resolves immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLatency;

#[async_trait]
impl Latency for NoLatency {
    async fn wait(&self, _duration: Duration) {}
}
