//! Timer-backed request latency.

use async_trait::async_trait;
use healthapp_core::latency::Latency;
use std::time::Duration;

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioLatency;

#[async_trait]
impl Latency for TokioLatency {
    async fn wait(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
