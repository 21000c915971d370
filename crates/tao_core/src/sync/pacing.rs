//! Inter-batch pacing.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends a run between batches.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, duration: Duration);
}

#[async_trait]
impl<P: Pacer + ?Sized> Pacer for &P {
    async fn pause(&self, duration: Duration) {
        (**self).pause(duration).await;
    }
}

/// Sleeps on the Tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        tokio::time::sleep(duration).await;
    }
}
