//! Runtime dependency bundle for the payment scheduler.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::SchedulerSleeper;

/// Runtime helpers used while waiting for the next fire instant.
pub struct PaymentSchedulerRuntime {
    /// Async sleep implementation.
    pub sleeper: Arc<dyn SchedulerSleeper>,
}

impl Default for PaymentSchedulerRuntime {
    fn default() -> Self {
        Self {
            sleeper: Arc::new(TokioSleeper),
        }
    }
}

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl SchedulerSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
