//! Outbound delivery with bounded retry.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::Transport;
use crate::error::GraphError;
use crate::types::SendResponse;

/// Retry settings for [`Delivery::send_with_retry`].
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Backoff unit. After failed attempt `n` the wait is `2^n * base_delay`.
    pub base_delay: Duration,
    /// Stop immediately on 400/401/403 instead of retrying them.
    pub fail_fast: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            fail_fast: false,
        }
    }
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (one-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
    }
}

/// Sends replies through a [`Transport`].
#[derive(Clone)]
pub struct Delivery {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl Delivery {
    /// Create a delivery service.
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Get the retry policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Send once.
    pub async fn send(&self, recipient_id: &str, text: &str) -> Result<SendResponse, GraphError> {
        self.transport.send(recipient_id, text).await
    }

    /// Send with up to `policy.max_attempts` attempts.
    ///
    /// No wait precedes the first attempt; after failed attempt `n` the next
    /// one waits `2^n` backoff units. The last error is returned once all
    /// attempts fail.
    pub async fn send_with_retry(
        &self,
        recipient_id: &str,
        text: &str,
    ) -> Result<SendResponse, GraphError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("Delivery attempt {} of {} to {}", attempt, max_attempts, recipient_id);

            let err = match self.transport.send(recipient_id, text).await {
                Ok(sent) => return Ok(sent),
                Err(err) => err,
            };

            warn!(
                "Delivery attempt {} to {} failed: {} (status={:?})",
                attempt,
                recipient_id,
                err,
                err.status()
            );

            if attempt >= max_attempts {
                return Err(err);
            }
            if self.policy.fail_fast && err.is_permanent() {
                debug!("Not retrying permanent failure for {}", recipient_id);
                return Err(err);
            }

            let delay = self.policy.backoff(attempt);
            debug!("Waiting {:?} before next delivery attempt", delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
