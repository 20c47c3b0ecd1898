//! Bounded retry with exponential backoff for transient platform failures.

use std::{future::Future, time::Duration};

use {rand::Rng, tracing::warn};

use crate::error::{Error, Result};

/// Retry policy for a single logical platform call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based), honouring a
    /// platform-provided `retry_after` hint when present.
    fn delay(&self, attempt: usize, error: &Error) -> Duration {
        let base = match error {
            Error::RateLimited {
                retry_after_ms: Some(ms),
            } => Duration::from_millis(*ms),
            _ => {
                let exp = self.base_delay.saturating_mul(1u32 << attempt.min(16) as u32);
                exp.min(self.max_delay)
            },
        };
        // Up to 25% jitter so restarting replicas don't hammer in lockstep.
        let jitter_ms = rand::rng().random_range(0..=base.as_millis() as u64 / 4);
        base + Duration::from_millis(jitter_ms)
    }
}

/// Run `op`, retrying on transient errors per `policy`. Permanent and
/// fatal-connection errors are returned immediately.
pub async fn retry_transient<T, F, Fut>(policy: RetryPolicy, context: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay(attempt, &e);
                warn!(
                    context,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient platform failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            },
            Err(e) => return Err(e),
        }
    }
}
