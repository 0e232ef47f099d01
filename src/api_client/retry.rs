// Bounded retry with exponential backoff (1s, 2s, ...) around a single fetch attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles after each further failure.
    pub initial_delay: Duration,
    /// When false a timeout is surfaced immediately instead of consuming the budget.
    pub retry_on_timeout: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            retry_on_timeout: true,
        }
    }
}

impl RetryPolicy {
    /// Sleep before the next attempt after `failed_attempt` (1-based) failed.
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(failed_attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }

    pub fn should_retry(&self, err: &FetchError) -> bool {
        match err {
            FetchError::Timeout => self.retry_on_timeout,
            other => other.is_transient(),
        }
    }
}

/// Runs `op` until it succeeds or the attempt budget is spent; returns the last error.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    endpoint: &str,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(endpoint, attempt, "fetch succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(
                    endpoint,
                    attempt,
                    max_attempts,
                    error_kind = e.kind(),
                    error = %e,
                    "fetch attempt failed"
                );
                if attempt >= max_attempts || !policy.should_retry(&e) {
                    return Err(e);
                }
                tokio::time::sleep(policy.backoff(attempt)).await;
                attempt += 1;
            }
        }
    }
}
