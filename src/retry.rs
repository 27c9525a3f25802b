//! Exponential-backoff retry for async operations.
//!
//! Every failure is treated as retryable. The delay starts at
//! `initial_delay` and doubles after each failed attempt; there is no jitter
//! and no cap, so keep `max_attempts` small.

use crate::config::RetrySettings;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempt budget and starting delay for [`retry_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of invocations, including the first one.
    pub max_attempts: u32,
    /// Wait before the second attempt. Doubles after every failure.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Total time spent sleeping when the first `failures` attempts fail.
    pub fn total_delay(&self, failures: u32) -> Duration {
        (0..failures).fold(Duration::ZERO, |acc, i| {
            acc.saturating_add(self.initial_delay.saturating_mul(2u32.saturating_pow(i)))
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(1))
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.initial_delay_ms),
        )
    }
}

/// Run `operation` until it succeeds or the policy's attempt budget is spent.
///
/// The error of the final attempt is returned unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if attempt >= policy.max_attempts => {
                warn!(
                    "{} failed after {} attempts: {}",
                    operation_name, attempt, e
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "{} failed on attempt {}/{}: {}. Retrying in {:?}",
                    operation_name, attempt, policy.max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
    }
}
