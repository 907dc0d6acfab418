//! Exponential-backoff retry for outbound calls.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Errors that can tell whether retrying is worthwhile.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// How many times to retry and how long to wait before the first retry.
///
/// The wait before retry `n` (0-based) is `initial_delay * 2^n`, without
/// jitter, saturating at `Duration::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000)
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
        }
    }

    /// Single attempt, never retried.
    pub const fn no_retry() -> Self {
        Self::new(0, 0)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }

    /// Upper bound on invocations under this policy.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
///
/// Only errors reporting [`Transient::is_transient`] are retried; any other
/// error is returned after the attempt that produced it. When retries are
/// exhausted the last error is returned unchanged.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: RetryPolicy, operation: &str, mut attempt_fn: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + Display,
{
    let mut attempt: u32 = 0;
    loop {
        match attempt_fn().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) if error.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for(attempt);
                warn!(
                    operation,
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts(),
                    delay_ms = duration_ms(delay),
                    error = %error,
                    "transient failure; retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                if error.is_transient() {
                    warn!(operation, attempts = attempt + 1, error = %error, "retries exhausted");
                }
                return Err(error);
            }
        }
    }
}

/// Whole milliseconds for log fields, clamped to `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
