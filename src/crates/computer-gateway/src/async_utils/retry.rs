//! Retry utilities for daemon calls
//!
//! Provides a bounded retry policy with exponential backoff. Delays are
//! served by an injected [`Sleeper`], never by a hidden timer.

use crate::async_utils::time::Sleeper;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Configuration for retrying failed daemon calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// Delay before the first retry in seconds
    pub base_delay_s: f64,

    /// Multiplier applied to the delay after each retry
    pub backoff_factor: f64,

    /// Upper bound for a single delay in seconds
    pub max_delay_s: f64,

    /// Whether to scale delays by a random factor in [0.5, 1.5]
    pub jitter: bool,
}

impl RetryPolicy {
    /// Create a new retry policy with the given number of retries
    ///
    /// # Example
    ///
    /// ```rust
    /// use computer_gateway::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(2);
    /// assert_eq!(policy.max_attempts(), 3);
    /// ```
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            base_delay_s: 0.3,
            backoff_factor: 2.0,
            max_delay_s: 10.0,
            jitter: false,
        }
    }

    /// Set the delay before the first retry
    pub fn with_base_delay(mut self, seconds: f64) -> Self {
        self.base_delay_s = seconds;
        self
    }

    /// Set the backoff factor
    pub fn with_backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = factor;
        self
    }

    /// Set the maximum delay between retries
    pub fn with_max_delay(mut self, seconds: f64) -> Self {
        self.max_delay_s = seconds;
        self
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Delay to wait after failed attempt `attempt` (0-indexed)
    ///
    /// `base_delay * backoff_factor ^ attempt`, capped at `max_delay`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.base_delay_s * self.backoff_factor.powi(exponent);
        // `f64::min` would pick the cap over NaN
        let capped = if base.is_nan() {
            0.0
        } else {
            base.min(self.max_delay_s)
        };

        let delay = if self.jitter {
            capped * rand::thread_rng().gen_range(0.5..=1.5)
        } else {
            capped
        };

        seconds_to_duration(delay)
    }
}

/// Convert fractional seconds to a duration rounded to the nanosecond.
///
/// Negative, NaN and infinite inputs collapse to zero.
pub(crate) fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_nanos((seconds * 1e9).round() as u64)
    } else {
        Duration::ZERO
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Execute an async operation, retrying failures with backoff
///
/// Makes at most `retries + 1` attempts. Between attempts the sleeper is
/// asked to wait `policy.delay_for(attempt)`. When every attempt fails the
/// last error is returned.
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    retries: usize,
    sleeper: &dyn Sleeper,
    operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    with_retry_if(policy, retries, sleeper, operation, |_| true).await
}

/// Like [`with_retry`], but errors rejected by `should_retry` are returned
/// immediately without sleeping.
pub async fn with_retry_if<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    retries: usize,
    sleeper: &dyn Sleeper,
    mut operation: F,
    should_retry: P,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(attempt = attempt + 1, "Retry succeeded");
                }
                return Ok(result);
            }
            Err(error) if !should_retry(&error) => {
                tracing::debug!(attempt = attempt + 1, error = %error, "Operation failed, not retryable");
                return Err(error);
            }
            Err(error) if attempt >= retries => {
                tracing::warn!(
                    attempts = attempt + 1,
                    error = %error,
                    "Operation failed, retries exhausted"
                );
                return Err(error);
            }
            Err(error) => {
                let delay = policy.delay_for(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = retries + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Operation failed, will retry"
                );
                sleeper.sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
