//! Backoff and retry for billing-platform calls
//!
//! The platform throttles per API key, so bursts across tenants routinely
//! hit 429s. [`with_retry`] repeats an operation while its error reports
//! itself as transient, sleeping an exponentially growing, jittered delay
//! between attempts. A `Retry-After` hint from the server raises the delay
//! but never past the configured ceiling.
//!
//! ```ignore
//! use pulse_platform::{with_retry, RetryConfig};
//!
//! let retry = RetryConfig::default().with_max_retries(5);
//! let plans = with_retry(retry, || client.list_plans(&tenant)).await?;
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::time::sleep;
use tracing::warn;

use crate::PlatformError;

/// Counter of retried upstream calls.
pub const UPSTREAM_RETRIES_TOTAL: &str = "pulse_upstream_retries_total";

/// Backoff settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Ceiling for any single delay, server hints included
    pub max_backoff: Duration,
    /// Add up to 25% random delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Default backoff: 3 retries from 500 ms up to 30 s
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many times a failed call is repeated
    #[must_use]
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the delay before the first retry
    #[must_use]
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Set the ceiling for any single delay
    #[must_use]
    pub fn with_max_backoff(mut self, backoff: Duration) -> Self {
        self.max_backoff = backoff;
        self
    }

    /// Enable or disable random extra delay
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Backoff before retry number `retry` (0-based), without jitter:
    /// `initial_backoff * 2^retry`, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Decides whether and how long to wait before the next attempt
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay before retry number `retry`, or `None` when the error is
    /// permanent or the retry budget is spent
    pub fn next_delay<E: RetryableError>(&self, retry: u32, err: &E) -> Option<Duration> {
        if retry >= self.config.max_retries || !err.is_retryable() {
            return None;
        }

        let mut delay = self.config.backoff(retry);
        if self.config.jitter {
            delay += jitter(delay);
        }
        if let Some(hint) = err.retry_after() {
            delay = delay.max(hint.min(self.config.max_backoff));
        }
        Some(delay)
    }
}

/// Up to a quarter of `delay`, seeded from the clock
fn jitter(delay: Duration) -> Duration {
    let quarter = delay.as_millis() as u64 / 4;
    if quarter == 0 {
        return Duration::ZERO;
    }
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::from(d.subsec_nanos()))
        .unwrap_or_default();
    Duration::from_millis(seed % quarter)
}

/// Errors that know whether repeating the call can help
pub trait RetryableError {
    fn is_retryable(&self) -> bool;

    /// Minimum wait requested by the server
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl RetryableError for PlatformError {
    fn is_retryable(&self) -> bool {
        PlatformError::is_retryable(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Run `operation` until it succeeds, fails permanently, or runs out of retries
pub async fn with_retry<F, Fut, T, E>(config: RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    let policy = RetryPolicy::new(config);
    let mut retry = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let Some(delay) = policy.next_delay(retry, &err) else {
            return Err(err);
        };

        warn!(
            retry = retry + 1,
            max_retries = policy.config().max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "transient billing platform error, backing off"
        );
        metrics::counter!(UPSTREAM_RETRIES_TOTAL).increment(1);

        sleep(delay).await;
        retry += 1;
    }
}
