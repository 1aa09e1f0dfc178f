//! Configuration types for the snapshot service

use std::time::Duration;

use pulse_platform::RetryConfig;

/// Snapshot service configuration
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Timeout applied to every individual upstream call
    pub fetch_timeout: Duration,
    /// Backoff policy for retryable upstream failures
    pub retry: RetryConfig,
    /// Tenants processed concurrently by batch operations
    pub batch_concurrency: usize,
    /// How long a backfill lease stays valid
    pub lease_duration: Duration,
    /// Days of history a backfill reconstructs, today included
    pub backfill_window_days: u32,
    /// Recent snapshots that count as evidence of an earlier backfill
    pub completion_threshold: u64,
    /// Trailing days searched for that evidence
    pub completion_window_days: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            batch_concurrency: 2,
            lease_duration: Duration::from_secs(30 * 60), // 30 minutes
            backfill_window_days: 365,
            completion_threshold: 30,
            completion_window_days: 30,
        }
    }
}

impl CoreConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-call upstream timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set batch concurrency (at least 1)
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Set the backfill lease duration
    pub fn with_lease_duration(mut self, duration: Duration) -> Self {
        self.lease_duration = duration;
        self
    }

    /// Set the backfill window (at least 1 day)
    pub fn with_backfill_window_days(mut self, days: u32) -> Self {
        self.backfill_window_days = days.max(1);
        self
    }

    /// Set the snapshot count that marks a tenant as already backfilled
    pub fn with_completion_threshold(mut self, threshold: u64) -> Self {
        self.completion_threshold = threshold;
        self
    }
}
