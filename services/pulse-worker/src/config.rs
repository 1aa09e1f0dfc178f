//! Configuration for the Pulse worker.

use std::time::Duration;

use pulse_core::CoreConfig;
use pulse_db::PoolOptions;
use pulse_platform::PlatformConfig;
use pulse_utils::{parse_var, required_var, EnvError};

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database URL
    pub database_url: String,
    /// Connection pool sizing
    pub pool: PoolOptions,
    /// Billing-platform client configuration
    pub platform: PlatformConfig,
    /// Snapshot service configuration
    pub core: CoreConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Database
        let database_url = required_var("DATABASE_URL")?;
        let max_connections: u32 = parse_var("DATABASE_MAX_CONNECTIONS", 5)?;

        // Billing platform
        let api_key = required_var("PLATFORM_API_KEY")?;
        let api_base = required_var("PLATFORM_API_BASE")?;
        let timeout_secs: u64 = parse_var("PLATFORM_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid("PLATFORM_TIMEOUT_SECS"));
        }

        // Orchestration
        let batch_concurrency: usize = parse_var("BATCH_CONCURRENCY", 2)?;
        let lease_secs: u64 = parse_var("BACKFILL_LEASE_SECS", 30 * 60)?;
        let window_days: u32 = parse_var("BACKFILL_WINDOW_DAYS", 365)?;
        if batch_concurrency == 0 {
            return Err(ConfigError::Invalid("BATCH_CONCURRENCY"));
        }
        if window_days == 0 {
            return Err(ConfigError::Invalid("BACKFILL_WINDOW_DAYS"));
        }

        let request_timeout = Duration::from_secs(timeout_secs);
        let platform =
            PlatformConfig::new(api_base, api_key).with_request_timeout(request_timeout);

        let core = CoreConfig::default()
            .with_fetch_timeout(request_timeout)
            .with_batch_concurrency(batch_concurrency)
            .with_lease_duration(Duration::from_secs(lease_secs))
            .with_backfill_window_days(window_days);

        Ok(Self {
            database_url,
            pool: PoolOptions {
                max_connections: max_connections.max(batch_concurrency as u32),
                ..PoolOptions::default()
            },
            platform,
            core,
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
