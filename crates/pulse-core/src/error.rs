//! Core service errors

use pulse_db::DbError;
use pulse_platform::PlatformError;
use pulse_types::TypeError;
use thiserror::Error;

/// Errors returned by capture, backfill and rollup operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// Billing platform call failed, timed out or returned unusable data
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[from] PlatformError),

    /// Snapshot or tenant store failure
    #[error("persistence error: {0}")]
    Persistence(#[from] DbError),

    /// Tenant is not registered
    #[error("tenant not found: {0}")]
    NotFound(String),

    /// Caller supplied an invalid argument
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Returns true if repeating the operation later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::UpstreamFetch(e) => e.is_retryable(),
            Self::Persistence(_) => false,
            Self::NotFound(_) => false,
            Self::Validation(_) => false,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<TypeError> for CoreError {
    fn from(err: TypeError) -> Self {
        Self::Validation(err.to_string())
    }
}
