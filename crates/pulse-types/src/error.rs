//! Common error types

use thiserror::Error;

/// Errors raised while constructing domain values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Tenant identifier is empty
    #[error("tenant id must not be empty")]
    EmptyTenantId,

    /// Tenant identifier is longer than the allowed maximum
    #[error("tenant id too long: {0} characters")]
    TenantIdTooLong(usize),

    /// Tenant identifier contains characters outside `[A-Za-z0-9_-]`
    #[error("tenant id contains invalid characters: {0}")]
    InvalidTenantId(String),

    /// Granularity name not recognised
    #[error("unknown granularity: {0}")]
    UnknownGranularity(String),
}
