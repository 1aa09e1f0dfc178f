//! Platform errors

use std::time::Duration;

use thiserror::Error;

/// Errors returned by billing-platform calls
#[derive(Error, Debug)]
pub enum PlatformError {
    /// The platform throttled the request
    #[error("rate limited by billing platform")]
    RateLimited {
        /// Wait hinted by the `Retry-After` header
        retry_after: Option<Duration>,
    },

    /// The platform answered with a server error
    #[error("billing platform unavailable: {0}")]
    Unavailable(String),

    /// The request did not complete in time
    #[error("request timeout after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Resource not found on the platform
    #[error("not found: {0}")]
    NotFound(String),

    /// Non-success response not covered above
    #[error("billing platform error {status}: {message}")]
    Api {
        /// HTTP status
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Response could not be decoded into domain records
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Client misconfiguration
    #[error("configuration error: {0}")]
    Config(String),
}

impl PlatformError {
    /// Returns true if the call may succeed when repeated
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::Unavailable(_) => true,
            Self::Timeout(_) => true,
            Self::Transport(_) => true,
            Self::NotFound(_) => false,
            Self::Api { .. } => false,
            Self::Malformed(_) => false,
            Self::Config(_) => false,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(Duration::ZERO)
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
