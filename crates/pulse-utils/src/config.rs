//! Configuration utilities

use std::str::FromStr;

use thiserror::Error;

/// Environment variable errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

/// Load `.env` from the working directory, if present
pub fn load_env() {
    dotenvy::dotenv().ok();
}

/// A variable that must be set and non-empty
pub fn required_var(name: &'static str) -> Result<String, EnvError> {
    optional_var(name).ok_or(EnvError::Missing(name))
}

/// A variable that may be unset; blank values count as unset
pub fn optional_var(name: &'static str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset
pub fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, EnvError> {
    match optional_var(name) {
        Some(raw) => raw.parse().map_err(|_| EnvError::Invalid(name)),
        None => Ok(default),
    }
}
