//! Pulse Utils - Shared helpers for Pulse binaries

pub mod config;

pub use config::{load_env, optional_var, parse_var, required_var, EnvError};
