//! Pulse Platform - Billing-platform access
//!
//! Abstracts the external billing platform that owns memberships, plans,
//! payments and company records, and provides an HTTP implementation plus
//! retry helpers for its rate-limited API.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_platform::{BillingPlatform, HttpPlatformClient, PlatformConfig};
//!
//! let config = PlatformConfig::new("https://billing.example.com/v2", "api_key_...")
//!     .with_page_size(100);
//!
//! let client = HttpPlatformClient::new(config)?;
//! let memberships = client.list_memberships(&tenant_id).await?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod retry;

pub use config::PlatformConfig;
pub use error::PlatformError;
pub use http::HttpPlatformClient;
pub use provider::BillingPlatform;
pub use retry::{with_retry, RetryConfig, RetryPolicy, RetryableError};
