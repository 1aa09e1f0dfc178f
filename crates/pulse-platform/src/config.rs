//! Platform client configuration

use std::time::Duration;

/// Billing-platform client configuration
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    /// API key sent as a bearer token
    pub api_key: String,
    /// Base URL, without trailing slash
    pub api_base: String,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Page size for list endpoints
    pub page_size: u32,
    /// Upper bound on pages fetched per list call
    pub max_pages: u32,
}

impl PlatformConfig {
    /// Create a new platform config
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
            page_size: 50,
            max_pages: 1_000,
        }
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the list page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the page limit for list calls
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }
}
