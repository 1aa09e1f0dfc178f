//! Tenant types

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// Maximum accepted length for a tenant identifier
pub const MAX_TENANT_ID_LEN: usize = 128;

/// Identifier of a tenant company on the billing platform (e.g. `biz_XXXX`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Parse and validate a tenant identifier
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TypeError::EmptyTenantId);
        }
        if s.len() > MAX_TENANT_ID_LEN {
            return Err(TypeError::TenantIdTooLong(s.len()));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(TypeError::InvalidTenantId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Borrow the raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
