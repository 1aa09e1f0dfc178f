//! Company types

use serde::{Deserialize, Serialize};

/// Tenant company as described by the billing platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Company ID
    pub id: String,
    /// Display title
    pub title: String,
    /// Creation time (Unix seconds)
    pub created_at: Option<i64>,
}
