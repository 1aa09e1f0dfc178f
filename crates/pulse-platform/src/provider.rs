//! Billing platform abstraction

use async_trait::async_trait;
use pulse_types::{Company, Membership, Payment, Plan, TenantId};

use crate::PlatformError;

/// Billing platform trait
///
/// Read-only view of one tenant's billing data. Implementations return the
/// platform's current state; memberships come back with `plan` unresolved.
#[async_trait]
pub trait BillingPlatform: Send + Sync {
    /// All memberships of the tenant, any status
    async fn list_memberships(&self, tenant: &TenantId) -> Result<Vec<Membership>, PlatformError>;

    /// All plans of the tenant
    async fn list_plans(&self, tenant: &TenantId) -> Result<Vec<Plan>, PlatformError>;

    /// All payments of the tenant
    async fn list_payments(&self, tenant: &TenantId) -> Result<Vec<Payment>, PlatformError>;

    /// The tenant's company record
    async fn get_company(&self, tenant: &TenantId) -> Result<Company, PlatformError>;
}
