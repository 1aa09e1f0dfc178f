//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use pulse_types::{Snapshot, TenantId};
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// Tenant repository trait
#[async_trait]
pub trait TenantRepository: Send + Sync {
    /// Find a tenant by ID
    async fn find_by_id(&self, id: &TenantId) -> DbResult<Option<TenantRow>>;

    /// Register a tenant, returning the existing row if already present
    async fn register(&self, tenant: CreateTenant) -> DbResult<TenantRow>;

    /// Set `backfill_completed` and its timestamp, and clear any lease
    async fn mark_backfill_completed(&self, id: &TenantId, at: DateTime<Utc>) -> DbResult<()>;

    /// Record a successful sync with the billing platform
    async fn update_last_sync(&self, id: &TenantId, at: DateTime<Utc>) -> DbResult<()>;

    /// Tenants whose history has been backfilled
    async fn list_with_backfill_completed(&self) -> DbResult<Vec<TenantRow>>;

    /// Tenants still lacking a completed backfill
    async fn list_needing_backfill(&self) -> DbResult<Vec<TenantRow>>;

    /// Take the backfill lease for `holder`.
    ///
    /// Succeeds only when no other holder has a lease expiring after `now`.
    /// Re-acquiring a lease already held by `holder` extends it.
    async fn try_acquire_backfill_lease(
        &self,
        id: &TenantId,
        holder: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DbResult<bool>;

    /// Release the lease if `holder` still owns it
    async fn release_backfill_lease(&self, id: &TenantId, holder: Uuid) -> DbResult<()>;

    /// Persist the outcome of a failed backfill attempt
    async fn record_backfill_failure(
        &self,
        id: &TenantId,
        message: &str,
        at: DateTime<Utc>,
    ) -> DbResult<()>;

    /// Enable or disable daily capture for a tenant
    async fn set_capture_enabled(&self, id: &TenantId, enabled: bool) -> DbResult<()>;
}

/// Create tenant input
#[derive(Debug, Clone)]
pub struct CreateTenant {
    pub id: TenantId,
    pub title: Option<String>,
}

/// Snapshot repository trait
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Insert the snapshot or overwrite the one stored for the same (tenant, date)
    async fn upsert(&self, snapshot: &Snapshot) -> DbResult<()>;

    /// Snapshots with `from <= date <= to`, oldest first
    async fn find_in_range(
        &self,
        tenant: &TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<Snapshot>>;

    /// Most recent snapshot strictly before `date`
    async fn find_latest_before(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
    ) -> DbResult<Option<Snapshot>>;

    /// Number of snapshots dated on or after `since`
    async fn count_since(&self, tenant: &TenantId, since: NaiveDate) -> DbResult<u64>;

    /// Number of snapshots over the `days` full days before today, plus
    /// today itself, so a capture still pending today does not shrink the count
    async fn count_recent(&self, tenant: &TenantId, days: u32) -> DbResult<u64> {
        let today = Utc::now().date_naive();
        let since = today - Duration::days(i64::from(days));
        self.count_since(tenant, since).await
    }
}
