//! Snapshot service - ties together the billing platform, tenant store and
//! snapshot store

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use pulse_db::{SnapshotRepository, TenantRepository, TenantRow};
use pulse_platform::{with_retry, BillingPlatform, PlatformError};
use pulse_types::{Company, Membership, Payment, Plan, TenantId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{compute::resolve_plans, config::CoreConfig, CoreError};

/// Current billing-platform state of one tenant
#[derive(Debug, Clone)]
pub struct TenantData {
    /// Company record
    pub company: Company,
    /// Memberships with plans resolved
    pub memberships: Vec<Membership>,
    /// All plans
    pub plans: Vec<Plan>,
    /// All payments
    pub payments: Vec<Payment>,
}

/// A tenant a batch operation could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantFailure {
    /// Tenant ID as stored
    pub tenant_id: String,
    /// Error message
    pub error: String,
}

/// Summary of a batch run over many tenants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Tenants that were processed
    pub succeeded: usize,
    /// Tenants left untouched because no work was needed
    pub skipped: usize,
    /// Tenants that failed
    pub failures: Vec<TenantFailure>,
}

impl BatchReport {
    /// Number of tenants the batch looked at
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failures.len()
    }
}

/// Per-tenant result inside a batch
pub(crate) enum BatchItem {
    Done,
    Skipped,
    Failed(TenantFailure),
}

/// Snapshot service
///
/// Provides unified interface for:
/// - Daily snapshot capture
/// - Historical backfill with lease-based deduplication
/// - Time-series rollups over stored snapshots
pub struct SnapshotService<T: TenantRepository, S: SnapshotRepository, P: BillingPlatform> {
    pub(crate) config: CoreConfig,
    pub(crate) tenants: Arc<T>,
    pub(crate) snapshots: Arc<S>,
    pub(crate) platform: Arc<P>,
}

impl<T: TenantRepository, S: SnapshotRepository, P: BillingPlatform> Clone
    for SnapshotService<T, S, P>
{
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            tenants: Arc::clone(&self.tenants),
            snapshots: Arc::clone(&self.snapshots),
            platform: Arc::clone(&self.platform),
        }
    }
}

impl<T: TenantRepository, S: SnapshotRepository, P: BillingPlatform> SnapshotService<T, S, P> {
    /// Create a new snapshot service
    pub fn new(config: CoreConfig, tenants: Arc<T>, snapshots: Arc<S>, platform: Arc<P>) -> Self {
        Self {
            config,
            tenants,
            snapshots,
            platform,
        }
    }

    /// Service configuration
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    /// Look up a registered tenant
    pub(crate) async fn load_tenant(&self, tenant: &TenantId) -> Result<TenantRow, CoreError> {
        self.tenants
            .find_by_id(tenant)
            .await?
            .ok_or_else(|| CoreError::NotFound(tenant.to_string()))
    }

    /// Run one upstream call with the configured timeout and retry policy
    async fn call_platform<R, F, Fut>(&self, operation: &'static str, call: F) -> Result<R, CoreError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, PlatformError>>,
    {
        let timeout = self.config.fetch_timeout;

        with_retry(self.config.retry.clone(), || {
            let fut = call();
            async move {
                match tokio::time::timeout(timeout, fut).await {
                    Ok(result) => result,
                    Err(_) => Err(PlatformError::Timeout(timeout)),
                }
            }
        })
        .await
        .map_err(|e| {
            warn!(operation, error = %e, "billing platform call failed");
            CoreError::UpstreamFetch(e)
        })
    }

    /// Fetch the tenant's full current state and resolve plans onto memberships
    pub(crate) async fn fetch_tenant_data(&self, tenant: &TenantId) -> Result<TenantData, CoreError> {
        let platform = self.platform.as_ref();

        let company = self
            .call_platform("get_company", move || platform.get_company(tenant))
            .await?;
        let plans = self
            .call_platform("list_plans", move || platform.list_plans(tenant))
            .await?;
        let mut memberships = self
            .call_platform("list_memberships", move || platform.list_memberships(tenant))
            .await?;
        let payments = self
            .call_platform("list_payments", move || platform.list_payments(tenant))
            .await?;

        resolve_plans(&mut memberships, &plans);

        debug!(
            tenant_id = %tenant,
            memberships = memberships.len(),
            plans = plans.len(),
            payments = payments.len(),
            "fetched tenant data"
        );

        Ok(TenantData {
            company,
            memberships,
            plans,
            payments,
        })
    }

    /// Run `work` for every tenant row with bounded concurrency.
    ///
    /// Failures are collected per tenant and never abort the batch.
    pub(crate) async fn run_batch<'a, F, Fut>(&'a self, rows: Vec<TenantRow>, work: F) -> BatchReport
    where
        F: Fn(TenantId) -> Fut + 'a,
        Fut: Future<Output = Result<bool, CoreError>> + 'a,
    {
        let concurrency = self.config.batch_concurrency.max(1);
        let work = &work;

        let items: Vec<BatchItem> = stream::iter(rows)
            .map(|row| async move {
                let tenant = match row.tenant_id() {
                    Ok(tenant) => tenant,
                    Err(e) => {
                        warn!(tenant_id = %row.id, error = %e, "skipping tenant with invalid id");
                        return BatchItem::Failed(TenantFailure {
                            tenant_id: row.id,
                            error: e.to_string(),
                        });
                    }
                };

                match work(tenant).await {
                    Ok(true) => BatchItem::Done,
                    Ok(false) => BatchItem::Skipped,
                    Err(e) => {
                        warn!(tenant_id = %row.id, error = %e, "tenant failed in batch");
                        BatchItem::Failed(TenantFailure {
                            tenant_id: row.id,
                            error: e.to_string(),
                        })
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for item in items {
            match item {
                BatchItem::Done => report.succeeded += 1,
                BatchItem::Skipped => report.skipped += 1,
                BatchItem::Failed(failure) => report.failures.push(failure),
            }
        }
        report
    }
}
