//! Daily snapshot capture

use chrono::Utc;
use pulse_db::{SnapshotRepository, TenantRepository};
use pulse_platform::BillingPlatform;
use pulse_types::{Snapshot, SnapshotPayload, SnapshotSource, TenantId};
use tracing::{info, instrument};

use crate::{compute::{compute_snapshot_metrics, payments_on}, metrics, BatchReport, CoreError, SnapshotService};

impl<T: TenantRepository, S: SnapshotRepository, P: BillingPlatform> SnapshotService<T, S, P> {
    /// Capture today's snapshot for one tenant.
    ///
    /// Overwrites any snapshot already stored for today.
    #[instrument(skip(self))]
    pub async fn capture_snapshot(&self, tenant_id: &str) -> Result<Snapshot, CoreError> {
        let tenant = TenantId::parse(tenant_id)?;
        let result = self.capture_for(&tenant).await;
        metrics::record_capture(result.is_ok());
        result
    }

    /// Capture today's snapshot for every tenant with completed history and
    /// capture enabled
    #[instrument(skip(self))]
    pub async fn capture_all_snapshots(&self) -> Result<BatchReport, CoreError> {
        let rows: Vec<_> = self
            .tenants
            .list_with_backfill_completed()
            .await?
            .into_iter()
            .filter(|row| row.capture_enabled)
            .collect();

        info!(tenants = rows.len(), "capturing daily snapshots");

        let report = self
            .run_batch(rows, |tenant| async move {
                let result = self.capture_for(&tenant).await;
                metrics::record_capture(result.is_ok());
                result.map(|_| true)
            })
            .await;

        info!(
            succeeded = report.succeeded,
            failed = report.failures.len(),
            "daily capture finished"
        );
        Ok(report)
    }

    async fn capture_for(&self, tenant: &TenantId) -> Result<Snapshot, CoreError> {
        self.load_tenant(tenant).await?;

        let data = self.fetch_tenant_data(tenant).await?;
        let now = Utc::now();
        let today = now.date_naive();

        let previous = self
            .snapshots
            .find_latest_before(tenant, today)
            .await?
            .and_then(|s| s.payload.memberships)
            .unwrap_or_default();

        let metrics = compute_snapshot_metrics(
            &data.memberships,
            &previous,
            &payments_on(&data.payments, today),
            today,
            now,
        );

        let snapshot = Snapshot {
            tenant_id: tenant.clone(),
            date: today,
            payload: SnapshotPayload {
                company: Some(data.company),
                memberships: Some(data.memberships),
                plans: Some(data.plans),
                payments: Some(data.payments),
            },
            metrics,
            source: SnapshotSource::Capture,
            captured_at: now,
        };

        self.snapshots.upsert(&snapshot).await?;
        metrics::record_snapshot_written(SnapshotSource::Capture);
        self.tenants.update_last_sync(tenant, now).await?;

        info!(
            tenant_id = %tenant,
            date = %today,
            mrr = %snapshot.metrics.mrr.total,
            active = snapshot.metrics.subscribers.active,
            "snapshot captured"
        );

        Ok(snapshot)
    }
}
