//! Historical backfill
//!
//! A tenant moves through `NeedsBackfill -> InProgress -> Completed`. The
//! in-progress state is a persisted lease on the tenant row, so concurrent
//! triggers for the same tenant never fetch or write twice. Completion is
//! one-way; only [`SnapshotService::force_backfill`] rebuilds history after it.

use chrono::{Duration, Utc};
use pulse_db::{SnapshotRepository, TenantRepository, TenantRow};
use pulse_platform::BillingPlatform;
use pulse_types::{Snapshot, SnapshotPayload, SnapshotSource, TenantId};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::compute::{compute_snapshot_metrics, payments_on};
use crate::history::{backfill_window, day_of, end_of_day, memberships_as_of};
use crate::{metrics, BatchReport, CoreError, SnapshotService};

/// Result of a backfill request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BackfillOutcome {
    /// History was already backfilled earlier
    AlreadyCompleted,
    /// Enough recent snapshots exist; tenant marked completed without fetching
    SatisfiedByExistingSnapshots {
        /// Snapshots found in the evidence window
        count: u64,
    },
    /// Another worker holds the backfill lease
    InProgressElsewhere,
    /// History was reconstructed
    Completed {
        /// Daily snapshots written
        days_written: u32,
    },
}

impl BackfillOutcome {
    /// Outcome name for logs and metric labels
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AlreadyCompleted => "already_completed",
            Self::SatisfiedByExistingSnapshots { .. } => "satisfied_by_existing_snapshots",
            Self::InProgressElsewhere => "in_progress_elsewhere",
            Self::Completed { .. } => "completed",
        }
    }

    /// True when this call reconstructed history
    pub const fn did_work(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

impl<T: TenantRepository, S: SnapshotRepository, P: BillingPlatform> SnapshotService<T, S, P> {
    // =========================================================================
    // Entry points
    // =========================================================================

    /// Reconstruct up to a year of daily snapshots for a tenant.
    ///
    /// Returns without any upstream call when the tenant is already
    /// backfilled, when enough recent snapshots already exist, or when
    /// another worker holds the lease.
    #[instrument(skip(self))]
    pub async fn backfill_history(&self, tenant_id: &str) -> Result<BackfillOutcome, CoreError> {
        let tenant = TenantId::parse(tenant_id)?;
        self.backfill_for(&tenant, false).await
    }

    /// Rebuild history even if the tenant is marked completed.
    ///
    /// Still respects a live lease held by another worker.
    #[instrument(skip(self))]
    pub async fn force_backfill(&self, tenant_id: &str) -> Result<BackfillOutcome, CoreError> {
        let tenant = TenantId::parse(tenant_id)?;
        self.backfill_for(&tenant, true).await
    }

    /// Backfill every tenant whose history is not yet completed
    #[instrument(skip(self))]
    pub async fn backfill_all_companies_needing_history(&self) -> Result<BatchReport, CoreError> {
        let rows = self.tenants.list_needing_backfill().await?;
        info!(tenants = rows.len(), "backfilling tenants without history");

        let report = self
            .run_batch(rows, |tenant| async move {
                self.backfill_for(&tenant, false)
                    .await
                    .map(|outcome| outcome.did_work())
            })
            .await;

        info!(
            succeeded = report.succeeded,
            skipped = report.skipped,
            failed = report.failures.len(),
            "backfill batch finished"
        );
        Ok(report)
    }

    // =========================================================================
    // Orchestration
    // =========================================================================

    async fn backfill_for(&self, tenant: &TenantId, force: bool) -> Result<BackfillOutcome, CoreError> {
        let result = self.guarded_backfill(tenant, force).await;
        metrics::record_backfill(result.as_ref().ok());
        match &result {
            Ok(outcome) => info!(tenant_id = %tenant, outcome = outcome.as_str(), "backfill finished"),
            Err(e) => error!(tenant_id = %tenant, error = %e, "backfill failed"),
        }
        result
    }

    async fn guarded_backfill(&self, tenant: &TenantId, force: bool) -> Result<BackfillOutcome, CoreError> {
        let row = self.load_tenant(tenant).await?;

        if !force {
            if let Some(outcome) = self.completion_evidence(tenant, &row).await? {
                return Ok(outcome);
            }
        }

        let holder = Uuid::new_v4();
        let now = Utc::now();
        let lease = Duration::from_std(self.config.lease_duration)
            .map_err(|e| CoreError::Validation(format!("lease duration: {e}")))?;

        let acquired = self
            .tenants
            .try_acquire_backfill_lease(tenant, holder, now, now + lease)
            .await?;
        if !acquired {
            debug!(tenant_id = %tenant, "backfill lease held elsewhere");
            return Ok(BackfillOutcome::InProgressElsewhere);
        }

        let result = match self.leased_backfill(tenant, force).await {
            // Clears the lease as well
            Ok(BackfillOutcome::Completed { days_written }) => self
                .tenants
                .mark_backfill_completed(tenant, Utc::now())
                .await
                .map(|()| BackfillOutcome::Completed { days_written })
                .map_err(CoreError::from),
            other => other,
        };

        match result {
            Ok(outcome @ BackfillOutcome::Completed { .. }) => Ok(outcome),
            Ok(outcome) => {
                self.tenants.release_backfill_lease(tenant, holder).await?;
                Ok(outcome)
            }
            Err(e) => {
                if let Err(record_err) = self
                    .tenants
                    .record_backfill_failure(tenant, &e.to_string(), Utc::now())
                    .await
                {
                    warn!(tenant_id = %tenant, error = %record_err, "failed to record backfill failure");
                }
                if let Err(release_err) = self.tenants.release_backfill_lease(tenant, holder).await {
                    warn!(tenant_id = %tenant, error = %release_err, "failed to release backfill lease");
                }
                Err(e)
            }
        }
    }

    /// Completed flag or enough recent snapshots; marks the tenant completed
    /// in the second case
    async fn completion_evidence(
        &self,
        tenant: &TenantId,
        row: &TenantRow,
    ) -> Result<Option<BackfillOutcome>, CoreError> {
        if row.backfill_completed {
            return Ok(Some(BackfillOutcome::AlreadyCompleted));
        }

        let count = self
            .snapshots
            .count_recent(tenant, self.config.completion_window_days)
            .await?;
        if count >= self.config.completion_threshold {
            info!(tenant_id = %tenant, count, "existing snapshots cover history");
            self.tenants.mark_backfill_completed(tenant, Utc::now()).await?;
            return Ok(Some(BackfillOutcome::SatisfiedByExistingSnapshots { count }));
        }

        Ok(None)
    }

    async fn leased_backfill(&self, tenant: &TenantId, force: bool) -> Result<BackfillOutcome, CoreError> {
        if !force && self.load_tenant(tenant).await?.backfill_completed {
            return Ok(BackfillOutcome::AlreadyCompleted);
        }
        self.reconstruct_history(tenant).await
    }

    // =========================================================================
    // Reconstruction
    // =========================================================================

    /// Fetch once, then write one as-of snapshot per day of the window
    async fn reconstruct_history(&self, tenant: &TenantId) -> Result<BackfillOutcome, CoreError> {
        let data = self.fetch_tenant_data(tenant).await?;

        let now = Utc::now();
        let earliest = data.memberships.iter().filter_map(|m| day_of(m.created_at)).min();
        let (start, end) = backfill_window(now.date_naive(), earliest, self.config.backfill_window_days);

        info!(tenant_id = %tenant, from = %start, to = %end, "reconstructing history");

        let mut previous = match start.pred_opt() {
            Some(day_before) => memberships_as_of(&data.memberships, end_of_day(day_before)),
            None => Vec::new(),
        };
        let mut days_written = 0u32;

        for date in start.iter_days().take_while(|d| *d <= end) {
            let instant = end_of_day(date).min(now);
            let current = memberships_as_of(&data.memberships, instant);
            let payments = payments_on(&data.payments, date);

            let snapshot = Snapshot {
                tenant_id: tenant.clone(),
                date,
                metrics: compute_snapshot_metrics(&current, &previous, &payments, date, instant),
                payload: SnapshotPayload {
                    company: Some(data.company.clone()),
                    memberships: Some(current.clone()),
                    plans: Some(data.plans.clone()),
                    payments: Some(payments),
                },
                source: SnapshotSource::Backfill,
                captured_at: Utc::now(),
            };

            self.snapshots.upsert(&snapshot).await?;
            metrics::record_snapshot_written(SnapshotSource::Backfill);

            previous = current;
            days_written += 1;
        }

        Ok(BackfillOutcome::Completed { days_written })
    }
}

impl<T, S, P> SnapshotService<T, S, P>
where
    T: TenantRepository + 'static,
    S: SnapshotRepository + 'static,
    P: BillingPlatform + 'static,
{
    /// Run [`Self::backfill_history`] on a detached task.
    ///
    /// Completion and failure are both persisted on the tenant row, so the
    /// handle may be dropped.
    pub fn spawn_backfill(&self, tenant_id: &str) -> JoinHandle<Result<BackfillOutcome, CoreError>> {
        let service = self.clone();
        let tenant_id = tenant_id.to_string();
        tokio::spawn(async move { service.backfill_history(&tenant_id).await })
    }
}
