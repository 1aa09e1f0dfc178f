//! Mock repositories for testing

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use pulse_db::{CreateTenant, DbError, DbResult, SnapshotRepository, TenantRepository, TenantRow};
use pulse_types::{Snapshot, TenantId};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// In-memory tenant repository for testing
#[derive(Default, Clone)]
pub struct MockTenantRepository {
    tenants: Arc<DashMap<String, TenantRow>>,
    fail_completion: Arc<AtomicBool>,
}

impl MockTenantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a test tenant directly
    pub fn insert_tenant(&self, row: TenantRow) {
        self.tenants.insert(row.id.clone(), row);
    }

    /// Create a fresh tenant row that still needs a backfill
    pub fn create_test_tenant(id: &str) -> TenantRow {
        TenantRow {
            id: id.to_string(),
            title: Some(format!("{id} Inc")),
            capture_enabled: true,
            backfill_completed: false,
            backfill_completed_at: None,
            last_sync_at: None,
            backfill_lease_holder: None,
            backfill_lease_expires_at: None,
            last_backfill_error: None,
            last_backfill_attempt_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Make every `mark_backfill_completed` call fail
    pub fn fail_completion(&self) {
        self.fail_completion.store(true, Ordering::SeqCst);
    }

    /// Current row for a tenant
    pub fn get(&self, id: &str) -> Option<TenantRow> {
        self.tenants.get(id).map(|r| r.value().clone())
    }

    fn sorted(&self, filter: impl Fn(&TenantRow) -> bool) -> Vec<TenantRow> {
        let mut rows: Vec<TenantRow> = self
            .tenants
            .iter()
            .filter(|r| filter(r.value()))
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| a.id.cmp(&b.id));
        rows
    }
}

#[async_trait]
impl TenantRepository for MockTenantRepository {
    async fn find_by_id(&self, id: &TenantId) -> DbResult<Option<TenantRow>> {
        Ok(self.get(id.as_str()))
    }

    async fn register(&self, tenant: CreateTenant) -> DbResult<TenantRow> {
        let row = self
            .tenants
            .entry(tenant.id.as_str().to_string())
            .or_insert_with(|| {
                let mut row = Self::create_test_tenant(tenant.id.as_str());
                row.title = tenant.title.clone();
                row
            })
            .value()
            .clone();
        Ok(row)
    }

    async fn mark_backfill_completed(&self, id: &TenantId, at: DateTime<Utc>) -> DbResult<()> {
        if self.fail_completion.load(Ordering::SeqCst) {
            return Err(DbError::Corrupt("tenants table unavailable".to_string()));
        }
        if let Some(mut row) = self.tenants.get_mut(id.as_str()) {
            row.backfill_completed = true;
            row.backfill_completed_at.get_or_insert(at);
            row.backfill_lease_holder = None;
            row.backfill_lease_expires_at = None;
            row.last_backfill_error = None;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_last_sync(&self, id: &TenantId, at: DateTime<Utc>) -> DbResult<()> {
        if let Some(mut row) = self.tenants.get_mut(id.as_str()) {
            row.last_sync_at = Some(at);
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_with_backfill_completed(&self) -> DbResult<Vec<TenantRow>> {
        Ok(self.sorted(|r| r.backfill_completed))
    }

    async fn list_needing_backfill(&self) -> DbResult<Vec<TenantRow>> {
        Ok(self.sorted(|r| !r.backfill_completed))
    }

    async fn try_acquire_backfill_lease(
        &self,
        id: &TenantId,
        holder: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let Some(mut row) = self.tenants.get_mut(id.as_str()) else {
            return Ok(false);
        };

        let free = !row.has_live_lease(now) || row.backfill_lease_holder == Some(holder);
        if free {
            row.backfill_lease_holder = Some(holder);
            row.backfill_lease_expires_at = Some(expires_at);
            row.last_backfill_attempt_at = Some(now);
        }
        Ok(free)
    }

    async fn release_backfill_lease(&self, id: &TenantId, holder: Uuid) -> DbResult<()> {
        if let Some(mut row) = self.tenants.get_mut(id.as_str()) {
            if row.backfill_lease_holder == Some(holder) {
                row.backfill_lease_holder = None;
                row.backfill_lease_expires_at = None;
            }
        }
        Ok(())
    }

    async fn record_backfill_failure(
        &self,
        id: &TenantId,
        message: &str,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        if let Some(mut row) = self.tenants.get_mut(id.as_str()) {
            row.last_backfill_error = Some(message.to_string());
            row.last_backfill_attempt_at = Some(at);
        }
        Ok(())
    }

    async fn set_capture_enabled(&self, id: &TenantId, enabled: bool) -> DbResult<()> {
        if let Some(mut row) = self.tenants.get_mut(id.as_str()) {
            row.capture_enabled = enabled;
        }
        Ok(())
    }
}

/// In-memory snapshot repository for testing
#[derive(Default, Clone)]
pub struct MockSnapshotRepository {
    snapshots: Arc<DashMap<(String, NaiveDate), Snapshot>>,
    upserts: Arc<AtomicUsize>,
}

impl MockSnapshotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot without counting it as a write
    pub fn insert_snapshot(&self, snapshot: Snapshot) {
        self.snapshots
            .insert((snapshot.tenant_id.as_str().to_string(), snapshot.date), snapshot);
    }

    /// All snapshots of a tenant, oldest first
    pub fn all_for(&self, tenant: &str) -> Vec<Snapshot> {
        let mut snapshots: Vec<Snapshot> = self
            .snapshots
            .iter()
            .filter(|r| r.key().0 == tenant)
            .map(|r| r.value().clone())
            .collect();
        snapshots.sort_by_key(|s| s.date);
        snapshots
    }

    /// Number of `upsert` calls made through the repository trait
    pub fn upsert_count(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotRepository for MockSnapshotRepository {
    async fn upsert(&self, snapshot: &Snapshot) -> DbResult<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.insert_snapshot(snapshot.clone());
        Ok(())
    }

    async fn find_in_range(
        &self,
        tenant: &TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<Snapshot>> {
        Ok(self
            .all_for(tenant.as_str())
            .into_iter()
            .filter(|s| s.date >= from && s.date <= to)
            .collect())
    }

    async fn find_latest_before(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
    ) -> DbResult<Option<Snapshot>> {
        Ok(self
            .all_for(tenant.as_str())
            .into_iter()
            .filter(|s| s.date < date)
            .last())
    }

    async fn count_since(&self, tenant: &TenantId, since: NaiveDate) -> DbResult<u64> {
        Ok(self
            .all_for(tenant.as_str())
            .iter()
            .filter(|s| s.date >= since)
            .count() as u64)
    }
}
