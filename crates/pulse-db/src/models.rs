//! Database row models
//!
//! These types map directly to database rows using SQLx's FromRow derive.

use chrono::{DateTime, NaiveDate, Utc};
use pulse_types::{Snapshot, SnapshotMetrics, SnapshotPayload, SnapshotSource, TenantId, TypeError};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::{DbError, DbResult};

/// Tenant row from the database
#[derive(Debug, Clone, FromRow)]
pub struct TenantRow {
    pub id: String,
    pub title: Option<String>,
    pub capture_enabled: bool,
    pub backfill_completed: bool,
    pub backfill_completed_at: Option<DateTime<Utc>>,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub backfill_lease_holder: Option<Uuid>,
    pub backfill_lease_expires_at: Option<DateTime<Utc>>,
    pub last_backfill_error: Option<String>,
    pub last_backfill_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantRow {
    /// Convert to domain TenantId
    pub fn tenant_id(&self) -> Result<TenantId, TypeError> {
        TenantId::parse(&self.id)
    }

    /// Whether a backfill lease is held and not yet expired at `now`
    pub fn has_live_lease(&self, now: DateTime<Utc>) -> bool {
        self.backfill_lease_holder.is_some()
            && self.backfill_lease_expires_at.is_some_and(|exp| exp > now)
    }
}

/// Snapshot row from the database
#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub tenant_id: String,
    pub snapshot_date: NaiveDate,
    pub source: String,
    pub payload: Json<SnapshotPayload>,
    pub metrics: Json<SnapshotMetrics>,
    pub captured_at: DateTime<Utc>,
}

impl SnapshotRow {
    /// Convert to the domain snapshot
    pub fn into_snapshot(self) -> DbResult<Snapshot> {
        let tenant_id = TenantId::parse(&self.tenant_id)
            .map_err(|e| DbError::Corrupt(format!("snapshot tenant id: {e}")))?;
        let source = match self.source.as_str() {
            "capture" => SnapshotSource::Capture,
            "backfill" => SnapshotSource::Backfill,
            other => return Err(DbError::Corrupt(format!("snapshot source: {other}"))),
        };

        Ok(Snapshot {
            tenant_id,
            date: self.snapshot_date,
            payload: self.payload.0,
            metrics: self.metrics.0,
            source,
            captured_at: self.captured_at,
        })
    }
}
