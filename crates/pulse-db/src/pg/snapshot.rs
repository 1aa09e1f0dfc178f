//! PostgreSQL snapshot repository implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use pulse_types::{Snapshot, TenantId};
use sqlx::types::Json;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::SnapshotRow;
use crate::repo::SnapshotRepository;

/// PostgreSQL snapshot repository
#[derive(Clone)]
pub struct PgSnapshotRepository {
    pool: PgPool,
}

impl PgSnapshotRepository {
    /// Create a new snapshot repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SnapshotRepository for PgSnapshotRepository {
    async fn upsert(&self, snapshot: &Snapshot) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO snapshots (tenant_id, snapshot_date, source, payload, metrics, captured_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id, snapshot_date)
            DO UPDATE SET source = EXCLUDED.source,
                          payload = EXCLUDED.payload,
                          metrics = EXCLUDED.metrics,
                          captured_at = EXCLUDED.captured_at
            "#,
        )
        .bind(snapshot.tenant_id.as_str())
        .bind(snapshot.date)
        .bind(snapshot.source.as_str())
        .bind(Json(&snapshot.payload))
        .bind(Json(&snapshot.metrics))
        .bind(snapshot.captured_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_in_range(
        &self,
        tenant: &TenantId,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<Vec<Snapshot>> {
        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT tenant_id, snapshot_date, source, payload, metrics, captured_at
            FROM snapshots
            WHERE tenant_id = $1 AND snapshot_date BETWEEN $2 AND $3
            ORDER BY snapshot_date
            "#,
        )
        .bind(tenant.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SnapshotRow::into_snapshot).collect()
    }

    async fn find_latest_before(
        &self,
        tenant: &TenantId,
        date: NaiveDate,
    ) -> DbResult<Option<Snapshot>> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT tenant_id, snapshot_date, source, payload, metrics, captured_at
            FROM snapshots
            WHERE tenant_id = $1 AND snapshot_date < $2
            ORDER BY snapshot_date DESC
            LIMIT 1
            "#,
        )
        .bind(tenant.as_str())
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SnapshotRow::into_snapshot).transpose()
    }

    async fn count_since(&self, tenant: &TenantId, since: NaiveDate) -> DbResult<u64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM snapshots WHERE tenant_id = $1 AND snapshot_date >= $2",
        )
        .bind(tenant.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count.0).unwrap_or(0))
    }
}
