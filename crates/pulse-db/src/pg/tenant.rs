//! PostgreSQL tenant repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pulse_types::TenantId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::TenantRow;
use crate::repo::{CreateTenant, TenantRepository};

const TENANT_COLUMNS: &str = r#"
    id, title, capture_enabled, backfill_completed, backfill_completed_at, last_sync_at,
    backfill_lease_holder, backfill_lease_expires_at, last_backfill_error,
    last_backfill_attempt_at, created_at, updated_at
"#;

/// PostgreSQL tenant repository
#[derive(Clone)]
pub struct PgTenantRepository {
    pool: PgPool,
}

impl PgTenantRepository {
    /// Create a new tenant repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PgTenantRepository {
    async fn find_by_id(&self, id: &TenantId) -> DbResult<Option<TenantRow>> {
        let tenant = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    async fn register(&self, tenant: CreateTenant) -> DbResult<TenantRow> {
        sqlx::query(
            r#"
            INSERT INTO tenants (id, title)
            VALUES ($1, $2)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(tenant.id.as_str())
        .bind(&tenant.title)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE id = $1"
        ))
        .bind(tenant.id.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn mark_backfill_completed(&self, id: &TenantId, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE tenants
            SET backfill_completed = TRUE,
                backfill_completed_at = COALESCE(backfill_completed_at, $2),
                backfill_lease_holder = NULL,
                backfill_lease_expires_at = NULL,
                last_backfill_error = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_last_sync(&self, id: &TenantId, at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("UPDATE tenants SET last_sync_at = $1, updated_at = NOW() WHERE id = $2")
            .bind(at)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_with_backfill_completed(&self) -> DbResult<Vec<TenantRow>> {
        let tenants = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE backfill_completed = TRUE ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    async fn list_needing_backfill(&self) -> DbResult<Vec<TenantRow>> {
        let tenants = sqlx::query_as::<_, TenantRow>(&format!(
            "SELECT {TENANT_COLUMNS} FROM tenants WHERE backfill_completed = FALSE ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    async fn try_acquire_backfill_lease(
        &self,
        id: &TenantId,
        holder: Uuid,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        // Single conditional UPDATE: the row lock makes check-and-set atomic
        let result = sqlx::query(
            r#"
            UPDATE tenants
            SET backfill_lease_holder = $2,
                backfill_lease_expires_at = $4,
                last_backfill_attempt_at = $3,
                updated_at = NOW()
            WHERE id = $1
              AND (backfill_lease_holder IS NULL
                   OR backfill_lease_holder = $2
                   OR backfill_lease_expires_at IS NULL
                   OR backfill_lease_expires_at <= $3)
            "#,
        )
        .bind(id.as_str())
        .bind(holder)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_backfill_lease(&self, id: &TenantId, holder: Uuid) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE tenants
            SET backfill_lease_holder = NULL,
                backfill_lease_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND backfill_lease_holder = $2
            "#,
        )
        .bind(id.as_str())
        .bind(holder)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_backfill_failure(
        &self,
        id: &TenantId,
        message: &str,
        at: DateTime<Utc>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE tenants
            SET last_backfill_error = $2,
                last_backfill_attempt_at = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .bind(message)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_capture_enabled(&self, id: &TenantId, enabled: bool) -> DbResult<()> {
        sqlx::query("UPDATE tenants SET capture_enabled = $1, updated_at = NOW() WHERE id = $2")
            .bind(enabled)
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
