//! Counting in-memory billing platform

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use pulse_platform::{BillingPlatform, PlatformError};
use pulse_types::{Company, Membership, Payment, Plan, TenantId};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Billing data served for one tenant
#[derive(Debug, Clone, Default)]
pub struct PlatformData {
    pub memberships: Vec<Membership>,
    pub plans: Vec<Plan>,
    pub payments: Vec<Payment>,
}

/// In-memory billing platform that counts every call
#[derive(Default, Clone)]
pub struct MockPlatform {
    data: Arc<DashMap<String, PlatformData>>,
    failing: Arc<DashSet<String>>,
    calls: Arc<AtomicUsize>,
    rate_limited_calls: Arc<AtomicU32>,
    delay: Option<Duration>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `data` for `tenant`
    pub fn set_data(&self, tenant: &str, data: PlatformData) {
        self.data.insert(tenant.to_string(), data);
    }

    /// Make every call for `tenant` fail with a server error
    pub fn fail_tenant(&self, tenant: &str) {
        self.failing.insert(tenant.to_string());
    }

    /// Answer the next `n` calls with a rate-limit error
    pub fn rate_limit_next(&self, n: u32) {
        self.rate_limited_calls.store(n, Ordering::SeqCst);
    }

    /// Total calls received, including failed ones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond<T>(
        &self,
        tenant: &TenantId,
        pick: impl FnOnce(&PlatformData) -> T,
    ) -> Result<T, PlatformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let throttled = self
            .rate_limited_calls
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if throttled {
            return Err(PlatformError::RateLimited { retry_after: None });
        }

        if self.failing.contains(tenant.as_str()) {
            return Err(PlatformError::Unavailable("503 Service Unavailable".to_string()));
        }

        let data = self.data.get(tenant.as_str()).map(|d| d.value().clone()).unwrap_or_default();
        Ok(pick(&data))
    }
}

#[async_trait]
impl BillingPlatform for MockPlatform {
    async fn list_memberships(&self, tenant: &TenantId) -> Result<Vec<Membership>, PlatformError> {
        self.respond(tenant, |d| {
            // The platform never returns resolved plans
            d.memberships
                .iter()
                .cloned()
                .map(|mut m| {
                    m.plan = None;
                    m
                })
                .collect()
        })
        .await
    }

    async fn list_plans(&self, tenant: &TenantId) -> Result<Vec<Plan>, PlatformError> {
        self.respond(tenant, |d| d.plans.clone()).await
    }

    async fn list_payments(&self, tenant: &TenantId) -> Result<Vec<Payment>, PlatformError> {
        self.respond(tenant, |d| d.payments.clone()).await
    }

    async fn get_company(&self, tenant: &TenantId) -> Result<Company, PlatformError> {
        self.respond(tenant, |_| Company {
            id: tenant.as_str().to_string(),
            title: format!("{tenant} Inc"),
            created_at: None,
        })
        .await
    }
}
