//! HTTP billing-platform client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument};

use pulse_types::{
    Company, Member, Membership, MembershipStatus, Payment, PaymentStatus, Plan, PlanType,
    TenantId,
};

use crate::config::PlatformConfig;
use crate::error::PlatformError;
use crate::provider::BillingPlatform;

/// Billing platform reached over its REST API
#[derive(Clone)]
pub struct HttpPlatformClient {
    client: Client,
    config: PlatformConfig,
}

impl HttpPlatformClient {
    /// Create a new client
    pub fn new(config: PlatformConfig) -> Result<Self, PlatformError> {
        if config.api_key.trim().is_empty() {
            return Err(PlatformError::Config("api key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PlatformError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Make authenticated GET request
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, PlatformError> {
        let url = format!("{}{endpoint}", self.config.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, endpoint = %endpoint, "billing platform error");
            return Err(status_error(status, retry_after, endpoint, body));
        }

        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice::<T>(&bytes).map_err(|e| {
            error!(error = %e, endpoint = %endpoint, "failed to decode billing platform response");
            PlatformError::Malformed(format!("{endpoint}: {e}"))
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> PlatformError {
        if err.is_timeout() {
            PlatformError::Timeout(self.config.request_timeout)
        } else {
            err.into()
        }
    }

    /// Fetch every page of a list endpoint
    async fn list_all<W: DeserializeOwned>(
        &self,
        endpoint: &str,
        tenant: &TenantId,
    ) -> Result<Vec<W>, PlatformError> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let query = [
                ("company_id", tenant.as_str().to_string()),
                ("page", page.to_string()),
                ("per", self.config.page_size.to_string()),
            ];
            let list: WireList<W> = self.get(endpoint, &query).await?;
            let fetched = list.data.len();
            items.extend(list.data);

            let total_pages = list.pagination.map_or(1, |p| p.total_pages);
            debug!(endpoint = %endpoint, page, total_pages, fetched, "fetched page");

            if page >= total_pages || fetched == 0 {
                break;
            }
            if page >= self.config.max_pages {
                return Err(PlatformError::Malformed(format!(
                    "{endpoint}: more than {} pages",
                    self.config.max_pages
                )));
            }
            page += 1;
        }

        Ok(items)
    }
}

fn status_error(
    status: StatusCode,
    retry_after: Option<Duration>,
    endpoint: &str,
    body: String,
) -> PlatformError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        PlatformError::RateLimited { retry_after }
    } else if status.is_server_error() {
        PlatformError::Unavailable(format!("{endpoint}: {status}"))
    } else if status == StatusCode::NOT_FOUND {
        PlatformError::NotFound(endpoint.to_string())
    } else {
        PlatformError::Api {
            status: status.as_u16(),
            message: body,
        }
    }
}

#[async_trait]
impl BillingPlatform for HttpPlatformClient {
    #[instrument(skip(self))]
    async fn list_memberships(&self, tenant: &TenantId) -> Result<Vec<Membership>, PlatformError> {
        let wire: Vec<WireMembership> = self.list_all("/memberships", tenant).await?;
        wire.into_iter().map(Membership::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn list_plans(&self, tenant: &TenantId) -> Result<Vec<Plan>, PlatformError> {
        let wire: Vec<WirePlan> = self.list_all("/plans", tenant).await?;
        wire.into_iter().map(Plan::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn list_payments(&self, tenant: &TenantId) -> Result<Vec<Payment>, PlatformError> {
        let wire: Vec<WirePayment> = self.list_all("/payments", tenant).await?;
        Ok(wire.into_iter().map(Payment::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_company(&self, tenant: &TenantId) -> Result<Company, PlatformError> {
        let wire: WireCompany = self
            .get(&format!("/companies/{}", tenant.as_str()), &[])
            .await?;
        Ok(Company {
            id: wire.id,
            title: wire.title.unwrap_or_default(),
            created_at: wire.created_at,
        })
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct WireList<T> {
    data: Vec<T>,
    pagination: Option<WirePagination>,
}

#[derive(Debug, Deserialize)]
struct WirePagination {
    #[allow(dead_code)]
    current_page: Option<u32>,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
struct WireRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WireMember {
    id: String,
    email: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMembership {
    id: String,
    status: String,
    created_at: i64,
    canceled_at: Option<i64>,
    expires_at: Option<i64>,
    cancelation_reason: Option<String>,
    total_spend: Option<Decimal>,
    plan: Option<WireRef>,
    member: Option<WireMember>,
}

impl TryFrom<WireMembership> for Membership {
    type Error = PlatformError;

    fn try_from(wire: WireMembership) -> Result<Self, Self::Error> {
        let status = match wire.status.as_str() {
            "trialing" => MembershipStatus::Trialing,
            "active" => MembershipStatus::Active,
            "past_due" => MembershipStatus::PastDue,
            "canceled" | "cancelled" => MembershipStatus::Canceled,
            "completed" => MembershipStatus::Completed,
            "expired" => MembershipStatus::Expired,
            other => {
                return Err(PlatformError::Malformed(format!(
                    "membership {}: unknown status {other:?}",
                    wire.id
                )))
            }
        };

        Ok(Membership {
            id: wire.id,
            status,
            created_at: wire.created_at,
            canceled_at: wire.canceled_at,
            expires_at: wire.expires_at,
            cancelation_reason: wire.cancelation_reason,
            total_spend: wire.total_spend.unwrap_or_default(),
            plan_id: wire.plan.map(|p| p.id),
            plan: None,
            member: wire.member.map(|m| Member {
                id: m.id,
                email: m.email,
                name: m.name,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WirePlan {
    id: String,
    raw_renewal_price: Option<i64>,
    raw_initial_price: Option<i64>,
    billing_period: Option<i64>,
    plan_type: String,
    base_currency: Option<String>,
}

impl TryFrom<WirePlan> for Plan {
    type Error = PlatformError;

    fn try_from(wire: WirePlan) -> Result<Self, Self::Error> {
        let plan_type = match wire.plan_type.as_str() {
            "renewal" => PlanType::Renewal,
            "one_time" => PlanType::OneTime,
            other => {
                return Err(PlatformError::Malformed(format!(
                    "plan {}: unknown plan type {other:?}",
                    wire.id
                )))
            }
        };

        let billing_period = match wire.billing_period {
            None => None,
            Some(days) => Some(u32::try_from(days).map_err(|_| {
                PlatformError::Malformed(format!("plan {}: billing period {days}", wire.id))
            })?),
        };

        Ok(Plan {
            id: wire.id,
            raw_renewal_price: wire.raw_renewal_price.unwrap_or(0),
            raw_initial_price: wire.raw_initial_price.unwrap_or(0),
            billing_period,
            plan_type,
            base_currency: wire.base_currency.unwrap_or_else(|| "usd".to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct WirePayment {
    id: String,
    membership: Option<WireRef>,
    raw_amount: Option<i64>,
    currency: Option<String>,
    status: PaymentStatus,
    created_at: i64,
    paid_at: Option<i64>,
}

impl From<WirePayment> for Payment {
    fn from(wire: WirePayment) -> Self {
        Payment {
            id: wire.id,
            membership_id: wire.membership.map(|m| m.id),
            raw_amount: wire.raw_amount.unwrap_or(0),
            currency: wire.currency.unwrap_or_else(|| "usd".to_string()),
            status: wire.status,
            created_at: wire.created_at,
            paid_at: wire.paid_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCompany {
    id: String,
    title: Option<String>,
    created_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(Duration::from_secs(3)), "/plans", String::new()),
            PlatformError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(3)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, None, "/plans", String::new()),
            PlatformError::Unavailable(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, None, "/companies/x", String::new()),
            PlatformError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, None, "/plans", "nope".to_string()),
            PlatformError::Api { status: 401, .. }
        ));
    }

    #[test]
    fn test_unknown_membership_status_is_malformed() {
        let wire: WireMembership = serde_json::from_str(
            r#"{"id":"mem_1","status":"paused","created_at":1700000000}"#,
        )
        .unwrap();
        assert!(matches!(
            Membership::try_from(wire),
            Err(PlatformError::Malformed(_))
        ));
    }

    #[test]
    fn test_membership_conversion_leaves_plan_unresolved() {
        let wire: WireMembership = serde_json::from_str(
            r#"{"id":"mem_1","status":"active","created_at":1700000000,
                "total_spend":"58.00","plan":{"id":"plan_1"},
                "member":{"id":"user_1","email":"a@example.com"}}"#,
        )
        .unwrap();
        let membership = Membership::try_from(wire).unwrap();
        assert_eq!(membership.plan_id.as_deref(), Some("plan_1"));
        assert!(membership.plan.is_none());
        assert_eq!(membership.member_id(), Some("user_1"));
        assert_eq!(membership.total_spend, Decimal::new(5800, 2));
    }

    #[test]
    fn test_negative_billing_period_is_malformed() {
        let wire: WirePlan = serde_json::from_str(
            r#"{"id":"plan_1","plan_type":"renewal","billing_period":-30}"#,
        )
        .unwrap();
        assert!(Plan::try_from(wire).is_err());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let config = PlatformConfig::new("http://localhost:9000", "  ");
        assert!(matches!(
            HttpPlatformClient::new(config),
            Err(PlatformError::Config(_))
        ));
    }
}
