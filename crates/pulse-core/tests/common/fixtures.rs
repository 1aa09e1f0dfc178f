//! Test data builders

use chrono::{Duration, NaiveDate, Utc};
use pulse_core::CoreConfig;
use pulse_platform::RetryConfig;
use pulse_types::{
    Member, Membership, MembershipStatus, Payment, PaymentStatus, Plan, PlanType, Snapshot,
    SnapshotMetrics, SnapshotPayload, SnapshotSource, TenantId,
};
use rust_decimal::Decimal;

use super::mock_platform::PlatformData;

const DAY: i64 = 86_400;

/// Config with near-instant retries
pub fn test_config() -> CoreConfig {
    CoreConfig::default().with_retry(
        RetryConfig::new()
            .with_initial_backoff(std::time::Duration::from_millis(1))
            .with_max_backoff(std::time::Duration::from_millis(5))
            .with_jitter(false),
    )
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Unix timestamp `days` days ago
pub fn days_ago(days: i64) -> i64 {
    Utc::now().timestamp() - days * DAY
}

pub fn monthly_plan() -> Plan {
    Plan {
        id: "plan_monthly".to_string(),
        raw_renewal_price: 2900,
        raw_initial_price: 2900,
        billing_period: Some(30),
        plan_type: PlanType::Renewal,
        base_currency: "usd".to_string(),
    }
}

pub fn lifetime_plan() -> Plan {
    Plan {
        id: "plan_lifetime".to_string(),
        raw_renewal_price: 0,
        raw_initial_price: 50_000,
        billing_period: None,
        plan_type: PlanType::OneTime,
        base_currency: "usd".to_string(),
    }
}

pub fn membership(id: &str, status: MembershipStatus, created_days_ago: i64, plan: &Plan) -> Membership {
    Membership {
        id: id.to_string(),
        status,
        created_at: days_ago(created_days_ago),
        canceled_at: None,
        expires_at: None,
        cancelation_reason: None,
        total_spend: Decimal::ZERO,
        plan_id: Some(plan.id.clone()),
        plan: None,
        member: Some(Member {
            id: format!("user_{id}"),
            email: Some(format!("{id}@example.com")),
            name: None,
        }),
    }
}

pub fn paid(id: &str, cents: i64, paid_days_ago: i64) -> Payment {
    Payment {
        id: id.to_string(),
        membership_id: None,
        raw_amount: cents,
        currency: "usd".to_string(),
        status: PaymentStatus::Paid,
        created_at: days_ago(paid_days_ago),
        paid_at: Some(days_ago(paid_days_ago)),
    }
}

/// Two monthly subscribers, one of them canceled ten days ago, plus a
/// lifetime purchase
pub fn small_business() -> PlatformData {
    let monthly = monthly_plan();
    let lifetime = lifetime_plan();

    let mut churned = membership("mem_churned", MembershipStatus::Canceled, 60, &monthly);
    churned.canceled_at = Some(days_ago(10));

    PlatformData {
        memberships: vec![
            membership("mem_active", MembershipStatus::Active, 40, &monthly),
            churned,
            membership("mem_lifetime", MembershipStatus::Completed, 20, &lifetime),
        ],
        plans: vec![monthly, lifetime],
        payments: vec![paid("pay_1", 2900, 10), paid("pay_2", 50_000, 20)],
    }
}

/// A stored snapshot `days_back` days before today
pub fn stored_snapshot(tenant: &str, days_back: i64) -> Snapshot {
    Snapshot {
        tenant_id: TenantId::parse(tenant).unwrap(),
        date: today() - Duration::days(days_back),
        payload: SnapshotPayload::default(),
        metrics: SnapshotMetrics::default(),
        source: SnapshotSource::Capture,
        captured_at: Utc::now(),
    }
}
