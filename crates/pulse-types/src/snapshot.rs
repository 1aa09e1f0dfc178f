//! Snapshot types
//!
//! A snapshot is the point-in-time capture of one tenant's billing state for
//! a single UTC calendar day, together with the metrics derived from it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Company, Membership, Payment, Plan, TenantId, TypeError};

/// Raw billing-platform data captured in a snapshot.
///
/// Every section is optional so readers can tell "not captured" apart from
/// "captured and empty".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// Company record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    /// Memberships as of the snapshot day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memberships: Option<Vec<Membership>>,
    /// Plans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plans: Option<Vec<Plan>>,
    /// Payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payments: Option<Vec<Payment>>,
}

/// Monthly recurring revenue split by billing cadence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrBreakdown {
    /// 30-day plans
    pub monthly: Decimal,
    /// 365-day plans
    pub annual: Decimal,
    /// 90-day plans
    pub quarterly: Decimal,
    /// Any other billing period
    pub other: Decimal,
}

impl MrrBreakdown {
    /// Sum of all buckets
    pub fn sum(&self) -> Decimal {
        self.monthly + self.annual + self.quarterly + self.other
    }
}

/// MRR total and breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrData {
    /// Always equal to `breakdown.sum()`
    pub total: Decimal,
    /// Per-cadence amounts
    pub breakdown: MrrBreakdown,
}

impl MrrData {
    /// Build from a breakdown; `total` is derived from it
    pub fn from_breakdown(breakdown: MrrBreakdown) -> Self {
        Self {
            total: breakdown.sum(),
            breakdown,
        }
    }
}

/// Subscriber counts by status bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberMetrics {
    /// Economically active
    pub active: u64,
    /// Canceled by status or timestamp
    pub cancelled: u64,
    /// Past due
    pub past_due: u64,
    /// Trialing
    pub trialing: u64,
    /// `active + cancelled + past_due + trialing`
    pub total: u64,
    /// Memberships matching none of the buckets above (e.g. `expired`).
    /// Not included in `total`.
    #[serde(default)]
    pub unclassified: u64,
}

/// Customer-level churn between two membership sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnMetrics {
    /// Percentage (0-100) of previously active members no longer active
    pub customer_churn_rate: Decimal,
    /// Placeholder, always 0: needs per-member price history
    pub revenue_churn_rate: Decimal,
    /// Placeholder, always 100: needs per-member price history
    pub net_revenue_retention: Decimal,
}

impl Default for ChurnMetrics {
    fn default() -> Self {
        Self {
            customer_churn_rate: Decimal::ZERO,
            revenue_churn_rate: Decimal::ZERO,
            net_revenue_retention: Decimal::ONE_HUNDRED,
        }
    }
}

/// MRR-level churn and retention, all percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MrrChurnMetrics {
    /// Churned MRR over starting MRR, never negative
    pub gross_mrr_churn_rate: Decimal,
    /// Churn net of expansion; negative means net expansion
    pub net_mrr_churn_rate: Decimal,
    /// `100 - gross churn`, clamped to 0..=100
    pub gross_mrr_retention: Decimal,
    /// Retained plus expansion over starting MRR, unclamped
    pub net_mrr_retention: Decimal,
}

/// Metrics derived from a snapshot's raw data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetrics {
    /// Monthly recurring revenue
    pub mrr: MrrData,
    /// Annual run rate (`mrr * 12`)
    pub arr: Decimal,
    /// Average revenue per active unique subscriber
    pub arpu: Decimal,
    /// Subscriber counts by status
    pub subscribers: SubscriberMetrics,
    /// Distinct members across all memberships
    pub unique_subscribers: u64,
    /// Distinct members holding an economically active membership
    pub active_unique_subscribers: u64,
    /// Churn against the previous day
    pub churn: ChurnMetrics,
    /// Memberships created on the snapshot day
    pub new_memberships: u64,
    /// Memberships canceled on the snapshot day
    pub canceled_memberships: u64,
    /// Paid revenue settled on the snapshot day
    pub revenue: Decimal,
}

/// How a snapshot was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSource {
    /// Live capture of "today"
    Capture,
    /// Reconstructed from history
    Backfill,
}

impl SnapshotSource {
    /// Label used in logs and storage
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Backfill => "backfill",
        }
    }
}

/// One tenant's state on one UTC calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Tenant
    pub tenant_id: TenantId,
    /// UTC calendar day
    pub date: NaiveDate,
    /// Raw captured data
    pub payload: SnapshotPayload,
    /// Derived metrics
    pub metrics: SnapshotMetrics,
    /// How the snapshot was produced
    pub source: SnapshotSource,
    /// When it was written
    pub captured_at: DateTime<Utc>,
}

/// Rollup bucket size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One day per bucket
    Daily,
    /// Seven days per bucket
    Weekly,
    /// Thirty days per bucket
    Monthly,
    /// Ninety days per bucket
    Quarterly,
}

impl Granularity {
    /// Bucket length in days
    pub const fn days(&self) -> u32 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Quarterly => 90,
        }
    }

    /// Lowercase name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Granularity {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "quarterly" | "quarter" => Ok(Self::Quarterly),
            _ => Err(TypeError::UnknownGranularity(s.to_string())),
        }
    }
}
