//! Monthly recurring revenue

use chrono::{DateTime, Utc};
use pulse_types::{Membership, MrrBreakdown, MrrData, Plan};
use rust_decimal::Decimal;

/// Days in the normalised month used for MRR
const DAYS_PER_MONTH: u32 = 30;

/// Breakdown bucket a recurring plan falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillingBucket {
    /// 30-day period
    Monthly,
    /// 365-day period
    Annual,
    /// 90-day period
    Quarterly,
    /// Any other period
    Other,
}

/// Breakdown bucket for a plan, or `None` when it never contributes to MRR
/// (one-time, zero renewal price, or no usable billing period).
pub fn billing_bucket(plan: &Plan) -> Option<BillingBucket> {
    if !plan.is_recurring() {
        return None;
    }
    Some(match plan.billing_period? {
        30 => BillingBucket::Monthly,
        365 => BillingBucket::Annual,
        90 => BillingBucket::Quarterly,
        _ => BillingBucket::Other,
    })
}

/// Renewal price normalised to a 30-day month: `price / period * 30`.
///
/// Returns zero for plans that are not recurring.
pub fn monthly_equivalent(plan: &Plan) -> Decimal {
    match plan.billing_period {
        Some(days) if plan.is_recurring() => {
            // multiply first so whole-month plans stay exact
            plan.renewal_price() * Decimal::from(DAYS_PER_MONTH) / Decimal::from(days)
        }
        _ => Decimal::ZERO,
    }
}

/// MRR of the memberships that are economically active at `at`.
///
/// Memberships without a resolved plan are skipped.
pub fn calculate_mrr(memberships: &[Membership], at: DateTime<Utc>) -> MrrData {
    let mut breakdown = MrrBreakdown::default();

    for membership in memberships {
        if !membership.is_economically_active(at) {
            continue;
        }
        let Some(plan) = membership.plan.as_ref() else {
            continue;
        };
        let Some(bucket) = billing_bucket(plan) else {
            continue;
        };

        let value = monthly_equivalent(plan);
        match bucket {
            BillingBucket::Monthly => breakdown.monthly += value,
            BillingBucket::Annual => breakdown.annual += value,
            BillingBucket::Quarterly => breakdown.quarterly += value,
            BillingBucket::Other => breakdown.other += value,
        }
    }

    MrrData::from_breakdown(breakdown)
}

/// Annual run rate
pub fn calculate_arr(mrr: Decimal) -> Decimal {
    mrr * Decimal::from(12)
}

/// Average revenue per active subscriber, zero when there are none
pub fn calculate_arpu(mrr: Decimal, active_subscribers: u64) -> Decimal {
    if active_subscribers == 0 {
        return Decimal::ZERO;
    }
    mrr / Decimal::from(active_subscribers)
}
