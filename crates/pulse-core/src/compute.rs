//! Snapshot metric derivation

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use pulse_metrics::{
    active_unique_subscriber_count, calculate_arpu, calculate_arr, calculate_churn_metrics,
    calculate_mrr, calculate_subscriber_metrics, unique_subscriber_count,
};
use pulse_types::{Membership, Payment, PaymentStatus, Plan, SnapshotMetrics};
use rust_decimal::Decimal;

use crate::history::day_of;

/// Attach each membership's plan record, looked up by `plan_id`
pub fn resolve_plans(memberships: &mut [Membership], plans: &[Plan]) {
    let by_id: HashMap<&str, &Plan> = plans.iter().map(|p| (p.id.as_str(), p)).collect();
    for membership in memberships.iter_mut() {
        membership.plan = membership
            .plan_id
            .as_deref()
            .and_then(|id| by_id.get(id))
            .map(|plan| (*plan).clone());
    }
}

/// Payments attributed to `date`
pub fn payments_on(payments: &[Payment], date: NaiveDate) -> Vec<Payment> {
    payments
        .iter()
        .filter(|p| p.settled_on() == Some(date))
        .cloned()
        .collect()
}

/// Metrics for one day.
///
/// `memberships` is the state at `at`, `previous` the state one day earlier;
/// `payments` are that day's payments. Flow counts cover `date` only.
pub fn compute_snapshot_metrics(
    memberships: &[Membership],
    previous: &[Membership],
    payments: &[Payment],
    date: NaiveDate,
    at: DateTime<Utc>,
) -> SnapshotMetrics {
    let mrr = calculate_mrr(memberships, at);
    let subscribers = calculate_subscriber_metrics(memberships, at);

    let new_memberships = memberships
        .iter()
        .filter(|m| day_of(m.created_at) == Some(date))
        .count() as u64;
    let canceled_memberships = memberships
        .iter()
        .filter(|m| m.canceled_at.and_then(day_of) == Some(date))
        .count() as u64;
    let revenue = payments
        .iter()
        .filter(|p| p.status == PaymentStatus::Paid && p.settled_on() == Some(date))
        .map(Payment::amount)
        .sum::<Decimal>();

    SnapshotMetrics {
        arr: calculate_arr(mrr.total),
        arpu: calculate_arpu(mrr.total, subscribers.active),
        mrr,
        subscribers,
        unique_subscribers: unique_subscriber_count(memberships),
        active_unique_subscribers: active_unique_subscriber_count(memberships, at),
        churn: calculate_churn_metrics(memberships, previous, at),
        new_memberships,
        canceled_memberships,
        revenue,
    }
}
