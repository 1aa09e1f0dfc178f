//! Subscriber classification and unique-member counts

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use pulse_types::{Membership, MembershipStatus, SubscriberMetrics};

/// Classify each membership into exactly one status bucket.
///
/// Precedence: economically active, then canceled (status or timestamp),
/// then trialing, then past due. Memberships matching none of these (an
/// `expired` membership that was never canceled, a `completed` one past its
/// expiry) land in `unclassified`, which is kept out of `total`.
pub fn calculate_subscriber_metrics(memberships: &[Membership], at: DateTime<Utc>) -> SubscriberMetrics {
    let mut metrics = SubscriberMetrics::default();

    for membership in memberships {
        if membership.is_economically_active(at) {
            metrics.active += 1;
        } else if membership.is_canceled() {
            metrics.cancelled += 1;
        } else if membership.status == MembershipStatus::Trialing {
            metrics.trialing += 1;
        } else if membership.status == MembershipStatus::PastDue {
            metrics.past_due += 1;
        } else {
            metrics.unclassified += 1;
        }
    }

    metrics.total = metrics.active + metrics.cancelled + metrics.past_due + metrics.trialing;
    metrics
}

/// Number of distinct members across all memberships
pub fn unique_subscriber_count(memberships: &[Membership]) -> u64 {
    memberships
        .iter()
        .filter_map(Membership::member_id)
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Number of distinct members holding an economically active membership
pub fn active_unique_subscriber_count(memberships: &[Membership], at: DateTime<Utc>) -> u64 {
    active_member_ids(memberships, at).len() as u64
}

/// Set of member IDs with at least one economically active membership
pub(crate) fn active_member_ids(memberships: &[Membership], at: DateTime<Utc>) -> HashSet<&str> {
    memberships
        .iter()
        .filter(|m| m.is_economically_active(at))
        .filter_map(Membership::member_id)
        .collect()
}
