//! Churn and retention

use chrono::{DateTime, Utc};
use pulse_types::{ChurnMetrics, Membership, MrrChurnMetrics};
use rust_decimal::Decimal;

use crate::subscribers::active_member_ids;

/// `part / whole * 100`, or zero when `whole` is zero
fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part * Decimal::ONE_HUNDRED / whole
}

/// Customer churn between two membership sets, both evaluated at `at`.
///
/// A member churned if they held an active membership in `previous` and
/// hold none in `current`.
///
/// `revenue_churn_rate` and `net_revenue_retention` are fixed at 0 and 100.
/// Computing them needs the plan price each churned member was paying,
/// which membership records alone do not carry.
pub fn calculate_churn_metrics(
    current: &[Membership],
    previous: &[Membership],
    at: DateTime<Utc>,
) -> ChurnMetrics {
    let current_active = active_member_ids(current, at);
    let previous_active = active_member_ids(previous, at);

    let churned = previous_active
        .iter()
        .filter(|id| !current_active.contains(*id))
        .count();

    ChurnMetrics {
        customer_churn_rate: percentage(
            Decimal::from(churned),
            Decimal::from(previous_active.len()),
        ),
        ..ChurnMetrics::default()
    }
}

/// MRR churn and retention rates for a period.
///
/// Rates are relative to `previous_mrr`; with no starting MRR every rate is
/// degenerate and the result is `{0, 0, 100, 100}`.
pub fn calculate_mrr_churn_metrics(
    previous_mrr: Decimal,
    _current_mrr: Decimal,
    churned_mrr: Decimal,
    expansion_mrr: Decimal,
    contraction_mrr: Decimal,
) -> MrrChurnMetrics {
    if previous_mrr.is_zero() {
        return MrrChurnMetrics {
            gross_mrr_churn_rate: Decimal::ZERO,
            net_mrr_churn_rate: Decimal::ZERO,
            gross_mrr_retention: Decimal::ONE_HUNDRED,
            net_mrr_retention: Decimal::ONE_HUNDRED,
        };
    }

    let gross_churn = percentage(churned_mrr, previous_mrr).max(Decimal::ZERO);
    let net_churn = percentage(churned_mrr + contraction_mrr - expansion_mrr, previous_mrr);
    let gross_retention = (Decimal::ONE_HUNDRED - gross_churn).clamp(Decimal::ZERO, Decimal::ONE_HUNDRED);
    let net_retention = percentage(
        previous_mrr - churned_mrr + expansion_mrr - contraction_mrr,
        previous_mrr,
    );

    MrrChurnMetrics {
        gross_mrr_churn_rate: gross_churn,
        net_mrr_churn_rate: net_churn,
        gross_mrr_retention: gross_retention,
        net_mrr_retention: net_retention,
    }
}

/// Share of the starting count that churned
pub fn calculate_quantity_churn_rate(previous_count: u64, _current_count: u64, churned_count: u64) -> Decimal {
    percentage(Decimal::from(churned_count), Decimal::from(previous_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pulse_types::{Member, MembershipStatus};
    use rust_decimal_macros::dec;

    fn active(member: &str) -> Membership {
        Membership {
            id: format!("mem_{member}"),
            status: MembershipStatus::Active,
            created_at: 1_600_000_000,
            canceled_at: None,
            expires_at: None,
            cancelation_reason: None,
            total_spend: Decimal::ZERO,
            plan_id: None,
            plan: None,
            member: Some(Member {
                id: member.to_string(),
                email: None,
                name: None,
            }),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_customer_churn() {
        let previous = vec![active("a"), active("b"), active("c"), active("d")];
        let current = vec![active("a"), active("b"), active("c"), active("e")];
        let churn = calculate_churn_metrics(&current, &previous, now());
        assert_eq!(churn.customer_churn_rate, dec!(25));
        assert_eq!(churn.revenue_churn_rate, dec!(0));
        assert_eq!(churn.net_revenue_retention, dec!(100));
    }

    #[test]
    fn test_customer_churn_empty_previous() {
        let churn = calculate_churn_metrics(&[active("a")], &[], now());
        assert_eq!(churn.customer_churn_rate, dec!(0));
    }

    #[test]
    fn test_member_with_second_membership_is_not_churned() {
        let previous = vec![active("a")];
        let mut replaced = active("a");
        replaced.id = "mem_a_2".to_string();
        let churn = calculate_churn_metrics(&[replaced], &previous, now());
        assert_eq!(churn.customer_churn_rate, dec!(0));
    }

    #[test]
    fn test_mrr_churn_degenerate() {
        let m = calculate_mrr_churn_metrics(dec!(0), dec!(500), dec!(10), dec!(20), dec!(30));
        assert_eq!(m.gross_mrr_churn_rate, dec!(0));
        assert_eq!(m.net_mrr_churn_rate, dec!(0));
        assert_eq!(m.gross_mrr_retention, dec!(100));
        assert_eq!(m.net_mrr_retention, dec!(100));
    }

    #[test]
    fn test_mrr_churn_rates() {
        let m = calculate_mrr_churn_metrics(dec!(1000), dec!(1000), dec!(100), dec!(50), dec!(20));
        assert_eq!(m.gross_mrr_churn_rate, dec!(10));
        assert_eq!(m.net_mrr_churn_rate, dec!(7));
        assert_eq!(m.gross_mrr_retention, dec!(90));
        assert_eq!(m.net_mrr_retention, dec!(93));
    }

    #[test]
    fn test_net_expansion_goes_negative() {
        let m = calculate_mrr_churn_metrics(dec!(1000), dec!(1300), dec!(50), dec!(400), dec!(0));
        assert_eq!(m.net_mrr_churn_rate, dec!(-35));
        assert_eq!(m.net_mrr_retention, dec!(135));
        assert_eq!(m.gross_mrr_retention, dec!(95));
    }

    #[test]
    fn test_gross_retention_clamped() {
        let m = calculate_mrr_churn_metrics(dec!(100), dec!(0), dec!(150), dec!(0), dec!(0));
        assert_eq!(m.gross_mrr_churn_rate, dec!(150));
        assert_eq!(m.gross_mrr_retention, dec!(0));

        let m = calculate_mrr_churn_metrics(dec!(100), dec!(100), dec!(-10), dec!(0), dec!(0));
        assert_eq!(m.gross_mrr_churn_rate, dec!(0));
        assert_eq!(m.gross_mrr_retention, dec!(100));
    }

    #[test]
    fn test_quantity_churn_rate() {
        assert_eq!(calculate_quantity_churn_rate(0, 5, 3), dec!(0));
        assert_eq!(calculate_quantity_churn_rate(40, 38, 2), dec!(5));
    }
}
