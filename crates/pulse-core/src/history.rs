//! Historical reconstruction helpers
//!
//! The billing platform only reports current state. Past days are rebuilt by
//! evaluating each membership "as of" the end of that day.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use pulse_types::{Membership, MembershipStatus};

/// Last second of `date` in UTC (23:59:59)
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&(date.and_time(NaiveTime::MIN) + Duration::seconds(86_399)))
}

/// UTC calendar day of a unix timestamp
pub fn day_of(ts: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
}

/// The membership as it stood at `instant`, or `None` if it did not exist yet.
///
/// A cancellation that happens after `instant` is undone, restoring `active`
/// for memberships whose current status is `canceled`. An `expired`
/// membership whose expiry is still ahead of `instant` is restored to `active`.
pub fn as_of(membership: &Membership, instant: DateTime<Utc>) -> Option<Membership> {
    let ts = instant.timestamp();
    if membership.created_at > ts {
        return None;
    }

    let mut view = membership.clone();

    if view.canceled_at.is_some_and(|canceled| canceled > ts) {
        view.canceled_at = None;
        view.cancelation_reason = None;
        if view.status == MembershipStatus::Canceled {
            view.status = MembershipStatus::Active;
        }
    }

    if view.status == MembershipStatus::Expired && view.expires_at.is_some_and(|exp| exp > ts) {
        view.status = MembershipStatus::Active;
    }

    Some(view)
}

/// As-of views of every membership that existed at `instant`
pub fn memberships_as_of(memberships: &[Membership], instant: DateTime<Utc>) -> Vec<Membership> {
    memberships
        .iter()
        .filter_map(|m| as_of(m, instant))
        .collect()
}

/// Inclusive day range a backfill reconstructs.
///
/// The range ends at `today` and covers at most `window_days` days, starting
/// no earlier than the first day any membership existed.
pub fn backfill_window(
    today: NaiveDate,
    earliest: Option<NaiveDate>,
    window_days: u32,
) -> (NaiveDate, NaiveDate) {
    let window_start = today - Duration::days(i64::from(window_days.max(1) - 1));
    let start = match earliest {
        Some(first) => first.clamp(window_start, today),
        None => today,
    };
    (start, today)
}
