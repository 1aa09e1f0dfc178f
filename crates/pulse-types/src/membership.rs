//! Membership types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Plan;

/// Membership status as reported by the billing platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// In trial period
    Trialing,
    /// Paying and current
    Active,
    /// Payment is past due
    PastDue,
    /// Canceled by the member or the company
    Canceled,
    /// Fixed-term membership that ran its course
    Completed,
    /// Access lapsed
    Expired,
}

impl MembershipStatus {
    /// Statuses that count toward revenue when not canceled or expired
    pub const fn is_paying(&self) -> bool {
        matches!(self, Self::Active | Self::Completed)
    }
}

/// The member holding a membership
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member ID
    pub id: String,
    /// Member email
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
}

/// A subscription relationship between a member and a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    /// Membership ID
    pub id: String,
    /// Current status
    pub status: MembershipStatus,
    /// Creation time (Unix seconds)
    pub created_at: i64,
    /// Cancellation time (Unix seconds)
    pub canceled_at: Option<i64>,
    /// Access expiry (Unix seconds)
    pub expires_at: Option<i64>,
    /// Free-form cancellation reason
    pub cancelation_reason: Option<String>,
    /// Lifetime spend in decimal currency units
    pub total_spend: Decimal,
    /// Referenced plan ID
    pub plan_id: Option<String>,
    /// Plan resolved from `plan_id`, filled in after fetching plans
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<Plan>,
    /// Member holding this membership
    pub member: Option<Member>,
}

impl Membership {
    /// Whether this membership generates revenue at `at`.
    ///
    /// `status ∈ {active, completed}`, never canceled, and not yet expired.
    /// Every "active" count in the metrics goes through this predicate.
    pub fn is_economically_active(&self, at: DateTime<Utc>) -> bool {
        self.status.is_paying()
            && self.canceled_at.is_none()
            && self.expires_at.map_or(true, |exp| exp > at.timestamp())
    }

    /// Member ID, if the membership carries one
    pub fn member_id(&self) -> Option<&str> {
        self.member.as_ref().map(|m| m.id.as_str())
    }

    /// Whether this membership was canceled, by status or timestamp
    pub fn is_canceled(&self) -> bool {
        self.status == MembershipStatus::Canceled || self.canceled_at.is_some()
    }
}
