//! Plan types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a plan bills its members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Recurring plan billed every `billing_period` days
    Renewal,
    /// Single up-front charge
    OneTime,
}

/// Pricing terms for a membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan ID
    pub id: String,
    /// Renewal price in the smallest currency unit (cents)
    pub raw_renewal_price: i64,
    /// Initial price in the smallest currency unit (cents)
    pub raw_initial_price: i64,
    /// Billing period in days (`None` for one-time plans)
    pub billing_period: Option<u32>,
    /// Plan type
    pub plan_type: PlanType,
    /// ISO currency code, lowercase
    pub base_currency: String,
}

impl Plan {
    /// Renewal price in decimal currency units
    pub fn renewal_price(&self) -> Decimal {
        Decimal::new(self.raw_renewal_price, 2)
    }

    /// Initial price in decimal currency units
    pub fn initial_price(&self) -> Decimal {
        Decimal::new(self.raw_initial_price, 2)
    }

    /// Whether this plan can contribute to recurring revenue at all
    pub fn is_recurring(&self) -> bool {
        self.plan_type == PlanType::Renewal
            && self.raw_renewal_price > 0
            && self.billing_period.is_some_and(|days| days > 0)
    }
}
