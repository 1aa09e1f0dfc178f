//! Payment types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Funds captured
    Paid,
    /// Awaiting capture
    Pending,
    /// Charge failed
    Failed,
    /// Charge refunded
    Refunded,
    /// Any status this crate does not model
    #[serde(other)]
    Other,
}

/// A single charge against a membership
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment ID
    pub id: String,
    /// Membership this payment belongs to
    pub membership_id: Option<String>,
    /// Amount in the smallest currency unit
    pub raw_amount: i64,
    /// ISO currency code, lowercase
    pub currency: String,
    /// Payment status
    pub status: PaymentStatus,
    /// Creation time (Unix seconds)
    pub created_at: i64,
    /// Capture time (Unix seconds)
    pub paid_at: Option<i64>,
}

impl Payment {
    /// Amount in decimal currency units
    pub fn amount(&self) -> Decimal {
        Decimal::new(self.raw_amount, 2)
    }

    /// UTC day the payment settled on, falling back to creation time
    pub fn settled_on(&self) -> Option<NaiveDate> {
        let ts = self.paid_at.unwrap_or(self.created_at);
        chrono::DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive())
    }
}
