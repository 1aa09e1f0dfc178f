//! Pulse Metrics - Subscription health math
//!
//! Pure functions over in-memory membership and plan records. Nothing here
//! performs I/O or fails: missing data degrades to zero or placeholder values.
//!
//! All percentages use the 0-100 convention and all currency values are
//! decimal units (already converted from cents).
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_metrics::{calculate_mrr, calculate_arr, calculate_subscriber_metrics};
//!
//! let now = chrono::Utc::now();
//! let mrr = calculate_mrr(&memberships, now);
//! let arr = calculate_arr(mrr.total);
//! let subs = calculate_subscriber_metrics(&memberships, now);
//! ```

pub mod churn;
pub mod mrr;
pub mod subscribers;

pub use churn::{calculate_churn_metrics, calculate_mrr_churn_metrics, calculate_quantity_churn_rate};
pub use mrr::{billing_bucket, calculate_arpu, calculate_arr, calculate_mrr, monthly_equivalent, BillingBucket};
pub use subscribers::{active_unique_subscriber_count, calculate_subscriber_metrics, unique_subscriber_count};
