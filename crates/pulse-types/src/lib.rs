//! Pulse Types - Shared domain types
//!
//! This crate contains domain types used across Pulse crates:
//! - Tenant identity
//! - Billing-platform records (memberships, plans, payments, companies)
//! - Daily snapshots and the metrics derived from them

pub mod company;
pub mod error;
pub mod membership;
pub mod payment;
pub mod plan;
pub mod snapshot;
pub mod tenant;

pub use company::*;
pub use error::*;
pub use membership::*;
pub use payment::*;
pub use plan::*;
pub use snapshot::*;
pub use tenant::*;
