//! Pulse Core - Snapshot orchestration
//!
//! Captures daily subscription-health snapshots per tenant, reconstructs a
//! year of history on first contact, and rolls stored snapshots up into
//! daily, weekly, monthly or quarterly series.
//!
//! # Example
//!
//! ```rust,ignore
//! use pulse_core::{CoreConfig, SnapshotService};
//!
//! let service = SnapshotService::new(CoreConfig::default(), tenants, snapshots, platform);
//!
//! let outcome = service.backfill_history("biz_123").await?;
//! let snapshot = service.capture_snapshot("biz_123").await?;
//! let series = service.get_series("biz_123", Granularity::Monthly, 12).await?;
//! ```

pub mod backfill;
pub mod capture;
pub mod compute;
pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod rollup;
pub mod service;

pub use backfill::BackfillOutcome;
pub use config::CoreConfig;
pub use error::CoreError;
pub use rollup::{MetricKind, Series, SeriesField, SeriesPoint};
pub use service::{BatchReport, SnapshotService, TenantData, TenantFailure};
