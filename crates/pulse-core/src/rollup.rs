//! Time-series rollups over stored daily snapshots

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use pulse_db::{SnapshotRepository, TenantRepository};
use pulse_platform::BillingPlatform;
use pulse_types::{Granularity, Snapshot, SnapshotMetrics, TenantId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{CoreError, SnapshotService};

/// Upper bound on days a single series request may span
pub const MAX_SERIES_DAYS: u32 = 3_650;

/// How a field folds across the days of a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Point-in-time level; a bucket reports its latest value
    Balance,
    /// Per-day quantity; a bucket reports the sum
    Flow,
}

/// Field available in a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesField {
    /// Total monthly recurring revenue
    Mrr,
    /// Annual run rate, MRR times twelve
    Arr,
    /// MRR per active subscriber
    Arpu,
    /// Subscribers in the active bucket
    ActiveSubscribers,
    /// Sum of all subscriber buckets
    TotalSubscribers,
    /// Percentage of previously active members lost
    CustomerChurnRate,
    /// Memberships created during the period
    NewMemberships,
    /// Memberships canceled during the period
    CanceledMemberships,
    /// Paid payment volume settled during the period
    Revenue,
}

impl SeriesField {
    /// Every field, in output order
    pub const ALL: [SeriesField; 9] = [
        Self::Mrr,
        Self::Arr,
        Self::Arpu,
        Self::ActiveSubscribers,
        Self::TotalSubscribers,
        Self::CustomerChurnRate,
        Self::NewMemberships,
        Self::CanceledMemberships,
        Self::Revenue,
    ];

    pub const fn kind(&self) -> MetricKind {
        match self {
            Self::Mrr
            | Self::Arr
            | Self::Arpu
            | Self::ActiveSubscribers
            | Self::TotalSubscribers
            | Self::CustomerChurnRate => MetricKind::Balance,
            Self::NewMemberships | Self::CanceledMemberships | Self::Revenue => MetricKind::Flow,
        }
    }

    /// The field's value in one day's metrics
    pub fn value(&self, metrics: &SnapshotMetrics) -> Decimal {
        match self {
            Self::Mrr => metrics.mrr.total,
            Self::Arr => metrics.arr,
            Self::Arpu => metrics.arpu,
            Self::ActiveSubscribers => Decimal::from(metrics.subscribers.active),
            Self::TotalSubscribers => Decimal::from(metrics.subscribers.total),
            Self::CustomerChurnRate => metrics.churn.customer_churn_rate,
            Self::NewMemberships => Decimal::from(metrics.new_memberships),
            Self::CanceledMemberships => Decimal::from(metrics.canceled_memberships),
            Self::Revenue => metrics.revenue,
        }
    }
}

/// One bucket of a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// First day of the bucket
    pub period_start: NaiveDate,
    /// Last day of the bucket, inclusive
    pub period_end: NaiveDate,
    /// Daily snapshots that fell into the bucket
    pub snapshot_count: usize,
    /// Folded values. Balance fields are absent when the bucket has no
    /// snapshots; flow fields are always present.
    pub values: BTreeMap<SeriesField, Decimal>,
}

impl SeriesPoint {
    /// Folded value of `field`, if any
    pub fn get(&self, field: SeriesField) -> Option<Decimal> {
        self.values.get(&field).copied()
    }

    fn fold(period_start: NaiveDate, period_end: NaiveDate, days: &[Snapshot]) -> Self {
        let mut values = BTreeMap::new();

        for field in SeriesField::ALL {
            let folded = match field.kind() {
                MetricKind::Balance => days.last().map(|s| field.value(&s.metrics)),
                MetricKind::Flow => Some(days.iter().map(|s| field.value(&s.metrics)).sum::<Decimal>()),
            };
            if let Some(value) = folded {
                values.insert(field, value);
            }
        }

        Self {
            period_start,
            period_end,
            snapshot_count: days.len(),
            values,
        }
    }
}

/// A finite series of buckets, oldest first.
///
/// Holds the snapshots it was built from; [`Series::points`] folds them on
/// each call.
#[derive(Debug, Clone)]
pub struct Series {
    tenant_id: TenantId,
    granularity: Granularity,
    start: NaiveDate,
    count: u32,
    snapshots: Vec<Snapshot>,
}

impl Series {
    fn new(
        tenant_id: TenantId,
        granularity: Granularity,
        start: NaiveDate,
        count: u32,
        mut snapshots: Vec<Snapshot>,
    ) -> Self {
        snapshots.sort_by_key(|s| s.date);
        Self {
            tenant_id,
            granularity,
            start,
            count,
            snapshots,
        }
    }

    /// Tenant the series belongs to
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Bucket length
    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.count as usize
    }

    /// Whether the series has no buckets
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Buckets oldest to newest, folded lazily
    pub fn points(&self) -> impl Iterator<Item = SeriesPoint> + '_ {
        let length = i64::from(self.granularity.days());

        (0..i64::from(self.count)).map(move |i| {
            let period_start = self.start + Duration::days(i * length);
            let period_end = period_start + Duration::days(length - 1);

            let from = self.snapshots.partition_point(|s| s.date < period_start);
            let to = self.snapshots.partition_point(|s| s.date <= period_end);

            SeriesPoint::fold(period_start, period_end, &self.snapshots[from..to])
        })
    }
}

impl<T: TenantRepository, S: SnapshotRepository, P: BillingPlatform> SnapshotService<T, S, P> {
    /// Read the trailing `count` buckets of `granularity` ending today
    #[instrument(skip(self))]
    pub async fn get_series(
        &self,
        tenant_id: &str,
        granularity: Granularity,
        count: u32,
    ) -> Result<Series, CoreError> {
        let tenant = TenantId::parse(tenant_id)?;

        let span_days = count.saturating_mul(granularity.days());
        if count == 0 || span_days > MAX_SERIES_DAYS {
            return Err(CoreError::Validation(format!(
                "series must cover 1 to {MAX_SERIES_DAYS} days, got {count} x {granularity}"
            )));
        }

        self.load_tenant(&tenant).await?;

        let end = Utc::now().date_naive();
        let start = end - Duration::days(i64::from(span_days) - 1);
        let snapshots = self.snapshots.find_in_range(&tenant, start, end).await?;

        debug!(tenant_id = %tenant, from = %start, to = %end, snapshots = snapshots.len(), "loaded series window");

        Ok(Series::new(tenant, granularity, start, count, snapshots))
    }
}
