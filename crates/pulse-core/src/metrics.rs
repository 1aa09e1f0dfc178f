//! Operational counters.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the host
//! process installs a recorder.
//!
//! # Metrics
//!
//! - `pulse_snapshots_captured_total` - Counter of capture attempts by status
//! - `pulse_backfills_total` - Counter of backfill runs by outcome
//! - `pulse_snapshots_written_total` - Counter of stored snapshots by source

use metrics::counter;
use pulse_types::SnapshotSource;

use crate::BackfillOutcome;

/// Metric name for capture attempts.
pub const SNAPSHOTS_CAPTURED_TOTAL: &str = "pulse_snapshots_captured_total";

/// Metric name for backfill runs.
pub const BACKFILLS_TOTAL: &str = "pulse_backfills_total";

/// Metric name for snapshot writes.
pub const SNAPSHOTS_WRITTEN_TOTAL: &str = "pulse_snapshots_written_total";

/// Record a capture attempt.
pub fn record_capture(success: bool) {
    let status = if success { "success" } else { "error" };
    counter!(SNAPSHOTS_CAPTURED_TOTAL, "status" => status).increment(1);
}

/// Record a finished backfill run.
pub fn record_backfill(outcome: Option<&BackfillOutcome>) {
    let label = outcome.map_or("error", BackfillOutcome::as_str);
    counter!(BACKFILLS_TOTAL, "outcome" => label).increment(1);
}

/// Record a stored snapshot.
pub fn record_snapshot_written(source: SnapshotSource) {
    counter!(SNAPSHOTS_WRITTEN_TOTAL, "source" => source.as_str()).increment(1);
}
