//! Age and size based sweeps, run before every insertion

use crate::store::ArtifactStore;
use crate::types::CacheRow;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

/// Default age after which a row is considered abandoned
pub const DEFAULT_RETENTION_SECS: i64 = 3 * 60;

/// Default ceiling on the summed PDF size of all rows
pub const DEFAULT_MAX_TOTAL_BYTES: u64 = 500 * 1024 * 1024;

/// Default window kept once the size ceiling is exceeded
pub const DEFAULT_PRESSURE_RETENTION_SECS: i64 = 10;

/// Coarse time-window eviction.
///
/// The size sweep deletes by age, not by row size: once the ceiling is
/// exceeded everything older than the short window goes.
#[derive(Debug, Clone)]
pub struct EvictionPolicy {
    pub retention: Duration,
    pub max_total_bytes: u64,
    pub pressure_retention: Duration,
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self {
            retention: Duration::seconds(DEFAULT_RETENTION_SECS),
            max_total_bytes: DEFAULT_MAX_TOTAL_BYTES,
            pressure_retention: Duration::seconds(DEFAULT_PRESSURE_RETENTION_SECS),
        }
    }
}

/// What a sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Rows removed by the age sweep
    pub expired: usize,
    /// Rows removed by the size sweep
    pub pressure_evicted: usize,
    /// Total artifact bytes once both sweeps finished
    pub total_bytes_after: u64,
}

impl EvictionPolicy {
    pub fn new(retention: Duration, max_total_bytes: u64, pressure_retention: Duration) -> Self {
        Self {
            retention,
            max_total_bytes,
            pressure_retention,
        }
    }

    /// Whether a row has outlived the retention window at `now`.
    ///
    /// Sweeps only run on insertion, so readers use this to stop serving
    /// rows that no insertion has removed yet. A row is already expired at
    /// exactly `created_at + retention`, while the sweep's cutoff stays
    /// exclusive.
    pub fn is_expired(&self, row: &CacheRow, now: DateTime<Utc>) -> bool {
        row.created_at() <= now - self.retention
    }

    /// Run the age sweep, then the size sweep if the store is over its ceiling
    pub async fn sweep(&self, store: &ArtifactStore, now: DateTime<Utc>) -> SweepReport {
        let expired = store.delete_older_than(now - self.retention).await;

        let total = store.total_artifact_bytes().await;
        let mut report = SweepReport {
            expired,
            pressure_evicted: 0,
            total_bytes_after: total,
        };

        if total > self.max_total_bytes {
            report.pressure_evicted = store.delete_older_than(now - self.pressure_retention).await;
            report.total_bytes_after = store.total_artifact_bytes().await;
            info!(
                total_before = total,
                max_total_bytes = self.max_total_bytes,
                evicted = report.pressure_evicted,
                total_after = report.total_bytes_after,
                "Cache over size limit, evicted recent window"
            );
        }

        if report.expired > 0 {
            info!(expired = report.expired, "Expired stale previews");
        }

        report
    }
}
