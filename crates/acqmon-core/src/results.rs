//! Computed completeness results and the write plan derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Region label used on the leading whole-of-area row of every write plan.
pub const SUMMARY_REGION_LABEL: &str = "all_s2";

/// Completeness statistics for one region.
///
/// `expected == actual + missing` always holds; `actual` is derived from the
/// other two rather than counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionResult {
    pub region_id: String,
    pub expected: usize,
    pub actual: usize,
    pub missing: usize,
    /// Percentage in `[0, 100]`; `None` when nothing was expected.
    pub completeness: Option<f64>,
    pub latest_sat_acq_ts: Option<DateTime<Utc>>,
    pub latest_processing_ts: Option<DateTime<Utc>>,
    /// Expected dataset ids with no matching actual record, ascending.
    pub missing_ids: Vec<String>,
    /// Actual records in this region whose parent was not expected. Reported
    /// for diagnostics only; never folded into `actual`.
    pub orphaned: usize,
}

/// Whole-of-area aggregate over every region result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub expected: usize,
    pub actual: usize,
    pub missing: usize,
    pub completeness: Option<f64>,
    pub latest_sat_acq_ts: Option<DateTime<Utc>>,
    pub latest_processing_ts: Option<DateTime<Utc>>,
    pub orphaned: usize,
}

/// Latest acquisition and processing times for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencyResult {
    pub latest_sat_acq_ts: DateTime<Utc>,
    pub latest_processing_ts: Option<DateTime<Utc>>,
}

impl LatencyResult {
    /// Acquisition-to-processing delay of the newest processed dataset, if known.
    #[must_use]
    pub fn processing_lag(&self) -> Option<chrono::Duration> {
        self.latest_processing_ts
            .map(|processed| processed - self.latest_sat_acq_ts)
    }
}

/// A missing scene recorded against its parent completeness row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingScene {
    pub scene_id: String,
    pub execution_date: DateTime<Utc>,
}

/// One insertable completeness row plus its missing-scene children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteRow {
    pub region_label: String,
    pub completeness: Option<f64>,
    pub expected: usize,
    pub actual: usize,
    pub product_id: String,
    pub latest_sat_acq_ts: Option<DateTime<Utc>>,
    pub latest_processing_ts: Option<DateTime<Utc>>,
    pub execution_date: DateTime<Utc>,
    pub missing_scenes: Vec<MissingScene>,
}

/// Ordered rows to persist: a summary row first, then one row per region.
///
/// Plans for several products can be concatenated with [`WritePlan::extend`]
/// before a single insert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WritePlan {
    pub rows: Vec<WriteRow>,
}

impl WritePlan {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of missing-scene child rows across the plan.
    #[must_use]
    pub fn missing_scene_count(&self) -> usize {
        self.rows.iter().map(|r| r.missing_scenes.len()).sum()
    }

    pub fn extend(&mut self, other: WritePlan) {
        self.rows.extend(other.rows);
    }
}
