//! Write-plan generation.

use acqmon_core::{
    MissingScene, RegionResult, SummaryResult, WritePlan, WriteRow, SUMMARY_REGION_LABEL,
};
use chrono::{DateTime, Utc};

/// Build the rows to persist for one product.
///
/// Row 0 is the whole-of-area summary labelled [`SUMMARY_REGION_LABEL`] with
/// no missing scenes. One row per region follows, in the order given, each
/// carrying its missing ids as child scenes stamped with `execution_date`.
#[must_use]
pub fn generate_write_plan(
    product_label: &str,
    summary: &SummaryResult,
    region_results: &[RegionResult],
    execution_date: DateTime<Utc>,
) -> WritePlan {
    let mut rows = Vec::with_capacity(region_results.len() + 1);

    rows.push(WriteRow {
        region_label: SUMMARY_REGION_LABEL.to_string(),
        completeness: summary.completeness,
        expected: summary.expected,
        actual: summary.actual,
        product_id: product_label.to_string(),
        latest_sat_acq_ts: summary.latest_sat_acq_ts,
        latest_processing_ts: summary.latest_processing_ts,
        execution_date,
        missing_scenes: Vec::new(),
    });

    rows.extend(region_results.iter().map(|r| WriteRow {
        region_label: r.region_id.clone(),
        completeness: r.completeness,
        expected: r.expected,
        actual: r.actual,
        product_id: product_label.to_string(),
        latest_sat_acq_ts: r.latest_sat_acq_ts,
        latest_processing_ts: r.latest_processing_ts,
        execution_date,
        missing_scenes: r
            .missing_ids
            .iter()
            .map(|id| MissingScene {
                scene_id: id.clone(),
                execution_date,
            })
            .collect(),
    }));

    WritePlan { rows }
}
