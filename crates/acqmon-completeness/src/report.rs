//! Structured logging of computed results.

use acqmon_core::{RegionResult, SummaryResult};
use tracing::{debug, info};

/// Log a product's summary at `info` and the per-region breakdown, orphan
/// counts and missing ids at `debug`.
pub fn log_results(label: &str, summary: &SummaryResult, results: &[RegionResult]) {
    info!(
        product = %label,
        expected = summary.expected,
        actual = summary.actual,
        missing = summary.missing,
        completeness = ?summary.completeness,
        latest_sat_acq_ts = ?summary.latest_sat_acq_ts,
        latest_processing_ts = ?summary.latest_processing_ts,
        "completeness summary"
    );

    if summary.orphaned > 0 {
        debug!(
            product = %label,
            orphaned = summary.orphaned,
            "actual datasets with no expected parent"
        );
    }

    for result in results {
        debug!(
            product = %label,
            region = %result.region_id,
            expected = result.expected,
            actual = result.actual,
            missing = result.missing,
            orphaned = result.orphaned,
            completeness = ?result.completeness,
            latest_sat_acq_ts = ?result.latest_sat_acq_ts,
            latest_processing_ts = ?result.latest_processing_ts,
            "region completeness"
        );
        for missing_id in &result.missing_ids {
            debug!(
                product = %label,
                region = %result.region_id,
                dataset_id = %missing_id,
                "missing"
            );
        }
    }
}
