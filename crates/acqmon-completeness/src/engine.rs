//! Reconciliation of expected against actual datasets.
//!
//! For each region the expected ids are compared with the parent ids of the
//! actual records. Counts satisfy `expected == actual + missing` by
//! construction: `actual` is `expected - missing`, never a count of actual
//! records, so actual records without an expected parent cannot inflate it.
//! Those are tallied separately as `orphaned`.

use std::collections::{BTreeSet, HashSet};

use acqmon_core::{Actual, Expected, RegionResult, SummaryResult};
use tracing::debug;

use crate::partition::partition;

/// Completeness for every region in `region_list`, plus the aggregate.
///
/// Regions are reported in `region_list` order. Records outside the list are
/// ignored.
#[must_use]
pub fn compute_completeness(
    expected: &[Expected],
    actual: &[Actual],
    region_list: &[String],
) -> (SummaryResult, Vec<RegionResult>) {
    let expected_parts = partition(expected, region_list);
    let actual_parts = partition(actual, region_list);
    if expected_parts.dropped() > 0 || actual_parts.dropped() > 0 {
        debug!(
            regions = expected_parts.region_count(),
            dropped_expected = expected_parts.dropped(),
            dropped_actual = actual_parts.dropped(),
            "records outside the region list ignored"
        );
    }

    let results: Vec<RegionResult> = region_list
        .iter()
        .map(|region| {
            compute_region(
                region,
                expected_parts.get(region),
                actual_parts.get(region),
            )
        })
        .collect();

    let summary = summarize(&results);
    (summary, results)
}

/// Completeness for one region from records already filtered to it.
#[must_use]
pub fn compute_region(
    region_id: &str,
    expected: &[&Expected],
    actual: &[&Actual],
) -> RegionResult {
    let expected_keys: HashSet<&str> = expected.iter().map(|e| e.dataset_id.as_str()).collect();
    let actual_keys: HashSet<&str> = actual.iter().map(|a| a.parent_id.as_str()).collect();

    let missing_ids: Vec<String> = expected_keys
        .difference(&actual_keys)
        .copied()
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    let matched: Vec<&Actual> = actual
        .iter()
        .copied()
        .filter(|a| expected_keys.contains(a.parent_id.as_str()))
        .collect();

    let latest_sat_acq_ts = matched.iter().map(|a| a.center_dt).max();
    let latest_processing_ts = matched.iter().filter_map(|a| a.processing_dt).max();

    let expected_count = expected.len();
    let missing_count = missing_ids.len();
    // Duplicate expected ids collapse in the key set, so missing can never
    // exceed the record count.
    let actual_count = expected_count - missing_count;

    RegionResult {
        region_id: region_id.to_string(),
        expected: expected_count,
        actual: actual_count,
        missing: missing_count,
        completeness: completeness_percent(actual_count, expected_count),
        latest_sat_acq_ts,
        latest_processing_ts,
        missing_ids,
        orphaned: actual.len() - matched.len(),
    }
}

/// Aggregate region results into a whole-of-area summary.
///
/// Completeness is recomputed from the summed counts, not averaged.
#[must_use]
pub fn summarize(results: &[RegionResult]) -> SummaryResult {
    let expected: usize = results.iter().map(|r| r.expected).sum();
    let actual: usize = results.iter().map(|r| r.actual).sum();
    let missing: usize = results.iter().map(|r| r.missing).sum();

    SummaryResult {
        expected,
        actual,
        missing,
        completeness: completeness_percent(actual, expected),
        latest_sat_acq_ts: results.iter().filter_map(|r| r.latest_sat_acq_ts).max(),
        latest_processing_ts: results.iter().filter_map(|r| r.latest_processing_ts).max(),
        orphaned: results.iter().map(|r| r.orphaned).sum(),
    }
}

/// `actual / expected * 100`, or `None` when nothing was expected.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn completeness_percent(actual: usize, expected: usize) -> Option<f64> {
    if expected == 0 {
        None
    } else {
        Some(actual as f64 / expected as f64 * 100.0)
    }
}

/// Expected records tagged with `sensor`. Untagged records never match.
#[must_use]
pub fn filter_expected_to_sensor(expected: &[Expected], sensor: &str) -> Vec<Expected> {
    expected
        .iter()
        .filter(|e| e.sensor.as_deref() == Some(sensor))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
