use chrono::{DateTime, TimeZone, Utc};

use super::*;

fn ts(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 3, day, hour, 0, 0).unwrap()
}

fn regions(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| (*s).to_string()).collect()
}

fn expected(id: &str, region: &str) -> Expected {
    Expected::new(id, region)
}

fn actual(parent: &str, region: &str, acq: DateTime<Utc>) -> Actual {
    Actual::derived(format!("{parent}-derived"), parent, region, acq, None)
}

fn find<'a>(results: &'a [RegionResult], region: &str) -> &'a RegionResult {
    results
        .iter()
        .find(|r| r.region_id == region)
        .unwrap_or_else(|| panic!("region {region} missing from results"))
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn two_region_scenario() {
    let list = regions(&["r1", "r2"]);
    let exp = vec![
        expected("a", "r1"),
        expected("b", "r1"),
        expected("c", "r2"),
    ];
    let act = vec![actual("a", "r1", ts(1, 0))];

    let (summary, results) = compute_completeness(&exp, &act, &list);

    let r1 = find(&results, "r1");
    assert_eq!(r1.expected, 2);
    assert_eq!(r1.actual, 1);
    assert_eq!(r1.missing, 1);
    assert_eq!(r1.missing_ids, vec!["b"]);
    assert_eq!(r1.completeness, Some(50.0));
    assert_eq!(r1.latest_sat_acq_ts, Some(ts(1, 0)));

    let r2 = find(&results, "r2");
    assert_eq!(r2.expected, 1);
    assert_eq!(r2.actual, 0);
    assert_eq!(r2.missing, 1);
    assert_eq!(r2.missing_ids, vec!["c"]);
    assert_eq!(r2.completeness, Some(0.0));
    assert_eq!(r2.latest_sat_acq_ts, None);

    assert_eq!(summary.expected, 3);
    assert_eq!(summary.actual, 1);
    assert_eq!(summary.missing, 2);
    let pct = summary.completeness.expect("summary completeness");
    assert!((pct - 100.0 / 3.0).abs() < 1e-9, "got {pct}");
    assert_eq!(summary.latest_sat_acq_ts, Some(ts(1, 0)));
}

#[test]
fn region_without_expected_is_zero_and_null() {
    let list = regions(&["r1", "quiet"]);
    let exp = vec![expected("a", "r1")];
    let act = vec![actual("a", "r1", ts(1, 0))];

    let (_, results) = compute_completeness(&exp, &act, &list);
    let quiet = find(&results, "quiet");

    assert_eq!(quiet.expected, 0);
    assert_eq!(quiet.actual, 0);
    assert_eq!(quiet.missing, 0);
    assert_eq!(quiet.completeness, None);
    assert!(quiet.missing_ids.is_empty());
    assert_eq!(quiet.latest_sat_acq_ts, None);
    assert_eq!(quiet.latest_processing_ts, None);
}

#[test]
fn empty_region_list_yields_empty_summary() {
    let exp = vec![expected("a", "r1")];
    let act = vec![actual("a", "r1", ts(1, 0))];

    let (summary, results) = compute_completeness(&exp, &act, &[]);

    assert!(results.is_empty());
    assert_eq!(summary.expected, 0);
    assert_eq!(summary.actual, 0);
    assert_eq!(summary.missing, 0);
    assert_eq!(summary.completeness, None);
    assert_eq!(summary.latest_sat_acq_ts, None);
}

#[test]
fn results_follow_region_list_order() {
    let list = regions(&["r3", "r1", "r2"]);
    let exp = vec![expected("a", "r1"), expected("b", "r2"), expected("c", "r3")];

    let (_, results) = compute_completeness(&exp, &[], &list);
    let order: Vec<&str> = results.iter().map(|r| r.region_id.as_str()).collect();

    assert_eq!(order, vec!["r3", "r1", "r2"]);
}

#[test]
fn records_outside_region_list_are_ignored() {
    let list = regions(&["r1"]);
    let exp = vec![expected("a", "r1"), expected("x", "outside")];
    let act = vec![actual("a", "r1", ts(1, 0)), actual("x", "outside", ts(2, 0))];

    let (summary, results) = compute_completeness(&exp, &act, &list);

    assert_eq!(results.len(), 1);
    assert_eq!(summary.expected, 1);
    assert_eq!(summary.actual, 1);
    assert_eq!(summary.latest_sat_acq_ts, Some(ts(1, 0)));
}

// ---------------------------------------------------------------------------
// Join and timestamp rules
// ---------------------------------------------------------------------------

#[test]
fn orphan_actual_does_not_count_toward_actual() {
    let list = regions(&["r1"]);
    // Actual data with no expected parent at all.
    let act = vec![actual("ghost", "r1", ts(5, 0))];

    let (summary, results) = compute_completeness(&[], &act, &list);
    let r1 = find(&results, "r1");

    assert_eq!(r1.expected, 0);
    assert_eq!(r1.actual, 0);
    assert_eq!(r1.completeness, None);
    assert_eq!(r1.orphaned, 1);
    // Orphans are excluded from the latest timestamps too.
    assert_eq!(r1.latest_sat_acq_ts, None);
    assert_eq!(summary.orphaned, 1);
}

#[test]
fn duplicate_parent_references_do_not_inflate_actual() {
    let list = regions(&["r1"]);
    let exp = vec![expected("a", "r1"), expected("b", "r1")];
    let act = vec![
        actual("a", "r1", ts(1, 0)),
        Actual::derived("a-reprocessed", "a", "r1", ts(1, 0), Some(ts(3, 0))),
    ];

    let (_, results) = compute_completeness(&exp, &act, &list);
    let r1 = find(&results, "r1");

    assert_eq!(r1.actual, 1);
    assert_eq!(r1.missing, 1);
    assert_eq!(r1.orphaned, 0);
    assert_eq!(r1.latest_processing_ts, Some(ts(3, 0)));
}

#[test]
fn direct_join_matches_same_granule() {
    let list = regions(&["55HBU"]);
    let exp = vec![expected("S2A_T55HBU_1", "55HBU")];
    let act = vec![Actual::direct("S2A_T55HBU_1", "55HBU", ts(1, 2), None)];

    let (_, results) = compute_completeness(&exp, &act, &list);

    assert_eq!(results[0].completeness, Some(100.0));
    assert!(results[0].missing_ids.is_empty());
}

#[test]
fn latest_processing_skips_null_values() {
    let list = regions(&["r1"]);
    let exp = vec![expected("a", "r1"), expected("b", "r1"), expected("c", "r1")];
    let act = vec![
        Actual::derived("a1", "a", "r1", ts(1, 0), Some(ts(2, 0))),
        Actual::derived("b1", "b", "r1", ts(4, 0), None),
        Actual::derived("c1", "c", "r1", ts(3, 0), Some(ts(3, 12))),
    ];

    let (_, results) = compute_completeness(&exp, &act, &list);

    assert_eq!(results[0].latest_sat_acq_ts, Some(ts(4, 0)));
    assert_eq!(results[0].latest_processing_ts, Some(ts(3, 12)));
}

#[test]
fn latest_processing_is_null_when_all_null() {
    let list = regions(&["r1"]);
    let exp = vec![expected("a", "r1")];
    let act = vec![actual("a", "r1", ts(1, 0))];

    let (summary, results) = compute_completeness(&exp, &act, &list);

    assert_eq!(results[0].latest_processing_ts, None);
    assert_eq!(summary.latest_processing_ts, None);
}

#[test]
fn missing_ids_are_sorted() {
    let list = regions(&["r1"]);
    let exp = vec![expected("c", "r1"), expected("a", "r1"), expected("b", "r1")];

    let (_, results) = compute_completeness(&exp, &[], &list);

    assert_eq!(results[0].missing_ids, vec!["a", "b", "c"]);
}

#[test]
fn duplicate_expected_ids_keep_invariant() {
    let list = regions(&["r1"]);
    let exp = vec![expected("a", "r1"), expected("a", "r1"), expected("b", "r1")];

    let (_, results) = compute_completeness(&exp, &[], &list);
    let r1 = &results[0];

    assert_eq!(r1.expected, 3);
    assert_eq!(r1.missing, 2);
    assert_eq!(r1.actual, 1);
    assert_eq!(r1.expected, r1.actual + r1.missing);
}

// ---------------------------------------------------------------------------
// Properties over a larger mixed input
// ---------------------------------------------------------------------------

fn mixed_input() -> (Vec<Expected>, Vec<Actual>, Vec<String>) {
    let list = regions(&["55HBU", "55HBV", "56JKT", "56JKU"]);
    let exp = vec![
        expected("g1", "55HBU"),
        expected("g2", "55HBU"),
        expected("g3", "55HBU"),
        expected("g4", "55HBV"),
        expected("g5", "56JKT"),
        expected("g6", "56JKT"),
        expected("g7", "elsewhere"),
    ];
    let act = vec![
        Actual::derived("d1", "g1", "55HBU", ts(1, 1), Some(ts(1, 5))),
        Actual::derived("d3", "g3", "55HBU", ts(2, 1), Some(ts(2, 3))),
        Actual::derived("d4", "g4", "55HBV", ts(6, 1), None),
        Actual::derived("d9", "g9", "56JKU", ts(9, 1), Some(ts(9, 2))),
    ];
    (exp, act, list)
}

#[test]
fn every_region_satisfies_additive_invariant() {
    let (exp, act, list) = mixed_input();
    let (_, results) = compute_completeness(&exp, &act, &list);

    for r in &results {
        assert_eq!(r.expected, r.actual + r.missing, "region {}", r.region_id);
    }
}

#[test]
fn completeness_is_null_iff_nothing_expected() {
    let (exp, act, list) = mixed_input();
    let (_, results) = compute_completeness(&exp, &act, &list);

    for r in &results {
        match r.completeness {
            None => assert_eq!(r.expected, 0, "region {}", r.region_id),
            Some(pct) => {
                assert!(r.expected > 0);
                assert_eq!(Some(pct), completeness_percent(r.actual, r.expected));
            }
        }
    }
}

#[test]
fn summary_counts_are_sums_of_regions() {
    let (exp, act, list) = mixed_input();
    let (summary, results) = compute_completeness(&exp, &act, &list);

    assert_eq!(summary.expected, results.iter().map(|r| r.expected).sum::<usize>());
    assert_eq!(summary.actual, results.iter().map(|r| r.actual).sum::<usize>());
    assert_eq!(summary.missing, results.iter().map(|r| r.missing).sum::<usize>());
    assert_eq!(summary.expected, 6);
    assert_eq!(summary.actual, 3);
}

#[test]
fn summary_completeness_is_recomputed_not_averaged() {
    let (exp, act, list) = mixed_input();
    let (summary, results) = compute_completeness(&exp, &act, &list);

    // Regions: 2/3, 1/1, 0/2, null. The mean of the non-null percentages is
    // 55.55..., the pooled ratio is 50.
    assert_eq!(summary.completeness, Some(50.0));
    let non_null: Vec<f64> = results.iter().filter_map(|r| r.completeness).collect();
    #[allow(clippy::cast_precision_loss)]
    let mean = non_null.iter().sum::<f64>() / non_null.len() as f64;
    assert!((mean - 50.0).abs() > 1.0);
}

#[test]
fn summary_latest_timestamps_are_max_of_regions() {
    let (exp, act, list) = mixed_input();
    let (summary, results) = compute_completeness(&exp, &act, &list);

    assert_eq!(
        summary.latest_sat_acq_ts,
        results.iter().filter_map(|r| r.latest_sat_acq_ts).max()
    );
    assert_eq!(summary.latest_sat_acq_ts, Some(ts(6, 1)));
    // 56JKU's record is an orphan, so its later processing time is ignored.
    assert_eq!(summary.latest_processing_ts, Some(ts(2, 3)));
}

#[test]
fn compute_is_idempotent() {
    let (exp, act, list) = mixed_input();
    let first = compute_completeness(&exp, &act, &list);
    let second = compute_completeness(&exp, &act, &list);

    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[test]
fn completeness_percent_handles_zero_expected() {
    assert_eq!(completeness_percent(0, 0), None);
    assert_eq!(completeness_percent(0, 4), Some(0.0));
    assert_eq!(completeness_percent(4, 4), Some(100.0));
    assert_eq!(completeness_percent(1, 8), Some(12.5));
}

#[test]
fn filter_expected_to_sensor_keeps_matching_tags() {
    let exp = vec![
        expected("a", "r1").with_sensor("s2a"),
        expected("b", "r1").with_sensor("s2b"),
        expected("c", "r1"),
    ];

    let s2a = filter_expected_to_sensor(&exp, "s2a");

    assert_eq!(s2a.len(), 1);
    assert_eq!(s2a[0].dataset_id, "a");
    assert!(filter_expected_to_sensor(&exp, "s2c").is_empty());
}
