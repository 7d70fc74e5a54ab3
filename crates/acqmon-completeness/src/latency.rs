//! Latest-timestamp latency for a single product.

use acqmon_core::{Actual, LatencyResult};

/// Newest acquisition and processing times across `actual`.
///
/// Returns `None` when there are no records. Processing times that are null
/// are skipped, so the result carries `None` there only if every record
/// lacks one. The two maxima are independent and may come from different
/// records.
#[must_use]
pub fn compute_latency(actual: &[Actual]) -> Option<LatencyResult> {
    let latest_sat_acq_ts = actual.iter().map(|a| a.center_dt).max()?;
    let latest_processing_ts = actual.iter().filter_map(|a| a.processing_dt).max();

    Some(LatencyResult {
        latest_sat_acq_ts,
        latest_processing_ts,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_has_no_latency() {
        assert_eq!(compute_latency(&[]), None);
    }

    #[test]
    fn picks_independent_maxima() {
        let records = vec![
            Actual::direct("a", "55HBU", ts(1, 0), Some(ts(4, 0))),
            Actual::direct("b", "55HBU", ts(3, 0), Some(ts(3, 6))),
            Actual::direct("c", "55HBV", ts(2, 0), None),
        ];

        let latency = compute_latency(&records).expect("records present");

        assert_eq!(latency.latest_sat_acq_ts, ts(3, 0));
        assert_eq!(latency.latest_processing_ts, Some(ts(4, 0)));
        assert_eq!(latency.processing_lag(), Some(Duration::hours(24)));
    }

    #[test]
    fn all_null_processing_times() {
        let records = vec![Actual::direct("a", "55HBU", ts(1, 0), None)];

        let latency = compute_latency(&records).expect("records present");

        assert_eq!(latency.latest_sat_acq_ts, ts(1, 0));
        assert_eq!(latency.latest_processing_ts, None);
        assert_eq!(latency.processing_lag(), None);
    }
}
