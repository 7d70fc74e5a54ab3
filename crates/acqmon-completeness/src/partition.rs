//! Region partitioning.

use std::collections::HashMap;

use acqmon_core::Regional;

/// Records grouped by region, restricted to a region list.
#[derive(Debug)]
pub struct Partitioned<'a, T> {
    by_region: HashMap<&'a str, Vec<&'a T>>,
    dropped: usize,
}

impl<'a, T> Partitioned<'a, T> {
    /// Records for `region_id`; empty for listed regions with no data and
    /// for regions outside the list.
    #[must_use]
    pub fn get(&self, region_id: &str) -> &[&'a T] {
        self.by_region.get(region_id).map_or(&[], Vec::as_slice)
    }

    /// Number of records whose region was not in the list.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Number of regions tracked (the size of the deduplicated region list).
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.by_region.len()
    }
}

/// Group `records` by region.
///
/// Every region in `region_list` gets an entry, even with no records.
/// Records in regions outside the list are dropped: the list defines what is
/// tracked. Input order is preserved within each region.
#[must_use]
pub fn partition<'a, T: Regional>(
    records: &'a [T],
    region_list: &'a [String],
) -> Partitioned<'a, T> {
    let mut by_region: HashMap<&'a str, Vec<&'a T>> = region_list
        .iter()
        .map(|r| (r.as_str(), Vec::new()))
        .collect();
    let mut dropped = 0;

    for record in records {
        match by_region.get_mut(record.region_id()) {
            Some(bucket) => bucket.push(record),
            None => dropped += 1,
        }
    }

    Partitioned { by_region, dropped }
}
