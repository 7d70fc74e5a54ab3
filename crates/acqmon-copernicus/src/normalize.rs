//! Conversion of search entries into expected records.

use std::sync::LazyLock;

use acqmon_core::{Expected, SourceError};
use regex::Regex;

use crate::types::Entry;

const SOURCE_NAME: &str = "copernicus";

/// MGRS tile embedded in product names, e.g. `_T55HBU_`.
static TILE_IN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_T(\d{2}[A-Z]{3})_").expect("valid tile regex"));

/// Build an expected record from a search entry.
///
/// The dataset id is the `granuleidentifier` attribute. The region is the
/// `tileid` attribute, falling back to the tile code in the title. The
/// sensor is the lowercased platform prefix of the title (`S2A_...` ->
/// `s2a`).
///
/// # Errors
///
/// Returns [`SourceError::MissingField`] if the granule identifier is absent
/// or no region can be determined.
pub fn entry_to_expected(entry: &Entry) -> Result<Expected, SourceError> {
    let granule_id = entry
        .attribute("granuleidentifier")
        .ok_or_else(|| missing(entry, "granuleidentifier"))?;

    let region_id = entry
        .attribute("tileid")
        .map(str::to_string)
        .or_else(|| region_from_title(&entry.title))
        .ok_or_else(|| missing(entry, "tileid"))?;

    Ok(Expected::new(granule_id, region_id).with_sensor(sensor_from_title(&entry.title)))
}

/// The MGRS tile code in a product name, without its leading `T`.
#[must_use]
pub fn region_from_title(title: &str) -> Option<String> {
    TILE_IN_TITLE
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Lowercased first three characters of a product name.
#[must_use]
pub fn sensor_from_title(title: &str) -> String {
    title.chars().take(3).collect::<String>().to_lowercase()
}

fn missing(entry: &Entry, field: &'static str) -> SourceError {
    SourceError::MissingField {
        source_name: SOURCE_NAME,
        record: entry.title.clone(),
        field,
    }
}
