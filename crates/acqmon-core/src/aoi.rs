//! Area-of-interest region lists.
//!
//! A region list is a plain-text file with one tile identifier per line. It
//! defines which regions a completeness run tracks and in what order results
//! are reported.

use std::collections::HashSet;
use std::path::Path;

use crate::ConfigError;

/// Read and parse a region list file.
///
/// # Errors
///
/// Returns [`ConfigError::RegionListIo`] if the file cannot be read.
pub fn load_region_list(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RegionListIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(parse_region_list(&content))
}

/// Parse region list content.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. Duplicates
/// keep their first position so the result is ordered and deduplicated.
#[must_use]
pub fn parse_region_list(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_blank_lines_and_comments() {
        let content = "# sentinel-2 tiles\n55HBU\n\n  55HBV  \n# trailing\n";
        assert_eq!(parse_region_list(content), vec!["55HBU", "55HBV"]);
    }

    #[test]
    fn parse_deduplicates_keeping_first_position() {
        let content = "55HBV\n55HBU\n55HBV\n56JKT\n55HBU\n";
        assert_eq!(parse_region_list(content), vec!["55HBV", "55HBU", "56JKT"]);
    }

    #[test]
    fn parse_handles_crlf() {
        let content = "55HBU\r\n55HBV\r\n";
        assert_eq!(parse_region_list(content), vec!["55HBU", "55HBV"]);
    }

    #[test]
    fn parse_empty_content_is_empty_list() {
        assert!(parse_region_list("").is_empty());
        assert!(parse_region_list("\n\n# nothing\n").is_empty());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_region_list(Path::new("/nonexistent/aoi.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::RegionListIo { .. }));
    }

    #[test]
    fn load_bundled_sentinel2_list() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("aux")
            .join("sentinel2_aoi_list.txt");
        let regions = load_region_list(&path).expect("bundled region list should load");
        assert!(!regions.is_empty());
    }
}
