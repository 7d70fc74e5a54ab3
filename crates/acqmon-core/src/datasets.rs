//! Expected and actual dataset records.
//!
//! Both shapes are built fresh for each run from a time-bounded source query
//! and dropped when the run ends. Source-specific adapters live next to the
//! sources themselves (`acqmon-db` for catalog rows, `acqmon-copernicus` for
//! acquisition API entries).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dataset that, per the upstream inventory, should exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expected {
    /// Granule or scene identifier.
    pub dataset_id: String,
    /// Spatial tile identifier; only regions in the run's region list count.
    pub region_id: String,
    /// Nominal acquisition time. Only catalog-derived records carry it.
    pub center_dt: Option<DateTime<Utc>>,
    /// Platform tag such as `"s2a"`, used to split expected sets per sensor.
    pub sensor: Option<String>,
}

impl Expected {
    #[must_use]
    pub fn new(dataset_id: impl Into<String>, region_id: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            region_id: region_id.into(),
            center_dt: None,
            sensor: None,
        }
    }

    #[must_use]
    pub fn with_sensor(mut self, sensor: impl Into<String>) -> Self {
        self.sensor = Some(sensor.into());
        self
    }

    #[must_use]
    pub fn with_center_dt(mut self, center_dt: DateTime<Utc>) -> Self {
        self.center_dt = Some(center_dt);
        self
    }
}

/// A dataset confirmed as indexed in the product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actual {
    pub dataset_id: String,
    /// Join key against [`Expected::dataset_id`]. Equal to `dataset_id` for
    /// direct (same-granule) reconciliation.
    pub parent_id: String,
    pub region_id: String,
    /// Satellite acquisition time.
    pub center_dt: DateTime<Utc>,
    /// Absent for raw level-1 products.
    pub processing_dt: Option<DateTime<Utc>>,
}

impl Actual {
    /// Builds a record that reconciles against expected datasets with the
    /// same identifier.
    #[must_use]
    pub fn direct(
        dataset_id: impl Into<String>,
        region_id: impl Into<String>,
        center_dt: DateTime<Utc>,
        processing_dt: Option<DateTime<Utc>>,
    ) -> Self {
        let dataset_id = dataset_id.into();
        Self {
            parent_id: dataset_id.clone(),
            dataset_id,
            region_id: region_id.into(),
            center_dt,
            processing_dt,
        }
    }

    /// Builds a derivative record that reconciles against its upstream parent.
    #[must_use]
    pub fn derived(
        dataset_id: impl Into<String>,
        parent_id: impl Into<String>,
        region_id: impl Into<String>,
        center_dt: DateTime<Utc>,
        processing_dt: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            parent_id: parent_id.into(),
            region_id: region_id.into(),
            center_dt,
            processing_dt,
        }
    }
}

/// Anything that can be assigned to a region.
pub trait Regional {
    fn region_id(&self) -> &str;
}

impl Regional for Expected {
    fn region_id(&self) -> &str {
        &self.region_id
    }
}

impl Regional for Actual {
    fn region_id(&self) -> &str {
        &self.region_id
    }
}
