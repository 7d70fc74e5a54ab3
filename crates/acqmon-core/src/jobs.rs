//! Completeness job definitions loaded from `config/jobs.yaml`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_product_type() -> String {
    "S2MSI1C".to_string()
}

/// One satellite platform tracked by an ARD job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Platform tag matched against [`crate::Expected::sensor`], e.g. `"s2a"`.
    pub id: String,
    /// Catalog product holding the processed datasets for this platform.
    pub odc_code: String,
    /// Product id written to the reporting database.
    pub rep_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum JobKind {
    /// Expected datasets come from the acquisition API and are split per sensor.
    Ard {
        sensors: Vec<SensorConfig>,
        /// Acquisition API product type to query.
        #[serde(default = "default_product_type")]
        product_type: String,
        /// Optional WKT footprint restricting the acquisition query.
        #[serde(default)]
        footprint: Option<String>,
    },
    /// Expected datasets are the upstream catalog products; actual datasets
    /// are the `target` product joined on their parent id.
    Derivative {
        upstream: Vec<String>,
        target: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub name: String,
    /// Region list file name, resolved against the aux data directory.
    pub aoi_file: String,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub lookback_days: Option<u32>,
    #[serde(flatten)]
    pub kind: JobKind,
}

impl JobConfig {
    #[must_use]
    pub fn lookback_days_or(&self, default: u32) -> u32 {
        self.lookback_days.unwrap_or(default)
    }

    /// Short label for logs: `"ard"` or `"derivative"`.
    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            JobKind::Ard { .. } => "ard",
            JobKind::Derivative { .. } => "derivative",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsFile {
    pub jobs: Vec<JobConfig>,
}

impl JobsFile {
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&JobConfig> {
        self.jobs.iter().find(|j| j.name == name)
    }
}

/// Load and validate job definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_jobs(path: &Path) -> Result<JobsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::JobsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let jobs_file: JobsFile = serde_yaml::from_str(&content)?;

    validate_jobs(&jobs_file)?;

    Ok(jobs_file)
}

fn validate_jobs(jobs_file: &JobsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for job in &jobs_file.jobs {
        if job.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "job name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(job.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate job name: '{}'",
                job.name
            )));
        }

        if job.aoi_file.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "job '{}' has an empty aoi_file",
                job.name
            )));
        }

        if job.lookback_days == Some(0) {
            return Err(ConfigError::Validation(format!(
                "job '{}' has lookback_days 0; must be at least 1",
                job.name
            )));
        }

        match &job.kind {
            JobKind::Ard { sensors, .. } => validate_sensors(&job.name, sensors)?,
            JobKind::Derivative { upstream, target } => {
                if upstream.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "derivative job '{}' must list at least one upstream product",
                        job.name
                    )));
                }
                if target.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "derivative job '{}' has an empty target",
                        job.name
                    )));
                }
                if upstream.iter().any(|u| u == target) {
                    return Err(ConfigError::Validation(format!(
                        "derivative job '{}' lists its target '{target}' as upstream",
                        job.name
                    )));
                }
            }
        }
    }

    Ok(())
}

fn validate_sensors(job_name: &str, sensors: &[SensorConfig]) -> Result<(), ConfigError> {
    if sensors.is_empty() {
        return Err(ConfigError::Validation(format!(
            "ard job '{job_name}' must list at least one sensor"
        )));
    }

    let mut seen_ids = HashSet::new();
    for sensor in sensors {
        if sensor.id.trim().is_empty()
            || sensor.odc_code.trim().is_empty()
            || sensor.rep_code.trim().is_empty()
        {
            return Err(ConfigError::Validation(format!(
                "ard job '{job_name}' has a sensor with an empty id, odc_code, or rep_code"
            )));
        }
        if !seen_ids.insert(sensor.id.as_str()) {
            return Err(ConfigError::Validation(format!(
                "ard job '{job_name}' lists sensor '{}' twice",
                sensor.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "jobs_test.rs"]
mod tests;
