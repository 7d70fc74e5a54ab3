pub mod aoi;
pub mod app_config;
pub mod config;
pub mod datasets;
pub mod jobs;
pub mod results;

pub use aoi::{load_region_list, parse_region_list};
pub use app_config::{AppConfig, Environment, LocalConfig};
pub use config::{load_app_config, load_app_config_from_env, load_local_config};
pub use datasets::{Actual, Expected, Regional};
pub use jobs::{load_jobs, JobConfig, JobKind, JobsFile, SensorConfig};
pub use results::{
    LatencyResult, MissingScene, RegionResult, SummaryResult, WritePlan, WriteRow,
    SUMMARY_REGION_LABEL,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read jobs file at {path}: {source}")]
    JobsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse jobs file: {0}")]
    JobsFileParse(#[from] serde_yaml::Error),
    #[error("failed to read region list at {path}: {source}")]
    RegionListIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("validation error: {0}")]
    Validation(String),
}

/// A source record could not be turned into an [`Expected`] or [`Actual`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_name} record {record} is missing required field `{field}`")]
    MissingField {
        source_name: &'static str,
        record: String,
        field: &'static str,
    },
}
