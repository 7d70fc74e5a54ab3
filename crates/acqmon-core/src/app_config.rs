use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// The subset of configuration that needs no database or API access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
    pub env: Environment,
    pub log_level: String,
    pub jobs_path: PathBuf,
    pub aux_data_path: PathBuf,
    pub default_lookback_days: u32,
}

#[derive(Clone)]
pub struct AppConfig {
    /// Reporting database; the only database this workspace writes to.
    pub database_url: String,
    /// Product catalog, queried read-only for expected and actual datasets.
    pub odc_database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub jobs_path: PathBuf,
    /// Directory holding region list files referenced by jobs.
    pub aux_data_path: PathBuf,
    pub default_lookback_days: u32,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub copernicus_base_url: String,
    pub copernicus_username: Option<String>,
    pub copernicus_password: Option<String>,
    pub api_request_timeout_secs: u64,
    pub api_max_retries: u32,
    pub api_retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("jobs_path", &self.jobs_path)
            .field("aux_data_path", &self.aux_data_path)
            .field("database_url", &"[redacted]")
            .field("odc_database_url", &"[redacted]")
            .field("default_lookback_days", &self.default_lookback_days)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("copernicus_base_url", &self.copernicus_base_url)
            .field("copernicus_username", &self.copernicus_username)
            .field(
                "copernicus_password",
                &self.copernicus_password.as_ref().map(|_| "[redacted]"),
            )
            .field("api_request_timeout_secs", &self.api_request_timeout_secs)
            .field("api_max_retries", &self.api_max_retries)
            .field("api_retry_backoff_base_ms", &self.api_retry_backoff_base_ms)
            .finish()
    }
}

impl AppConfig {
    /// Returns the Copernicus credentials when both halves are configured.
    #[must_use]
    pub fn copernicus_credentials(&self) -> Option<(&str, &str)> {
        match (&self.copernicus_username, &self.copernicus_password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}
