use acqmon_core::SourceError;
use thiserror::Error;

/// Errors returned by the Copernicus search client.
#[derive(Debug, Error)]
pub enum CopernicusError {
    /// Network or TLS failure, or a non-2xx status, from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Username or password not configured.
    #[error("Copernicus credentials are not configured (COPERNICUS_USERNAME / COPERNICUS_PASSWORD)")]
    MissingCredentials,

    #[error("invalid Copernicus base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A search entry lacked a field needed to build an expected record.
    #[error(transparent)]
    Source(#[from] SourceError),
}
