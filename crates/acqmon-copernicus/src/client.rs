//! HTTP client for the Copernicus Open Access Hub OpenSearch endpoint.
//!
//! Wraps `reqwest` with basic auth, paging over `rows`/`start`, and retry on
//! transient hub failures. Use [`CopernicusClient::from_app_config`] in the
//! binary or [`CopernicusClient::with_base_url`] to point at a mock server.

use std::time::Duration;

use acqmon_core::{AppConfig, Expected};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Url};
use tracing::{debug, info};

use crate::error::CopernicusError;
use crate::normalize::entry_to_expected;
use crate::retry::retry_with_backoff;
use crate::types::{Entry, Feed, SearchResponse};

const DEFAULT_BASE_URL: &str = "https://apihub.copernicus.eu/apihub/";

/// The hub rejects `rows` above 100.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Search criteria for one acquisition query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub product_type: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// WKT polygon; products must intersect it.
    pub footprint: Option<String>,
}

impl ProductQuery {
    /// Products of `product_type` ingested in `[as_of - lookback_days, as_of]`.
    #[must_use]
    pub fn window(product_type: &str, as_of: DateTime<Utc>, lookback_days: u32) -> Self {
        Self {
            product_type: product_type.to_string(),
            start: as_of - chrono::Duration::days(i64::from(lookback_days)),
            end: as_of,
            footprint: None,
        }
    }

    #[must_use]
    pub fn with_footprint(mut self, footprint: Option<String>) -> Self {
        self.footprint = footprint;
        self
    }

    /// The OpenSearch `q` parameter.
    #[must_use]
    pub fn to_search_string(&self) -> String {
        let mut q = format!(
            "producttype:{} AND ingestiondate:[{} TO {}]",
            self.product_type,
            self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        if let Some(wkt) = &self.footprint {
            q.push_str(&format!(" AND footprint:\"Intersects({wkt})\""));
        }
        q
    }
}

/// Client for the Copernicus search API.
pub struct CopernicusClient {
    client: Client,
    base_url: Url,
    username: String,
    password: String,
    page_size: u32,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl CopernicusClient {
    /// Creates a client pointed at the production hub.
    ///
    /// # Errors
    ///
    /// Returns [`CopernicusError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        username: &str,
        password: &str,
        timeout_secs: u64,
    ) -> Result<Self, CopernicusError> {
        Self::with_base_url(username, password, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client from application configuration, including retry
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns [`CopernicusError::MissingCredentials`] if either credential
    /// is unset, or the errors of [`CopernicusClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, CopernicusError> {
        let (username, password) = config
            .copernicus_credentials()
            .ok_or(CopernicusError::MissingCredentials)?;
        let client = Self::with_base_url(
            username,
            password,
            config.api_request_timeout_secs,
            &config.copernicus_base_url,
        )?;
        Ok(client.with_retry(config.api_max_retries, config.api_retry_backoff_base_ms))
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    /// Retries are off until [`CopernicusClient::with_retry`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`CopernicusError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CopernicusError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        username: &str,
        password: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, CopernicusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("acqmon/0.1 (completeness-reporting)")
            .build()?;

        // Exactly one trailing slash, so joining "search" appends a segment
        // instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CopernicusError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            username: username.to_owned(),
            password: password.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: 0,
            backoff_base_ms: 0,
        })
    }

    #[must_use]
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Page size for `rows`; clamped to `1..=100`.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    /// Expected records for every product matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`CopernicusClient::search_all`], or
    /// [`CopernicusError::Source`] if an entry cannot be converted.
    pub async fn query_expected(
        &self,
        query: &ProductQuery,
    ) -> Result<Vec<Expected>, CopernicusError> {
        let entries = self.search_all(query).await?;
        let expected = entries
            .iter()
            .map(entry_to_expected)
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            product_type = %query.product_type,
            expected = expected.len(),
            "loaded expected acquisitions"
        );
        Ok(expected)
    }

    /// Every entry matching `query`, following pages until the reported
    /// total is reached or a page comes back empty.
    ///
    /// # Errors
    ///
    /// - [`CopernicusError::Http`] on network failure or non-2xx status after
    ///   retries are exhausted.
    /// - [`CopernicusError::Deserialize`] if a page does not match the
    ///   expected shape.
    pub async fn search_all(&self, query: &ProductQuery) -> Result<Vec<Entry>, CopernicusError> {
        let q = query.to_search_string();
        info!(query = %q, "querying Copernicus hub");

        let mut entries = Vec::new();
        let mut start: u64 = 0;
        loop {
            let feed = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
                self.search_page(&q, start)
            })
            .await?;

            let total = feed.total_results;
            let page = feed.entry.into_vec();
            let received = page.len() as u64;
            debug!(start, received, total, "received Copernicus page");
            entries.extend(page);

            start += received;
            if received == 0 || start >= total {
                break;
            }
        }

        info!(entries = entries.len(), "Copernicus query complete");
        Ok(entries)
    }

    /// Fetches one page of results starting at offset `start`.
    async fn search_page(&self, q: &str, start: u64) -> Result<Feed, CopernicusError> {
        let url = self.build_search_url(q, start)?;
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?
            .error_for_status()?;
        let body = response.text().await?;

        let parsed: SearchResponse =
            serde_json::from_str(&body).map_err(|e| CopernicusError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;
        Ok(parsed.feed)
    }

    /// `{base}search?q=...&rows=...&start=...&format=json`, percent-encoded.
    fn build_search_url(&self, q: &str, start: u64) -> Result<Url, CopernicusError> {
        let mut url = self
            .base_url
            .join("search")
            .map_err(|e| CopernicusError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut()
            .append_pair("q", q)
            .append_pair("rows", &self.page_size.to_string())
            .append_pair("start", &start.to_string())
            .append_pair("format", "json");
        Ok(url)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
