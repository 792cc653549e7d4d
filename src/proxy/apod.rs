//! Astronomy Picture of the Day upstream client
//!
//! `ImageOfDayClient` is the seam between the proxy handler and the NASA
//! API so the handler can be exercised against a deterministic stand-in.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::ProxyConfig;
use crate::error::{Result, StargazerError};

/// Fetches the picture of the day as raw JSON
#[async_trait]
pub trait ImageOfDayClient: Send + Sync {
    /// Fetch the entry for `date` (today when `None`)
    ///
    /// # Errors
    ///
    /// Returns `StargazerError::Upstream` for transport failures and
    /// non-success statuses
    async fn fetch(&self, api_key: &str, date: Option<&str>) -> Result<serde_json::Value>;
}

/// reqwest-backed client for `api.nasa.gov/planetary/apod`
pub struct ApodClient {
    client: Client,
    upstream: url::Url,
}

impl ApodClient {
    /// Create a client from proxy configuration
    ///
    /// # Errors
    ///
    /// Returns error if the upstream URL is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let upstream = url::Url::parse(&config.upstream_url).map_err(|e| {
            StargazerError::Config(format!(
                "Invalid upstream URL {}: {}",
                config.upstream_url, e
            ))
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("stargazer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StargazerError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, upstream })
    }

    /// Upstream URL with the key and optional date appended
    ///
    /// The date is passed through as given; it is only percent-encoded.
    fn request_url(&self, api_key: &str, date: Option<&str>) -> url::Url {
        let mut url = self.upstream.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", api_key);
            if let Some(date) = date {
                pairs.append_pair("date", date);
            }
        }
        url
    }
}

#[async_trait]
impl ImageOfDayClient for ApodClient {
    async fn fetch(&self, api_key: &str, date: Option<&str>) -> Result<serde_json::Value> {
        let url = self.request_url(api_key, date);
        tracing::debug!(date = ?date, "Fetching APOD from {}", self.upstream);

        // The request URL carries api_key; strip it from errors
        let response = self.client.get(url).send().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("APOD request failed: {}", e);
            StargazerError::Upstream(format!("APOD request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("APOD returned error {}: {}", status, error_text);
            return Err(
                StargazerError::Upstream(format!("NASA API responded with status {}", status))
                    .into(),
            );
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse APOD response: {}", e);
            StargazerError::Upstream(format!("Failed to parse APOD response: {}", e))
        })?;
        Ok(body)
    }
}
