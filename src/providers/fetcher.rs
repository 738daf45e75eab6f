use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::models::AdapterError;
use crate::constants::network;
use crate::metrics::DatasourceMetrics;

/// Fetches upstream payloads over HTTP
pub struct Fetcher {
    client: Client,
    provider: String,
    timeout_secs: u64,
}

impl Fetcher {
    /// Creates a new Fetcher with a reusable HTTP client
    pub fn new(provider: &str, timeout_secs: u64) -> Result<Self, AdapterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(network::USER_AGENT)
            .build()
            .map_err(|e| AdapterError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            provider: provider.to_string(),
            timeout_secs,
        })
    }

    /// Fetches the response body of the specified URL as text
    pub async fn fetch_text(&self, url: &str) -> Result<String, AdapterError> {
        debug!("[{}] Fetching data from: {}", self.provider, url);
        let started = Instant::now();

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                let error = if e.is_timeout() {
                    AdapterError::Timeout(self.timeout_secs)
                } else {
                    AdapterError::Network(e.to_string())
                };
                warn!("[{}] Network error fetching from {}: {}", self.provider, url, e);
                DatasourceMetrics::record_fetch(&self.provider, error.kind(), started.elapsed());
                return Err(error);
            }
        };

        let status = response.status();

        if !status.is_success() {
            warn!(
                "[{}] HTTP error {} from {}: {}",
                self.provider,
                status.as_u16(),
                url,
                status.canonical_reason().unwrap_or("Unknown")
            );
            DatasourceMetrics::record_fetch(&self.provider, "http_status", started.elapsed());
            return Err(AdapterError::HttpStatus(status.as_u16()));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                let error = if e.is_timeout() {
                    AdapterError::Timeout(self.timeout_secs)
                } else {
                    AdapterError::Network(e.to_string())
                };
                warn!("[{}] Failed to read body from {}: {}", self.provider, url, e);
                DatasourceMetrics::record_fetch(&self.provider, error.kind(), started.elapsed());
                return Err(error);
            }
        };

        DatasourceMetrics::record_fetch(&self.provider, "success", started.elapsed());
        DatasourceMetrics::record_response_size(&self.provider, body.len());
        debug!("[{}] Fetched {} bytes from {}", self.provider, body.len(), url);
        Ok(body)
    }

    /// Fetches and parses JSON from the specified URL
    ///
    /// Upstreams such as Cumulus serve JSON as `text/plain`, so the body is
    /// parsed regardless of the content type.
    pub async fn fetch_json(&self, url: &str) -> Result<Value, AdapterError> {
        let body = self.fetch_text(url).await?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("[{}] JSON parsing error for {}: {}", self.provider, url, e);
            DatasourceMetrics::record_parse_error(&self.provider, "json");
            AdapterError::MalformedPayload(format!("invalid JSON from {}: {}", url, e))
        })
    }
}
