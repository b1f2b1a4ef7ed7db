use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::{AppError, AppResult, ProviderError, ProviderResult};

/// JSON-over-HTTP client shared by the metadata providers
///
/// Every request is bounded by a single total timeout; transport failures,
/// non-success statuses and undecodable bodies all come back as
/// [`ProviderError`] values.
#[derive(Debug, Clone)]
pub struct StandardHttpClient {
    client: Client,
    timeout: Duration,
}

impl StandardHttpClient {
    /// Create a client whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and decode the body as JSON
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        debug!("Fetching JSON content from: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_transport(url, &e))?;

        debug!("Fetched {} bytes from {}", bytes.len(), url);

        serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::malformed(url, format!("Failed to parse JSON: {e}")))
    }
}
