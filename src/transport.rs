//! HTTP transport for the feed service
//!
//! The client only needs the status, content type and body of a single GET
//! request. Anything with retries, caching or pooling policy lives outside
//! this crate.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::Result;
use crate::config::ApiConfig;
use crate::error::WaqiError;

/// Fully received response of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Performs a single GET against the feed service
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// `path` is relative to the service root, `query` is appended as-is
    /// after percent-encoding.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<FeedResponse>;
}

/// [`FeedTransport`] backed by `reqwest`
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the configured service
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("waqi-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WaqiError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FeedTransport for HttpTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<FeedResponse> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("WAQI request: GET {}", url);

        let start_time = Instant::now();
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json, text/plain, */*")
            .query(query)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        debug!(
            "WAQI response {} ({}) in {:.3}s",
            status,
            content_type,
            start_time.elapsed().as_secs_f64()
        );

        Ok(FeedResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let config = ApiConfig {
            token: None,
            base_url: "https://api.waqi.info/".to_string(),
            timeout_seconds: 10,
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.base_url, "https://api.waqi.info");
    }
}
