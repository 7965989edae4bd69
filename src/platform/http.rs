//! HTTP client for the YouTube Data API v3

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::{PlatformClient, PlatformError, SearchFilters};
use super::types::{ChannelItem, ErrorEnvelope, ListResponse, SearchItem, VideoItem};
use crate::config::PlatformConfig;

pub type Result<T> = std::result::Result<T, PlatformError>;

/// API-key authenticated client with timeouts and retry
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>, config: &PlatformConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(PlatformError::MissingCredential);
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// GET a list endpoint with retry, keeping only items that decode
    async fn list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut attempts = 0;

        let response = loop {
            attempts += 1;

            match self.get_once(endpoint, params).await {
                Ok(response) => {
                    if attempts > 1 {
                        debug!(endpoint, attempts, "Request succeeded after retry");
                    }
                    break response;
                }
                Err(e) if e.is_retryable() && attempts < self.max_retries => {
                    warn!(endpoint, attempts, error = %e, "Request failed, retrying");

                    // Exponential backoff: base, 2x base, 4x base...
                    let backoff = self
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempts - 1));
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    warn!(endpoint, attempts, error = %e, "Request failed");
                    return Err(e);
                }
            }
        };

        let total = response.items.len();
        let items: Vec<T> = response
            .items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(item) => Some(item),
                Err(e) => {
                    debug!(endpoint, error = %e, "Skipping malformed item");
                    None
                }
            })
            .collect();

        debug!(endpoint, total, kept = items.len(), "List response decoded");
        Ok(items)
    }

    /// Single attempt (no retry)
    async fn get_once(&self, endpoint: &str, params: &[(&str, String)]) -> Result<ListResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlatformError::Timeout
                } else {
                    PlatformError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Transport(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown").to_string());
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| PlatformError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PlatformClient for YouTubeClient {
    async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<SearchItem>> {
        let mut params = vec![
            ("part", "snippet".to_string()),
            ("q", query.to_string()),
            ("type", "video".to_string()),
            ("order", "date".to_string()),
            ("maxResults", filters.max_results.to_string()),
            (
                "publishedAfter",
                filters
                    .published_after
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];
        if let Some(region) = &filters.region_code {
            params.push(("regionCode", region.clone()));
        }

        self.list("search", &params).await
    }

    async fn list_popular(
        &self,
        region_code: &str,
        category_id: &str,
        max_results: u32,
    ) -> Result<Vec<VideoItem>> {
        let params = [
            ("part", "snippet,contentDetails".to_string()),
            ("chart", "mostPopular".to_string()),
            ("regionCode", region_code.to_string()),
            ("videoCategoryId", category_id.to_string()),
            ("maxResults", max_results.to_string()),
        ];

        self.list("videos", &params).await
    }

    async fn get_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        let params = [
            ("part", "snippet,contentDetails,statistics".to_string()),
            ("id", ids.join(",")),
        ];

        self.list("videos", &params).await
    }

    async fn get_channels(&self, ids: &[String]) -> Result<Vec<ChannelItem>> {
        let params = [("part", "statistics".to_string()), ("id", ids.join(","))];

        self.list("channels", &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_credential() {
        let config = PlatformConfig::default();
        assert!(matches!(
            YouTubeClient::new("  ", &config),
            Err(PlatformError::MissingCredential)
        ));
    }

    #[test]
    fn test_client_normalizes_base_url() {
        let config = PlatformConfig {
            base_url: "http://127.0.0.1:9/youtube/v3/".to_string(),
            ..PlatformConfig::default()
        };
        let client = YouTubeClient::new("key", &config).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9/youtube/v3");
        assert_eq!(client.max_retries, 3);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let config = PlatformConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            max_retries: 1,
            connect_timeout_secs: 1,
            request_timeout_secs: 1,
            ..PlatformConfig::default()
        };
        let client = YouTubeClient::new("key", &config).unwrap();

        let err = client.get_channels(&["UC1".to_string()]).await.unwrap_err();
        assert!(matches!(
            err,
            PlatformError::Transport(_) | PlatformError::Timeout
        ));
    }
}
