use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::types::{ChannelItem, SearchItem, VideoItem};

/// Platform call errors; the fetch layer degrades all of them to "no data"
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("no API credential configured")]
    MissingCredential,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out")]
    Timeout,
    #[error("platform rejected request (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl PlatformError {
    /// Transport hiccups and server-side errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            PlatformError::Transport(_) | PlatformError::Timeout => true,
            PlatformError::Api { status, .. } => *status >= 500,
            PlatformError::MissingCredential | PlatformError::Decode(_) => false,
        }
    }
}

/// Filters for a keyword search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub published_after: DateTime<Utc>,
    pub region_code: Option<String>,
    pub max_results: u32,
}

/// Remote video platform
///
/// Implementations return raw items; batching, caching and quota accounting
/// happen in [`crate::fetcher::Fetcher`].
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Newest-first video search
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchItem>, PlatformError>;

    /// Currently most popular videos of one region and category
    async fn list_popular(
        &self,
        region_code: &str,
        category_id: &str,
        max_results: u32,
    ) -> Result<Vec<VideoItem>, PlatformError>;

    /// Snippet, content details and statistics for up to 50 ids
    async fn get_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>, PlatformError>;

    /// Channel statistics for up to 50 ids
    async fn get_channels(&self, ids: &[String]) -> Result<Vec<ChannelItem>, PlatformError>;
}
