//! Video platform access
//!
//! - [`PlatformClient`] - the narrow interface the fetch layer depends on
//! - [`YouTubeClient`] - reqwest implementation against the Data API v3
//! - [`MockPlatform`] - scripted in-process client for tests
//! - [`VideoRecord`] - flattened per-video statistics handed to the aggregator

mod http;
pub mod mock;
mod traits;
pub(crate) mod types;

pub use http::YouTubeClient;
pub use mock::MockPlatform;
pub use traits::{PlatformClient, PlatformError, SearchFilters};
pub use types::{
    ChannelItem, ChannelStatistics, ContentDetails, SearchItem, SearchItemId, Snippet,
    Thumbnail, Thumbnails, VideoItem, VideoRecord, VideoStatistics,
};
