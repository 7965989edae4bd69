//! Scripted in-process platform for tests and offline runs

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::traits::{PlatformClient, PlatformError, SearchFilters};
use super::types::{
    ChannelItem, ChannelStatistics, ContentDetails, SearchItem, SearchItemId, Snippet,
    Thumbnail, Thumbnails, VideoItem, VideoStatistics,
};

/// Build a fully populated video item
pub fn video_item(
    id: &str,
    channel_id: &str,
    published_at: DateTime<Utc>,
    duration_secs: u64,
    views: u64,
    likes: u64,
    comments: u64,
) -> VideoItem {
    VideoItem {
        id: id.to_string(),
        snippet: Snippet {
            title: format!("Video {}", id),
            channel_id: channel_id.to_string(),
            channel_title: format!("Channel {}", channel_id),
            published_at: published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            thumbnails: Thumbnails {
                medium: Some(Thumbnail {
                    url: format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id),
                }),
            },
        },
        content_details: ContentDetails {
            duration: format!("PT{}S", duration_secs),
        },
        statistics: VideoStatistics {
            view_count: views,
            like_count: likes,
            comment_count: comments,
        },
    }
}

#[derive(Debug, Default)]
pub struct CallCounts {
    pub search: usize,
    pub popular: usize,
    pub videos: usize,
    pub channels: usize,
}

#[derive(Debug, Default)]
pub struct MockPlatform {
    videos: HashMap<String, VideoItem>,
    channels: HashMap<String, u64>,
    searches: HashMap<String, Vec<String>>,
    popular: HashMap<(String, String), Vec<String>>,
    failing_regions: HashSet<String>,
    failing_videos: HashSet<String>,
    fail_search: bool,
    fail_channels: bool,
    search_calls: AtomicUsize,
    popular_calls: AtomicUsize,
    video_calls: AtomicUsize,
    channel_calls: AtomicUsize,
    video_batches: Mutex<Vec<usize>>,
    channel_batches: Mutex<Vec<Vec<String>>>,
    last_search: Mutex<Option<SearchFilters>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, item: VideoItem) -> Self {
        self.videos.insert(item.id.clone(), item);
        self
    }

    pub fn with_channel(mut self, channel_id: &str, subscribers: u64) -> Self {
        self.channels.insert(channel_id.to_string(), subscribers);
        self
    }

    pub fn with_search(mut self, query: &str, ids: &[&str]) -> Self {
        self.searches
            .insert(query.to_string(), ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_popular(mut self, region: &str, category_id: &str, ids: &[&str]) -> Self {
        self.popular.insert(
            (region.to_string(), category_id.to_string()),
            ids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn failing_region(mut self, region: &str) -> Self {
        self.failing_regions.insert(region.to_string());
        self
    }

    /// Any statistics batch containing `video_id` fails
    pub fn failing_video(mut self, video_id: &str) -> Self {
        self.failing_videos.insert(video_id.to_string());
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn failing_channels(mut self) -> Self {
        self.fail_channels = true;
        self
    }

    pub fn calls(&self) -> CallCounts {
        CallCounts {
            search: self.search_calls.load(Ordering::SeqCst),
            popular: self.popular_calls.load(Ordering::SeqCst),
            videos: self.video_calls.load(Ordering::SeqCst),
            channels: self.channel_calls.load(Ordering::SeqCst),
        }
    }

    /// Sizes of every statistics batch requested, in call order
    pub fn video_batch_sizes(&self) -> Vec<usize> {
        self.video_batches
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    pub fn channel_batches(&self) -> Vec<Vec<String>> {
        self.channel_batches
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    pub fn last_search(&self) -> Option<SearchFilters> {
        self.last_search.lock().ok().and_then(|s| s.clone())
    }

    fn rejected(message: &str) -> PlatformError {
        PlatformError::Api {
            status: 403,
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    async fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchItem>, PlatformError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_search.lock() {
            *last = Some(filters.clone());
        }
        if self.fail_search {
            return Err(Self::rejected("search disabled"));
        }

        Ok(self
            .searches
            .get(query)
            .map(|ids| {
                ids.iter()
                    .take(filters.max_results as usize)
                    .map(|id| SearchItem {
                        id: SearchItemId {
                            kind: SearchItem::VIDEO_KIND.to_string(),
                            video_id: Some(id.clone()),
                        },
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_popular(
        &self,
        region_code: &str,
        category_id: &str,
        max_results: u32,
    ) -> Result<Vec<VideoItem>, PlatformError> {
        self.popular_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_regions.contains(region_code) {
            return Err(PlatformError::Transport(format!("{} unreachable", region_code)));
        }

        let key = (region_code.to_string(), category_id.to_string());
        Ok(self
            .popular
            .get(&key)
            .map(|ids| {
                ids.iter()
                    .take(max_results as usize)
                    .map(|id| {
                        self.videos.get(id).cloned().unwrap_or_else(|| VideoItem {
                            id: id.clone(),
                            ..VideoItem::default()
                        })
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_videos(&self, ids: &[String]) -> Result<Vec<VideoItem>, PlatformError> {
        self.video_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut batches) = self.video_batches.lock() {
            batches.push(ids.len());
        }
        if ids.iter().any(|id| self.failing_videos.contains(id)) {
            return Err(PlatformError::Timeout);
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.videos.get(id).cloned())
            .collect())
    }

    async fn get_channels(&self, ids: &[String]) -> Result<Vec<ChannelItem>, PlatformError> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut batches) = self.channel_batches.lock() {
            batches.push(ids.to_vec());
        }
        if self.fail_channels {
            return Err(Self::rejected("channels disabled"));
        }

        Ok(ids
            .iter()
            .filter_map(|id| {
                self.channels.get(id).map(|subscribers| ChannelItem {
                    id: id.clone(),
                    statistics: ChannelStatistics {
                        subscriber_count: *subscribers,
                    },
                })
            })
            .collect())
    }
}
