//! Remote operations behind the cache and the quota meter
//!
//! Every call goes through [`CacheLayer::get_or_compute`]; only a cache miss
//! reaches the platform, and only a successful remote call is charged. A failed
//! call is logged, counted and recorded in [`Diagnostics`], then degrades to an
//! empty result. Nothing here returns an error to the caller.

use bon::Builder;
use chrono::Duration;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheLayer};
use crate::clock::{Clock, SystemClock};
use crate::config::{Config, MAX_SEARCH_WINDOW_DAYS};
use crate::observability::{Diagnostics, Metrics};
use crate::platform::{PlatformClient, PlatformError, SearchFilters, VideoRecord};
use crate::quota::{OperationKind, QuotaMeter};
use crate::regions::RegionFilter;

/// Limits applied to remote calls
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub max_results: u32,
    pub trending_per_region: u32,
    pub batch_size: usize,
    pub search_window: Duration,
    pub cache_ttl: Duration,
}

impl FetchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_results: config.fetch.max_results,
            trending_per_region: config.fetch.trending_per_region,
            batch_size: config.fetch.batch_size.max(1),
            search_window: Duration::days(i64::from(
                config.fetch.search_window_days.min(MAX_SEARCH_WINDOW_DAYS),
            )),
            cache_ttl: config.cache.ttl(),
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug, Error)]
enum FetchError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("daily quota exhausted")]
    QuotaExhausted,
}

#[derive(Builder)]
pub struct Fetcher {
    client: Arc<dyn PlatformClient>,
    cache: Arc<CacheLayer>,
    quota: Arc<QuotaMeter>,
    #[builder(default)]
    settings: FetchSettings,
    #[builder(default)]
    metrics: Arc<Metrics>,
    #[builder(default)]
    diagnostics: Arc<Diagnostics>,
    #[builder(default = Arc::new(SystemClock) as Arc<dyn Clock>)]
    clock: Arc<dyn Clock>,
}

impl Fetcher {
    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    pub fn quota(&self) -> &QuotaMeter {
        &self.quota
    }

    /// Newest-first video ids matching `keyword` inside the search window
    pub async fn search_by_keyword(&self, keyword: &str, region: &RegionFilter) -> Vec<String> {
        let filters = SearchFilters {
            published_after: self.clock.now() - self.settings.search_window,
            region_code: region.code().map(str::to_string),
            max_results: self.settings.max_results,
        };
        let key = CacheKey::search(keyword, region.code());
        let client = &self.client;

        self.remote(OperationKind::Search, key, move || async move {
            let items = client.search(keyword, &filters).await?;
            Ok(items
                .iter()
                .filter_map(|item| item.video_id().map(str::to_string))
                .collect::<Vec<_>>())
        })
        .await
        .unwrap_or_default()
    }

    /// Most popular video ids of one region and category
    pub async fn list_trending(&self, category_id: &str, region_code: &str) -> Vec<String> {
        let key = CacheKey::trending(category_id, region_code);
        let client = &self.client;
        let per_region = self.settings.trending_per_region;

        self.remote(OperationKind::Videos, key, move || async move {
            let items = client
                .list_popular(region_code, category_id, per_region)
                .await?;
            Ok(items.into_iter().map(|item| item.id).collect::<Vec<_>>())
        })
        .await
        .unwrap_or_default()
    }

    /// Statistics records keyed by video id; one lookup per batch
    pub async fn fetch_stats(&self, video_ids: &[String]) -> HashMap<String, VideoRecord> {
        let mut records = HashMap::with_capacity(video_ids.len());
        let client = &self.client;

        for batch in video_ids.chunks(self.settings.batch_size) {
            let key = CacheKey::videos(batch);
            let fetched = self
                .remote(OperationKind::Videos, key, move || async move {
                    let items = client.get_videos(batch).await?;
                    Ok(items.into_iter().map(VideoRecord::from).collect::<Vec<_>>())
                })
                .await
                .unwrap_or_default();

            for record in fetched {
                records.insert(record.video_id.clone(), record);
            }
        }

        records
    }

    /// Subscriber counts keyed by channel id, for the distinct non-empty ids
    pub async fn fetch_subscribers(&self, channel_ids: &[String]) -> HashMap<String, u64> {
        let mut seen = HashSet::new();
        let distinct: Vec<String> = channel_ids
            .iter()
            .filter(|id| !id.is_empty() && seen.insert(id.as_str()))
            .cloned()
            .collect();

        let mut counts = HashMap::with_capacity(distinct.len());
        let client = &self.client;

        for batch in distinct.chunks(self.settings.batch_size) {
            let key = CacheKey::channels(batch);
            let fetched = self
                .remote(OperationKind::Channels, key, move || async move {
                    let items = client.get_channels(batch).await?;
                    Ok(items
                        .into_iter()
                        .map(|item| (item.id, item.statistics.subscriber_count))
                        .collect::<Vec<_>>())
                })
                .await
                .unwrap_or_default();

            counts.extend(fetched);
        }

        counts
    }

    /// Cached, quota-charged remote call; `None` when the call failed
    async fn remote<T, F, Fut>(&self, kind: OperationKind, key: CacheKey, call: F) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, PlatformError>>,
    {
        let scope = key.encode();
        let operation = key.operation();
        let quota = &*self.quota;
        let metrics = &*self.metrics;

        let result = self
            .cache
            .get_or_compute(key, self.settings.cache_ttl, move || async move {
                if !quota.permits(kind) {
                    return Err(FetchError::QuotaExhausted);
                }

                metrics.remote_call();
                let value = call().await?;

                let used = quota.charge(kind);
                metrics.quota_charged(quota.costs().cost_of(kind));
                debug!(operation, used, "Remote call succeeded");

                Ok::<_, FetchError>(value)
            })
            .await;

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                if matches!(e, FetchError::Platform(_)) {
                    self.metrics.remote_failure();
                }
                warn!(operation, scope = %scope, error = %e, "Remote call failed, using empty result");
                self.diagnostics.record(operation, scope, e.to_string());
                None
            }
        }
    }
}
