//! Candidate acquisition strategies
//!
//! Keyword: one search, then statistics and channel sizes for the hits.
//! Category: a trending sweep over every region in catalog order, merged so the
//! first region to return a video keeps it, truncated to the candidate ceiling,
//! then the same enrichment.

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::fetcher::Fetcher;
use crate::regions::{Category, REGIONS, RegionFilter, UNKNOWN};
use crate::results::Candidate;

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    Keyword {
        keyword: String,
        region: RegionFilter,
    },
    Category {
        category: &'static Category,
    },
}

/// Merged output of a region sweep
#[derive(Debug, Default, PartialEq)]
pub struct Sweep {
    pub ids: Vec<String>,
    origins: HashMap<String, &'static str>,
}

impl Sweep {
    /// Region that first returned `video_id`
    pub fn origin(&self, video_id: &str) -> &'static str {
        self.origins.get(video_id).copied().unwrap_or(UNKNOWN)
    }
}

pub struct Aggregator {
    fetcher: Arc<Fetcher>,
    candidate_ceiling: usize,
    sweep_concurrency: usize,
}

impl Aggregator {
    pub fn new(fetcher: Arc<Fetcher>, config: &FetchConfig) -> Self {
        Self {
            fetcher,
            candidate_ceiling: config.candidate_ceiling,
            sweep_concurrency: config.sweep_concurrency.max(1),
        }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Unscored candidates in fetch order
    pub async fn collect(&self, strategy: &Strategy) -> Vec<Candidate> {
        match strategy {
            Strategy::Keyword { keyword, region } => {
                let ids = self.fetcher.search_by_keyword(keyword, region).await;
                info!(keyword = %keyword, region = %region, hits = ids.len(), "Keyword search finished");

                let origin = region.origin_tag();
                self.enrich(&ids, |_| origin).await
            }
            Strategy::Category { category } => {
                let sweep = self.sweep(category.id).await;
                info!(category = category.id, hits = sweep.ids.len(), "Region sweep finished");

                self.enrich(&sweep.ids, |id| sweep.origin(id)).await
            }
        }
    }

    /// Trending ids of every region, first-seen-wins, truncated to the ceiling
    pub async fn sweep(&self, category_id: &str) -> Sweep {
        let per_region: Vec<Vec<String>> = stream::iter(REGIONS.iter())
            .map(|region| self.fetcher.list_trending(category_id, region.code))
            .buffered(self.sweep_concurrency)
            .collect()
            .await;

        let mut sweep = Sweep::default();
        for (region, ids) in REGIONS.iter().zip(per_region) {
            for id in ids {
                if sweep.origins.contains_key(&id) {
                    continue;
                }
                sweep.origins.insert(id.clone(), region.code);
                sweep.ids.push(id);
            }
        }

        if sweep.ids.len() > self.candidate_ceiling {
            for dropped in sweep.ids.drain(self.candidate_ceiling..) {
                sweep.origins.remove(&dropped);
            }
        }

        sweep
    }

    async fn enrich<F>(&self, ids: &[String], origin_of: F) -> Vec<Candidate>
    where
        F: Fn(&str) -> &'static str,
    {
        if ids.is_empty() {
            return Vec::new();
        }

        let mut records = self.fetcher.fetch_stats(ids).await;

        let channel_ids: Vec<String> = ids
            .iter()
            .filter_map(|id| records.get(id))
            .map(|record| record.channel_id.clone())
            .collect();
        let subscribers = self.fetcher.fetch_subscribers(&channel_ids).await;

        let mut candidates = Vec::with_capacity(records.len());
        for id in ids {
            // Removing also drops repeated ids
            let Some(record) = records.remove(id) else {
                continue;
            };
            match Candidate::from_record(record, origin_of(id)) {
                Some(mut candidate) => {
                    candidate.subscribers =
                        subscribers.get(&candidate.channel_id).copied().unwrap_or(0);
                    candidates.push(candidate);
                }
                None => debug!(video_id = %id, "Skipping record with unparseable publish time"),
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheLayer;
    use crate::clock::ManualClock;
    use crate::observability::{Diagnostics, Metrics};
    use crate::platform::MockPlatform;
    use crate::platform::mock::video_item;
    use crate::quota::QuotaMeter;
    use crate::regions::{GLOBAL, find_category, find_region};
    use chrono::{DateTime, TimeZone, Utc};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn aggregator(
        platform: MockPlatform,
        config: FetchConfig,
    ) -> (Aggregator, Arc<MockPlatform>, Arc<Diagnostics>) {
        let platform = Arc::new(platform);
        let clock = Arc::new(ManualClock::new(start()));
        let metrics = Arc::new(Metrics::new());
        let diagnostics = Arc::new(Diagnostics::new());

        let fetcher = Fetcher::builder()
            .client(platform.clone())
            .cache(Arc::new(CacheLayer::in_memory(clock.clone(), metrics.clone())))
            .quota(Arc::new(QuotaMeter::default()))
            .metrics(metrics)
            .diagnostics(diagnostics.clone())
            .clock(clock)
            .build();

        (Aggregator::new(Arc::new(fetcher), &config), platform, diagnostics)
    }

    fn with_videos(platform: MockPlatform, ids: &[&str]) -> MockPlatform {
        ids.iter().fold(platform, |p, id| {
            p.with_video(video_item(id, &format!("UC-{}", id), start(), 60, 100, 1, 1))
        })
    }

    #[tokio::test]
    async fn test_sweep_first_seen_region_wins() {
        let platform = MockPlatform::new()
            .with_popular("US", "10", &["a", "b"])
            .with_popular("IN", "10", &["b", "c"])
            .with_popular("KR", "10", &["a", "d"]);
        let (agg, platform, _) = aggregator(platform, FetchConfig::default());

        let sweep = agg.sweep("10").await;

        assert_eq!(sweep.ids, vec!["a", "b", "c", "d"]);
        assert_eq!(sweep.origin("a"), "US");
        assert_eq!(sweep.origin("b"), "US");
        assert_eq!(sweep.origin("c"), "IN");
        assert_eq!(sweep.origin("d"), "KR");
        assert_eq!(sweep.origin("zzz"), UNKNOWN);
        assert_eq!(platform.calls().popular, 20);
    }

    #[tokio::test]
    async fn test_sweep_skips_failing_region() {
        let platform = MockPlatform::new()
            .with_popular("US", "10", &["a"])
            .with_popular("IN", "10", &["b"])
            .failing_region("US");
        let (agg, _, diagnostics) = aggregator(platform, FetchConfig::default());

        let sweep = agg.sweep("10").await;

        assert_eq!(sweep.ids, vec!["b"]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.failures()[0].scope, "trending:10|US");
    }

    #[tokio::test]
    async fn test_concurrent_sweep_matches_sequential() {
        let script = || {
            REGIONS.iter().enumerate().fold(MockPlatform::new(), |p, (i, region)| {
                let shared = format!("shared{}", i % 3);
                let own = format!("{}-own", region.code);
                p.with_popular(region.code, "20", &[shared.as_str(), own.as_str()])
            })
        };

        let (sequential, _, _) = aggregator(script(), FetchConfig::default());
        let concurrent_config = FetchConfig {
            sweep_concurrency: 8,
            ..FetchConfig::default()
        };
        let (concurrent, _, _) = aggregator(script(), concurrent_config);

        assert_eq!(sequential.sweep("20").await, concurrent.sweep("20").await);
    }

    #[tokio::test]
    async fn test_sweep_truncates_to_ceiling() {
        let platform = REGIONS.iter().fold(MockPlatform::new(), |p, region| {
            let ids: Vec<String> = (0..5).map(|i| format!("{}{}", region.code, i)).collect();
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            p.with_popular(region.code, "24", &refs)
        });
        let (agg, _, _) = aggregator(platform, FetchConfig::default());

        let sweep = agg.sweep("24").await;

        assert_eq!(sweep.ids.len(), 50);
        assert_eq!(sweep.ids[0], "US0");
        assert_eq!(sweep.ids[49], "FR4");
        assert_eq!(sweep.origin("FR4"), "FR");
        assert_eq!(sweep.origin("AU0"), UNKNOWN);
    }

    #[tokio::test]
    async fn test_keyword_candidates_in_fetch_order() {
        let platform = with_videos(MockPlatform::new(), &["x", "y", "z"])
            .with_search("rust", &["z", "x", "y", "x"])
            .with_channel("UC-x", 500);
        let (agg, _, _) = aggregator(platform, FetchConfig::default());

        let strategy = Strategy::Keyword {
            keyword: "rust".to_string(),
            region: RegionFilter::Global,
        };
        let candidates = agg.collect(&strategy).await;

        let ids: Vec<&str> = candidates.iter().map(|c| c.video_id.as_str()).collect();
        assert_eq!(ids, vec!["z", "x", "y"]);
        assert!(candidates.iter().all(|c| c.origin_region == GLOBAL));
        assert_eq!(candidates[1].subscribers, 500);
        assert_eq!(candidates[0].subscribers, 0);
    }

    #[tokio::test]
    async fn test_keyword_region_tag() {
        let platform = with_videos(MockPlatform::new(), &["x"]).with_search("rust", &["x"]);
        let (agg, _, _) = aggregator(platform, FetchConfig::default());

        let strategy = Strategy::Keyword {
            keyword: "rust".to_string(),
            region: RegionFilter::Country(find_region("jp").unwrap()),
        };
        let candidates = agg.collect(&strategy).await;

        assert_eq!(candidates[0].origin_region, "JP");
    }

    #[tokio::test]
    async fn test_unparseable_publish_time_is_skipped() {
        let mut broken = video_item("bad", "UC1", start(), 60, 1, 1, 1);
        broken.snippet.published_at = "not a date".to_string();
        let platform = with_videos(MockPlatform::new(), &["good"])
            .with_video(broken)
            .with_popular("US", "10", &["bad", "good"]);
        let (agg, _, _) = aggregator(platform, FetchConfig::default());

        let strategy = Strategy::Category {
            category: find_category("Music").unwrap(),
        };
        let candidates = agg.collect(&strategy).await;

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].video_id, "good");
        assert_eq!(candidates[0].origin_region, "US");
    }

    #[tokio::test]
    async fn test_no_hits_makes_no_lookups() {
        let (agg, platform, _) = aggregator(MockPlatform::new(), FetchConfig::default());

        let strategy = Strategy::Keyword {
            keyword: "nothing".to_string(),
            region: RegionFilter::Global,
        };
        assert!(agg.collect(&strategy).await.is_empty());

        let calls = platform.calls();
        assert_eq!(calls.search, 1);
        assert_eq!(calls.videos, 0);
        assert_eq!(calls.channels, 0);
    }
}
