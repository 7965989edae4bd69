//! Per-user search session
//!
//! A session owns the quota meter, the diagnostics channel and the latest
//! result set. The cache can be shared with other sessions. Without a platform
//! client (no API key configured) every search fails with
//! [`SessionError::MissingCredential`] before any remote call.

use bon::bon;
use chrono::NaiveDateTime;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::aggregator::{Aggregator, Strategy};
use crate::cache::CacheLayer;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::export::{self, ExportError};
use crate::fetcher::{FetchSettings, Fetcher};
use crate::observability::{Diagnostics, Metrics};
use crate::platform::{PlatformClient, PlatformError, YouTubeClient};
use crate::quota::QuotaMeter;
use crate::regions::{RegionFilter, find_category};
use crate::results::{ExportRow, ResultSet, SortKey};
use crate::scoring::ScoringEngine;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no API key configured; set YOUTUBE_API_KEY")]
    MissingCredential,
    #[error("search input is empty")]
    EmptyInput,
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
    #[error("unknown region '{0}'")]
    UnknownRegion(String),
}

pub struct Session {
    id: Uuid,
    config: Config,
    quota: Arc<QuotaMeter>,
    metrics: Arc<Metrics>,
    diagnostics: Arc<Diagnostics>,
    clock: Arc<dyn Clock>,
    aggregator: Option<Aggregator>,
    scoring: ScoringEngine,
    results: Option<ResultSet>,
}

#[bon]
impl Session {
    #[builder]
    pub fn new(
        #[builder(default)] config: Config,
        platform: Option<Arc<dyn PlatformClient>>,
        cache: Option<Arc<CacheLayer>>,
        clock: Option<Arc<dyn Clock>>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let id = Uuid::now_v7();
        let clock = clock.unwrap_or_else(|| Arc::new(SystemClock));
        let metrics = metrics.unwrap_or_default();
        let diagnostics = Arc::new(Diagnostics::new());
        let quota = Arc::new(QuotaMeter::new(
            config.quota.daily_limit,
            config.quota.costs,
            config.quota.enforcement,
        ));

        let aggregator = platform.map(|client| {
            let cache = cache.unwrap_or_else(|| {
                Arc::new(CacheLayer::in_memory(clock.clone(), metrics.clone()))
            });
            let fetcher = Fetcher::builder()
                .client(client)
                .cache(cache)
                .quota(quota.clone())
                .settings(FetchSettings::from_config(&config))
                .metrics(metrics.clone())
                .diagnostics(diagnostics.clone())
                .clock(clock.clone())
                .build();
            Aggregator::new(Arc::new(fetcher), &config.fetch)
        });

        info!(session = %id, credential = aggregator.is_some(), "Session started");

        Self {
            id,
            config,
            quota,
            metrics,
            diagnostics,
            clock,
            aggregator,
            scoring: ScoringEngine::new(),
            results: None,
        }
    }

    /// Session against the live platform when an API key is configured
    pub fn from_config(config: Config) -> Result<Self, PlatformError> {
        let platform = match config.platform.api_key.as_deref() {
            Some(key) => {
                let client: Arc<dyn PlatformClient> =
                    Arc::new(YouTubeClient::new(key, &config.platform)?);
                Some(client)
            }
            None => None,
        };

        Ok(Self::builder()
            .config(config)
            .maybe_platform(platform)
            .build())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn has_credential(&self) -> bool {
        self.aggregator.is_some()
    }

    /// Search recent uploads for `keyword`, optionally restricted to a region
    pub async fn run_keyword(&mut self, keyword: &str, region: &str) -> Result<&ResultSet, SessionError> {
        self.ensure_credential()?;

        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let region = RegionFilter::parse(region)
            .ok_or_else(|| SessionError::UnknownRegion(region.trim().to_string()))?;

        let strategy = Strategy::Keyword {
            keyword: keyword.to_string(),
            region,
        };
        Ok(self.run(strategy).await)
    }

    /// Sweep every region's trending list for one category (label or id)
    pub async fn run_category(&mut self, selection: &str) -> Result<&ResultSet, SessionError> {
        self.ensure_credential()?;

        let selection = selection.trim();
        if selection.is_empty() {
            return Err(SessionError::EmptyInput);
        }
        let category = find_category(selection)
            .ok_or_else(|| SessionError::UnknownCategory(selection.to_string()))?;

        Ok(self.run(Strategy::Category { category }).await)
    }

    /// Latest completed result set, sorted by score until re-sorted
    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn sort_results(&mut self, key: SortKey) -> Option<&ResultSet> {
        let results = self.results.as_mut()?;
        results.sort_by(key);
        Some(results)
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.results
            .as_ref()
            .map(|r| r.project(self.config.display.locale, self.config.display.shorts_threshold_secs))
            .unwrap_or_default()
    }

    /// Write the latest result set into the configured export directory
    pub fn export(&self, at: NaiveDateTime) -> Result<PathBuf, ExportError> {
        export::export_to_dir(
            &self.config.export.directory,
            &self.export_rows(),
            self.config.display.locale,
            at,
        )
    }

    pub fn quota(&self) -> &QuotaMeter {
        &self.quota
    }

    pub fn quota_remaining(&self) -> i64 {
        self.quota.remaining()
    }

    pub fn reset_quota(&self) {
        self.quota.reset();
        info!(session = %self.id, "Quota reset");
    }

    /// Remote failures of the latest search
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn ensure_credential(&self) -> Result<(), SessionError> {
        if self.aggregator.is_none() {
            return Err(SessionError::MissingCredential);
        }
        Ok(())
    }

    async fn run(&mut self, strategy: Strategy) -> &ResultSet {
        // Failures belong to the search that produced them
        self.diagnostics.drain();

        let mut candidates = match &self.aggregator {
            Some(aggregator) => aggregator.collect(&strategy).await,
            None => Vec::new(),
        };
        self.scoring.apply(&mut candidates, self.clock.now());

        let mut results = ResultSet::new(candidates);
        results.sort_by(SortKey::Score);

        info!(
            session = %self.id,
            results = results.len(),
            failures = self.diagnostics.len(),
            quota_remaining = self.quota.remaining(),
            "Search finished"
        );

        self.results.insert(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::platform::MockPlatform;
    use crate::platform::mock::video_item;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn session(platform: MockPlatform) -> (Session, Arc<MockPlatform>) {
        let platform = Arc::new(platform);
        let session = Session::builder()
            .platform(platform.clone())
            .clock(Arc::new(ManualClock::new(now())))
            .build();
        (session, platform)
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_call() {
        let mut session = Session::builder().build();

        assert!(matches!(
            session.run_keyword("cats", "").await,
            Err(SessionError::MissingCredential)
        ));
        assert!(matches!(
            session.run_category("Music").await,
            Err(SessionError::MissingCredential)
        ));
        assert!(session.results().is_none());
        assert_eq!(session.quota_remaining(), 10_000);
    }

    #[tokio::test]
    async fn test_input_validation() {
        let (mut session, platform) = session(MockPlatform::new());

        assert!(matches!(session.run_keyword("   ", "").await, Err(SessionError::EmptyInput)));
        assert!(matches!(session.run_category("").await, Err(SessionError::EmptyInput)));
        assert!(matches!(
            session.run_keyword("cats", "ZZ").await,
            Err(SessionError::UnknownRegion(code)) if code == "ZZ"
        ));
        assert!(matches!(
            session.run_category("Cooking").await,
            Err(SessionError::UnknownCategory(_))
        ));
        assert_eq!(platform.calls().search, 0);
        assert_eq!(platform.calls().popular, 0);
    }

    #[tokio::test]
    async fn test_new_search_replaces_results() {
        let platform = MockPlatform::new()
            .with_video(video_item("a", "UC1", now(), 60, 100, 1, 0))
            .with_video(video_item("b", "UC1", now(), 60, 100, 1, 0))
            .with_search("first", &["a"])
            .with_search("second", &["b"]);
        let (mut session, _) = session(platform);

        session.run_keyword("first", "").await.unwrap();
        let second = session.run_keyword("second", "").await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second.candidates()[0].video_id, "b");
        assert_eq!(session.results().map(|r| r.len()), Some(1));
    }

    #[tokio::test]
    async fn test_sort_ties_keep_fetch_order_after_score_ranking() {
        let platform = MockPlatform::new()
            .with_video(video_item("first", "UC1", now() - Duration::hours(20), 60, 5_000, 10, 0))
            .with_video(video_item("second", "UC1", now() - Duration::hours(1), 60, 5_000, 10, 0))
            .with_search("ties", &["first", "second"]);
        let (mut session, _) = session(platform);

        let ranked = session.run_keyword("ties", "").await.unwrap();
        let by_score: Vec<&str> = ranked.iter().map(|c| c.video_id.as_str()).collect();
        assert_eq!(by_score, vec!["second", "first"]);

        let by_views = session.sort_results(SortKey::Views).unwrap();
        let ids: Vec<&str> = by_views.iter().map(|c| c.video_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_diagnostics_cover_latest_search_only() {
        let platform = MockPlatform::new()
            .with_video(video_item("bad", "UC1", now(), 60, 100, 1, 0))
            .with_video(video_item("good", "UC1", now(), 60, 100, 1, 0))
            .with_search("broken", &["bad"])
            .with_search("fine", &["good"])
            .failing_video("bad");
        let (mut session, _) = session(platform);

        let broken = session.run_keyword("broken", "").await.unwrap();
        assert!(broken.is_empty());
        assert_eq!(session.diagnostics().len(), 1);
        assert_eq!(session.diagnostics().failures()[0].operation, "videos");

        let fine = session.run_keyword("fine", "").await.unwrap();
        assert_eq!(fine.len(), 1);
        assert!(session.diagnostics().is_empty());
    }

    #[tokio::test]
    async fn test_quota_reset() {
        let platform = MockPlatform::new().with_search("cats", &[]);
        let (mut session, _) = session(platform);

        session.run_keyword("cats", "US").await.unwrap();
        assert_eq!(session.quota_remaining(), 9_900);

        session.reset_quota();
        assert_eq!(session.quota_remaining(), 10_000);
    }

    #[tokio::test]
    async fn test_category_by_id_or_label() {
        let platform = MockPlatform::new()
            .with_video(video_item("m", "UC1", now(), 200, 100, 1, 0))
            .with_popular("KR", "10", &["m"]);
        let (mut session, _) = session(platform);

        let by_label = session.run_category("music").await.unwrap();
        assert_eq!(by_label.candidates()[0].origin_region, "KR");

        let by_id = session.run_category("10").await.unwrap();
        assert_eq!(by_id.len(), 1);
    }
}
