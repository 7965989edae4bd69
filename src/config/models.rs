use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::quota::{DAILY_QUOTA_LIMIT, QuotaCosts, QuotaEnforcement};
use crate::regions::Locale;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Video platform connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlatformConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// API key (loaded from environment, not from config file)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            user_agent: default_user_agent(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    format!("hotshot/{}", env!("CARGO_PKG_VERSION"))
}

/// Daily budget and per-operation weights
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotaConfig {
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u64,
    #[serde(default)]
    pub costs: QuotaCosts,
    #[serde(default)]
    pub enforcement: QuotaEnforcement,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            costs: QuotaCosts::default(),
            enforcement: QuotaEnforcement::default(),
        }
    }
}

fn default_daily_limit() -> u64 {
    DAILY_QUOTA_LIMIT
}

/// Acquisition limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Page size of a keyword search
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Popular videos requested per region in a category sweep
    #[serde(default = "default_trending_per_region")]
    pub trending_per_region: u32,
    /// Ids per statistics/channel lookup (platform maximum is 50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_search_window_days")]
    pub search_window_days: u32,
    /// Merged sweep ids kept for the statistics lookup
    #[serde(default = "default_candidate_ceiling")]
    pub candidate_ceiling: usize,
    /// Regions queried at once during a sweep; 1 is a plain sequential loop
    #[serde(default = "default_sweep_concurrency")]
    pub sweep_concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            trending_per_region: default_trending_per_region(),
            batch_size: default_batch_size(),
            search_window_days: default_search_window_days(),
            candidate_ceiling: default_candidate_ceiling(),
            sweep_concurrency: default_sweep_concurrency(),
        }
    }
}

fn default_max_results() -> u32 {
    50
}

fn default_trending_per_region() -> u32 {
    5
}

fn default_batch_size() -> usize {
    50
}

fn default_search_window_days() -> u32 {
    7
}

fn default_candidate_ceiling() -> usize {
    50
}

fn default_sweep_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    /// Capped at a week so expiry arithmetic cannot overflow
    pub fn ttl(&self) -> chrono::Duration {
        let secs = self.ttl_secs.min(super::MAX_CACHE_TTL_SECS);
        chrono::Duration::seconds(secs as i64)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    crate::cache::DEFAULT_TTL_SECS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub locale: Locale,
    /// Videos at or below this length are classified as Shorts
    #[serde(default = "default_shorts_threshold_secs")]
    pub shorts_threshold_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            shorts_threshold_secs: default_shorts_threshold_secs(),
        }
    }
}

fn default_shorts_threshold_secs() -> u64 {
    crate::results::SHORTS_DURATION_LIMIT_SECS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
        }
    }
}

fn default_export_directory() -> PathBuf {
    PathBuf::from("exports")
}
