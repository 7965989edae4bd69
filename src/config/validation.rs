use super::models::Config;
use thiserror::Error;

/// Largest id batch the platform accepts in one lookup
pub const PLATFORM_BATCH_LIMIT: usize = 50;

pub const MAX_RETRIES: u32 = 10;
pub const MAX_RETRY_BACKOFF_MS: u64 = 60_000;
/// One week
pub const MAX_CACHE_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const MAX_SEARCH_WINDOW_DAYS: u32 = 365;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid platform base URL '{url}', expected an http:// or https:// URL")]
    InvalidBaseUrl { url: String },

    #[error("{field} must be between 1 and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },

    #[error("Daily quota limit must be positive")]
    ZeroDailyLimit,

    #[error("Cache TTL must be positive")]
    ZeroCacheTtl,

    #[error("Sweep concurrency must be at least 1")]
    ZeroSweepConcurrency,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_platform(config)?;
    validate_quota(config)?;
    validate_fetch(config)?;
    validate_cache(config)?;
    Ok(())
}

fn validate_platform(config: &Config) -> Result<(), ValidationError> {
    let url = &config.platform.base_url;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ValidationError::InvalidBaseUrl { url: url.clone() });
    }

    check_max(
        "platform.max_retries",
        u64::from(config.platform.max_retries),
        u64::from(MAX_RETRIES),
    )?;
    check_max(
        "platform.retry_backoff_ms",
        config.platform.retry_backoff_ms,
        MAX_RETRY_BACKOFF_MS,
    )?;
    Ok(())
}

fn validate_quota(config: &Config) -> Result<(), ValidationError> {
    if config.quota.daily_limit == 0 {
        return Err(ValidationError::ZeroDailyLimit);
    }
    Ok(())
}

fn validate_fetch(config: &Config) -> Result<(), ValidationError> {
    let fetch = &config.fetch;
    let limit = PLATFORM_BATCH_LIMIT as u64;

    check_range("fetch.batch_size", fetch.batch_size as u64, limit)?;
    check_range("fetch.max_results", u64::from(fetch.max_results), limit)?;
    check_range(
        "fetch.trending_per_region",
        u64::from(fetch.trending_per_region),
        limit,
    )?;
    check_range(
        "fetch.search_window_days",
        u64::from(fetch.search_window_days),
        u64::from(MAX_SEARCH_WINDOW_DAYS),
    )?;

    if fetch.sweep_concurrency == 0 {
        return Err(ValidationError::ZeroSweepConcurrency);
    }
    Ok(())
}

fn validate_cache(config: &Config) -> Result<(), ValidationError> {
    if config.cache.ttl_secs == 0 {
        return Err(ValidationError::ZeroCacheTtl);
    }
    check_max("cache.ttl_secs", config.cache.ttl_secs, MAX_CACHE_TTL_SECS)
}

fn check_range(field: &'static str, value: u64, max: u64) -> Result<(), ValidationError> {
    if value == 0 || value > max {
        return Err(ValidationError::OutOfRange { field, value, max });
    }
    Ok(())
}

fn check_max(field: &'static str, value: u64, max: u64) -> Result<(), ValidationError> {
    if value > max {
        return Err(ValidationError::TooLarge { field, value, max });
    }
    Ok(())
}
