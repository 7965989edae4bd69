//! Runtime settings
//!
//! Settings are layered: struct defaults, then `config/hotshot.toml` (or the
//! file named by `HOTSHOT_CONFIG`), then `HOTSHOT__<SECTION>__<KEY>`
//! environment variables, e.g. `HOTSHOT__FETCH__SWEEP_CONCURRENCY=4` or
//! `HOTSHOT__QUOTA__ENFORCEMENT=hard`. A `.env` file is honored.
//!
//! The API key is a secret and is only taken from `YOUTUBE_API_KEY`.
//!
//! ```no_run
//! use hotshot::config::Config;
//!
//! # fn main() -> Result<(), hotshot::config::ConfigError> {
//! let config = Config::load()?;
//! println!("daily quota: {}", config.quota.daily_limit);
//! # Ok(())
//! # }
//! ```

mod models;
mod sources;
mod validation;

pub use models::{
    CacheConfig, Config, DisplayConfig, ExportConfig, FetchConfig, PlatformConfig, QuotaConfig,
};
pub use sources::ConfigSources;
pub use validation::{
    MAX_CACHE_TTL_SECS, MAX_RETRIES, MAX_RETRY_BACKOFF_MS, MAX_SEARCH_WINDOW_DAYS,
    PLATFORM_BATCH_LIMIT, ValidationError,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

impl Config {
    /// Assemble from the discovered sources, attach the API key and validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = ConfigSources::discover().build()?;
        config.platform.api_key = sources::api_key_from_env();
        validation::validate(&config)?;
        Ok(config)
    }

    /// Like [`Config::load`] but from an explicit source set, without the API key
    pub fn from_sources(sources: ConfigSources) -> Result<Self, ConfigError> {
        let config = sources.build()?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sources_with(contents: &str) -> (TempDir, ConfigSources) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hotshot.toml");
        fs::write(&path, contents).unwrap();
        let sources = ConfigSources::file(path).with_env(Vec::<(String, String)>::new());
        (dir, sources)
    }

    #[test]
    fn test_partial_file_is_valid() {
        let (_dir, sources) = sources_with("[fetch]\nsweep_concurrency = 2\n");

        let config = Config::from_sources(sources).unwrap();
        assert_eq!(config.fetch.sweep_concurrency, 2);
        assert_eq!(config.quota.daily_limit, 10_000);
    }

    #[test]
    fn test_oversized_batch_is_invalid() {
        let (_dir, sources) = sources_with("[fetch]\nbatch_size = 100\n");

        assert!(matches!(
            Config::from_sources(sources),
            Err(ConfigError::Invalid(ValidationError::OutOfRange { .. }))
        ));
    }

    #[test]
    fn test_malformed_file_is_load_error() {
        let (_dir, sources) = sources_with("[fetch\nbatch_size = ");

        assert!(matches!(Config::from_sources(sources), Err(ConfigError::Load(_))));
    }
}
