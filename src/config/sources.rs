use super::models::Config;
use config::{ConfigError, Environment, File, Map};
use std::env;
use std::path::PathBuf;

const CONFIG_PATH_VAR: &str = "HOTSHOT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/hotshot.toml";
const ENV_PREFIX: &str = "HOTSHOT";
const ENV_SEPARATOR: &str = "__";
const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// Where a [`Config`] is assembled from
///
/// Layers, lowest priority first: struct defaults, the TOML file (optional),
/// then `HOTSHOT__SECTION__KEY` variables.
#[derive(Debug, Clone)]
pub struct ConfigSources {
    file: PathBuf,
    /// Replaces the process environment; used by tests
    env: Option<Map<String, String>>,
}

impl ConfigSources {
    /// Process environment, `.env` included, and the file named by
    /// `HOTSHOT_CONFIG` (default `config/hotshot.toml`)
    pub fn discover() -> Self {
        // A missing .env is normal
        let _ = dotenvy::dotenv();

        let file = env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        Self::file(file)
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: path.into(),
            env: None,
        }
    }

    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        let mut builder = config::Config::builder();

        if self.file.exists() {
            tracing::info!(path = %self.file.display(), "Loading configuration file");
            builder = builder.add_source(File::from(self.file));
        } else {
            tracing::debug!(
                path = %self.file.display(),
                "No configuration file, using defaults and environment"
            );
        }

        // HOTSHOT__QUOTA__ENFORCEMENT=hard -> quota.enforcement
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(self.env),
        );

        builder.build()?.try_deserialize()
    }
}

/// API key from `YOUTUBE_API_KEY`; blank counts as unset
pub fn api_key_from_env() -> Option<String> {
    env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
}
