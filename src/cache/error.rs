use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, CacheError>;
