use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use super::error::{CacheError, Result};
use super::keys::CacheKey;

/// Stored result of one remote call
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: serde_json::Value,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Backing storage for [`super::CacheLayer`]
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<()>;

    /// Returns whether an entry was removed
    fn remove(&self, key: &CacheKey) -> Result<bool>;

    fn clear(&self) -> Result<()>;

    /// Drop every entry that is no longer live; returns how many were dropped
    fn prune(&self, now: DateTime<Utc>) -> Result<usize>;

    fn len(&self) -> Result<usize>;
}

/// Process-local map keyed by call signature
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for InMemoryStore {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: CacheKey, entry: CacheEntry) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        debug!(key = %key, expires_at = %entry.expires_at, "Cache entry stored");
        entries.insert(key, entry);
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        entries.clear();
        Ok(())
    }

    fn prune(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }

    fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| CacheError::Poisoned)?;
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn entry(expires_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry {
            value: json!(["a", "b"]),
            expires_at,
        }
    }

    #[test]
    fn test_put_get_remove() {
        let store = InMemoryStore::new();
        let key = CacheKey::trending("10", "US");
        let now = Utc::now();

        store.put(key.clone(), entry(now + Duration::hours(1))).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.get(&key).unwrap().unwrap().is_live(now));

        assert!(store.remove(&key).unwrap());
        assert!(!store.remove(&key).unwrap());
        assert!(store.get(&key).unwrap().is_none());
    }

    #[test]
    fn test_prune_drops_expired_only() {
        let store = InMemoryStore::new();
        let now = Utc::now();

        store
            .put(CacheKey::trending("10", "US"), entry(now - Duration::seconds(1)))
            .unwrap();
        store
            .put(CacheKey::trending("10", "KR"), entry(now + Duration::hours(1)))
            .unwrap();

        assert_eq!(store.prune(now).unwrap(), 1);
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.get(&CacheKey::trending("10", "KR")).unwrap().is_some());
    }

    #[test]
    fn test_expiry_boundary_is_not_live() {
        let now = Utc::now();
        assert!(!entry(now).is_live(now));
    }
}
