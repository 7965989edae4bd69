/// Time-bounded memoization of remote platform calls
///
/// Identical calls inside the TTL window return the stored result without
/// reaching the platform, so they never charge quota. Expiry is checked lazily
/// on lookup; `prune_expired()` sweeps explicitly when a caller wants it.
///
/// Concurrent misses for the same key are serialized: the first caller computes
/// and stores, later callers find the fresh entry once they acquire the key.
/// Failed computations are returned to the caller and not stored.
///
/// ## Usage
///
/// ```rust,ignore
/// use hotshot::cache::{CacheKey, CacheLayer};
///
/// let cache = CacheLayer::in_memory(clock, metrics);
/// let ids: Vec<String> = cache
///     .get_or_compute(CacheKey::trending("10", "US"), ttl, || async { fetch().await })
///     .await?;
/// ```
pub mod error;
pub mod keys;
pub mod store;

pub use error::{CacheError, Result};
pub use keys::CacheKey;
pub use store::{CacheEntry, CacheStore, InMemoryStore};

use chrono::Duration;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::observability::Metrics;

/// Default lifetime of a cached remote result
pub const DEFAULT_TTL_SECS: u64 = 3600;

pub struct CacheLayer {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
    inflight: Mutex<HashMap<CacheKey, Arc<tokio::sync::Mutex<()>>>>,
}

impl CacheLayer {
    pub fn new(store: Arc<dyn CacheStore>, clock: Arc<dyn Clock>, metrics: Arc<Metrics>) -> Self {
        Self {
            store,
            clock,
            metrics,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_memory(clock: Arc<dyn Clock>, metrics: Arc<Metrics>) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), clock, metrics)
    }

    /// Return the live entry for `key`, or run `compute` and store its result
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: CacheKey,
        ttl: Duration,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(value) = self.lookup(&key) {
            return Ok(value);
        }

        let key_lock = self.key_lock(&key);
        let guard = key_lock.lock().await;

        // Another caller may have filled the entry while we waited
        if let Some(value) = self.lookup(&key) {
            drop(guard);
            self.release_key(&key, &key_lock);
            return Ok(value);
        }

        self.metrics.cache_miss();
        debug!(key = %key, "Cache miss");

        let result = compute().await;
        if let Ok(value) = &result {
            self.insert(key.clone(), value, ttl);
        }

        drop(guard);
        self.release_key(&key, &key_lock);
        result
    }

    /// Drop a single entry; returns whether one existed
    pub fn invalidate(&self, key: &CacheKey) -> bool {
        self.store.remove(key).unwrap_or_else(|e| {
            warn!(key = %key, error = %e, "Cache invalidation failed");
            false
        })
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Cache clear failed");
        }
    }

    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now();
        match self.store.prune(now) {
            Ok(pruned) => {
                debug!(pruned, "Pruned expired cache entries");
                pruned
            }
            Err(e) => {
                warn!(error = %e, "Cache prune failed");
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.store.len().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let entry = match self.store.get(key) {
            Ok(entry) => entry?,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                return None;
            }
        };

        if !entry.is_live(self.clock.now()) {
            debug!(key = %key, "Cache entry expired");
            self.invalidate(key);
            return None;
        }

        match serde_json::from_value(entry.value) {
            Ok(value) => {
                self.metrics.cache_hit();
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cached value undecodable, dropping entry");
                self.invalidate(key);
                None
            }
        }
    }

    fn insert<T: Serialize>(&self, key: CacheKey, value: &T, ttl: Duration) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "Result not cacheable");
                return;
            }
        };

        let entry = CacheEntry {
            value,
            expires_at: self.clock.now() + ttl,
        };

        if let Err(e) = self.store.put(key, entry) {
            warn!(error = %e, "Cache write failed");
        }
    }

    fn key_lock(&self, key: &CacheKey) -> Arc<tokio::sync::Mutex<()>> {
        match self.inflight.lock() {
            Ok(mut inflight) => inflight.entry(key.clone()).or_default().clone(),
            Err(_) => Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    fn release_key(&self, key: &CacheKey, key_lock: &Arc<tokio::sync::Mutex<()>>) {
        if let Ok(mut inflight) = self.inflight.lock() {
            // Only the map and this caller still hold the lock
            if Arc::strong_count(key_lock) <= 2 {
                inflight.remove(key);
            }
        }
    }
}
