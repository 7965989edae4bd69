//! Fetch pipeline counters and the failure diagnostics channel

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics handle for recording counters
#[derive(Debug, Default)]
pub struct Metrics {
    remote_calls: AtomicU64,
    remote_failures: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    quota_units: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remote_call(&self) {
        self.remote_calls.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "remote_calls", "Metric incremented");
    }

    pub fn remote_failure(&self) {
        self.remote_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "remote_failures", "Metric incremented");
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "cache_hits", "Metric incremented");
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "cache_misses", "Metric incremented");
    }

    pub fn quota_charged(&self, units: u64) {
        self.quota_units.fetch_add(units, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            remote_calls: self.remote_calls.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            quota_units: self.quota_units.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub remote_calls: u64,
    pub remote_failures: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub quota_units: u64,
}

/// One remote call that degraded to an empty result
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub operation: &'static str,
    /// Region, batch or query the call was issued for
    pub scope: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Collected remote failures; recording never changes fetch results
#[derive(Debug, Default)]
pub struct Diagnostics {
    failures: Mutex<Vec<FetchFailure>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, operation: &'static str, scope: impl Into<String>, message: impl Into<String>) {
        let failure = FetchFailure {
            operation,
            scope: scope.into(),
            message: message.into(),
            at: Utc::now(),
        };
        if let Ok(mut failures) = self.failures.lock() {
            failures.push(failure);
        }
    }

    pub fn failures(&self) -> Vec<FetchFailure> {
        self.failures
            .lock()
            .map(|failures| failures.clone())
            .unwrap_or_default()
    }

    /// Return and clear the collected failures
    pub fn drain(&self) -> Vec<FetchFailure> {
        self.failures
            .lock()
            .map(|mut failures| std::mem::take(&mut *failures))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.failures.lock().map(|f| f.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
