//! Daily quota accounting for weighted platform operations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Default daily budget in quota units
pub const DAILY_QUOTA_LIMIT: u64 = 10_000;

/// Remote operation kinds, each with its own weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Search,
    Videos,
    Channels,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Search => "search",
            OperationKind::Videos => "videos",
            OperationKind::Channels => "channels",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-operation weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuotaCosts {
    #[serde(default = "default_search_cost")]
    pub search: u64,
    #[serde(default = "default_videos_cost")]
    pub videos: u64,
    #[serde(default = "default_channels_cost")]
    pub channels: u64,
}

impl QuotaCosts {
    pub fn cost_of(&self, kind: OperationKind) -> u64 {
        match kind {
            OperationKind::Search => self.search,
            OperationKind::Videos => self.videos,
            OperationKind::Channels => self.channels,
        }
    }
}

impl Default for QuotaCosts {
    fn default() -> Self {
        Self {
            search: default_search_cost(),
            videos: default_videos_cost(),
            channels: default_channels_cost(),
        }
    }
}

fn default_search_cost() -> u64 {
    100
}

fn default_videos_cost() -> u64 {
    1
}

fn default_channels_cost() -> u64 {
    1
}

/// Whether an exhausted budget blocks further calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotaEnforcement {
    /// Charge unconditionally; the budget is advisory
    #[default]
    Soft,
    /// Refuse operations once `remaining() <= 0`
    Hard,
}

/// Counter of quota units consumed during one session
#[derive(Debug)]
pub struct QuotaMeter {
    used: AtomicU64,
    limit: u64,
    costs: QuotaCosts,
    enforcement: QuotaEnforcement,
}

impl QuotaMeter {
    pub fn new(limit: u64, costs: QuotaCosts, enforcement: QuotaEnforcement) -> Self {
        Self {
            used: AtomicU64::new(0),
            limit,
            costs,
            enforcement,
        }
    }

    /// Add the weight of `kind` to the running total and return the new total
    pub fn charge(&self, kind: OperationKind) -> u64 {
        let cost = self.costs.cost_of(kind);
        let used = self.used.fetch_add(cost, Ordering::SeqCst) + cost;

        debug!(operation = %kind, cost, used, limit = self.limit, "Quota charged");
        if used > self.limit {
            warn!(used, limit = self.limit, "Daily quota budget exceeded");
        }

        used
    }

    /// Whether an operation may be issued under the configured enforcement
    pub fn permits(&self, kind: OperationKind) -> bool {
        match self.enforcement {
            QuotaEnforcement::Soft => true,
            QuotaEnforcement::Hard => {
                let allowed = self.remaining() > 0;
                if !allowed {
                    warn!(operation = %kind, "Quota exhausted, refusing operation");
                }
                allowed
            }
        }
    }

    /// `limit - used`; negative once the soft budget is overrun
    pub fn remaining(&self) -> i64 {
        self.limit as i64 - self.used() as i64
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::SeqCst)
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn costs(&self) -> &QuotaCosts {
        &self.costs
    }

    pub fn reset(&self) {
        self.used.store(0, Ordering::SeqCst);
        debug!("Quota counter reset");
    }
}

impl Default for QuotaMeter {
    fn default() -> Self {
        Self::new(DAILY_QUOTA_LIMIT, QuotaCosts::default(), QuotaEnforcement::Soft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_adds_weights() {
        let meter = QuotaMeter::default();
        assert_eq!(meter.charge(OperationKind::Search), 100);
        assert_eq!(meter.charge(OperationKind::Videos), 101);
        assert_eq!(meter.charge(OperationKind::Channels), 102);
        assert_eq!(meter.remaining(), 10_000 - 102);
    }

    #[test]
    fn test_soft_budget_goes_negative() {
        let meter = QuotaMeter::new(150, QuotaCosts::default(), QuotaEnforcement::Soft);
        meter.charge(OperationKind::Search);
        meter.charge(OperationKind::Search);

        assert_eq!(meter.used(), 200);
        assert_eq!(meter.remaining(), -50);
        assert!(meter.permits(OperationKind::Search));
    }

    #[test]
    fn test_hard_budget_refuses_when_exhausted() {
        let meter = QuotaMeter::new(100, QuotaCosts::default(), QuotaEnforcement::Hard);
        assert!(meter.permits(OperationKind::Search));

        meter.charge(OperationKind::Search);
        assert_eq!(meter.remaining(), 0);
        assert!(!meter.permits(OperationKind::Videos));
    }

    #[test]
    fn test_reset() {
        let meter = QuotaMeter::default();
        meter.charge(OperationKind::Search);
        meter.reset();
        assert_eq!(meter.used(), 0);
        assert_eq!(meter.remaining(), 10_000);
    }

    #[test]
    fn test_costs_deserialize_with_defaults() {
        let costs: QuotaCosts = serde_json::from_str(r#"{"search": 50}"#).unwrap();
        assert_eq!(costs.search, 50);
        assert_eq!(costs.videos, 1);
        assert_eq!(costs.channels, 1);
    }
}
