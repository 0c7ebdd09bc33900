//! Observability metrics for the trust core.
//!
//! Provides counters about admission and ledger activity for monitoring and
//! debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking trust-core activity.
///
/// All metrics use atomic operations for thread-safe updates and reads, and
/// can be queried at any time for observability.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Requests admitted by the rate limiter
    requests_allowed: AtomicU64,
    /// Requests rejected by the rate limiter
    requests_limited: AtomicU64,
    /// Idle clients evicted from the counter store
    clients_evicted: AtomicU64,
    /// Votes created or overwritten
    votes_recorded: AtomicU64,
    /// Votes explicitly removed
    votes_removed: AtomicU64,
    /// Reports filed
    reports_filed: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests_allowed: AtomicU64::new(0),
                requests_limited: AtomicU64::new(0),
                clients_evicted: AtomicU64::new(0),
                votes_recorded: AtomicU64::new(0),
                votes_removed: AtomicU64::new(0),
                reports_filed: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_allowed(&self) {
        self.inner.requests_allowed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_limited(&self) {
        self.inner.requests_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.inner.clients_evicted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_evictions(&self, count: u64) {
        self.inner.clients_evicted.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn record_vote(&self) {
        self.inner.votes_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_vote_removal(&self) {
        self.inner.votes_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_report(&self) {
        self.inner.reports_filed.fetch_add(1, Ordering::Relaxed);
    }

    /// Total requests admitted by the rate limiter.
    pub fn requests_allowed(&self) -> u64 {
        self.inner.requests_allowed.load(Ordering::Relaxed)
    }

    /// Total requests rejected by the rate limiter.
    pub fn requests_limited(&self) -> u64 {
        self.inner.requests_limited.load(Ordering::Relaxed)
    }

    /// Total idle clients evicted from the counter store.
    pub fn clients_evicted(&self) -> u64 {
        self.inner.clients_evicted.load(Ordering::Relaxed)
    }

    /// Total votes created or overwritten.
    pub fn votes_recorded(&self) -> u64 {
        self.inner.votes_recorded.load(Ordering::Relaxed)
    }

    /// Total votes explicitly removed.
    pub fn votes_removed(&self) -> u64 {
        self.inner.votes_removed.load(Ordering::Relaxed)
    }

    /// Total reports filed.
    pub fn reports_filed(&self) -> u64 {
        self.inner.reports_filed.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_allowed: self.requests_allowed(),
            requests_limited: self.requests_limited(),
            clients_evicted: self.clients_evicted(),
            votes_recorded: self.votes_recorded(),
            votes_removed: self.votes_removed(),
            reports_filed: self.reports_filed(),
        }
    }

    /// Reset all metrics to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.requests_allowed.store(0, Ordering::Relaxed);
        self.inner.requests_limited.store(0, Ordering::Relaxed);
        self.inner.clients_evicted.store(0, Ordering::Relaxed);
        self.inner.votes_recorded.store(0, Ordering::Relaxed);
        self.inner.votes_removed.store(0, Ordering::Relaxed);
        self.inner.reports_filed.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Requests admitted by the rate limiter
    pub requests_allowed: u64,
    /// Requests rejected by the rate limiter
    pub requests_limited: u64,
    /// Idle clients evicted from the counter store
    pub clients_evicted: u64,
    /// Votes created or overwritten
    pub votes_recorded: u64,
    /// Votes explicitly removed
    pub votes_removed: u64,
    /// Reports filed
    pub reports_filed: u64,
}

impl MetricsSnapshot {
    /// Total requests seen by the rate limiter.
    pub fn total_requests(&self) -> u64 {
        self.requests_allowed.saturating_add(self.requests_limited)
    }

    /// Ratio of rejected requests to total requests (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been processed.
    pub fn limited_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.requests_limited as f64 / total as f64
        }
    }
}
