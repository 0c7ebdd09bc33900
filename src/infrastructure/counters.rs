//! Counter storage for the rate limiter.
//!
//! Process-wide associative store mapping client keys to their rate window
//! state. DashMap provides lock-free reads and fine-grained per-shard
//! locking for writes: mutation is atomic per key, and cross-key operations
//! need no coordination. State is created lazily on a client's first request
//! and - unless bounded by an eviction policy or the idle sweeper - lives
//! for the process lifetime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::application::metrics::Metrics;
use crate::application::ports::{EvictionCandidate, EvictionPolicy, WindowStore};
use crate::domain::client::ClientKey;
use crate::domain::window::ClientWindows;

/// Thread-safe per-client window store backed by DashMap.
#[derive(Default)]
pub struct CounterStore {
    clients: DashMap<ClientKey, ClientWindows, ahash::RandomState>,
    eviction: Option<Arc<dyn EvictionPolicy<ClientKey>>>,
    metrics: Option<Metrics>,
}

impl CounterStore {
    /// Create an unbounded counter store.
    pub fn new() -> Self {
        Self {
            clients: DashMap::with_hasher(ahash::RandomState::new()),
            eviction: None,
            metrics: None,
        }
    }

    /// Attach an eviction policy consulted before tracking a new client.
    pub fn with_eviction_policy(mut self, policy: Arc<dyn EvictionPolicy<ClientKey>>) -> Self {
        self.eviction = Some(policy);
        self
    }

    /// Attach metrics for eviction accounting.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Evict one client per the policy, if it can name a victim.
    ///
    /// Candidate collection walks the whole map; eviction only happens when
    /// the tracked-client bound is hit, so the walk stays off the common
    /// path.
    fn evict_one(&self, policy: &dyn EvictionPolicy<ClientKey>) {
        let candidates: Vec<EvictionCandidate<ClientKey>> = self
            .clients
            .iter()
            .map(|entry| EvictionCandidate {
                key: entry.key().clone(),
                last_seen: entry.value().last_seen,
            })
            .collect();

        if let Some(victim) = policy.select_victim(&candidates) {
            if self.clients.remove(&victim).is_some() {
                if let Some(metrics) = &self.metrics {
                    metrics.record_eviction();
                }
                debug!(client = %victim, "tracked client evicted");
            }
        }
    }
}

impl std::fmt::Debug for CounterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterStore")
            .field("clients", &self.clients.len())
            .field("bounded", &self.eviction.is_some())
            .finish()
    }
}

impl WindowStore for CounterStore {
    fn with_windows_mut<F, T>(&self, key: &ClientKey, now: Instant, f: F) -> T
    where
        F: FnOnce(&mut ClientWindows) -> T,
    {
        if let Some(policy) = &self.eviction {
            // Only a first-seen client can grow the map. The check-then-act
            // gap under concurrency can briefly overshoot the bound by a
            // few entries; the next insert corrects it.
            if !self.clients.contains_key(key) && policy.should_evict(self.clients.len()) {
                self.evict_one(policy.as_ref());
            }
        }

        let mut entry = self
            .clients
            .entry(key.clone())
            .or_insert_with(|| ClientWindows::new(now));
        f(entry.value_mut())
    }

    fn snapshot(&self, key: &ClientKey) -> Option<ClientWindows> {
        self.clients.get(key).map(|entry| entry.value().clone())
    }

    fn len(&self) -> usize {
        self.clients.len()
    }

    fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    fn purge_idle(&self, max_idle: Duration, now: Instant) -> usize {
        let before = self.clients.len();
        self.clients
            .retain(|_, windows| !windows.idle_since(now, max_idle));
        before.saturating_sub(self.clients.len())
    }
}
