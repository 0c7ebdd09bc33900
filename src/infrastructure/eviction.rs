//! Eviction policy adapters for counter-store clients.
//!
//! The counter store delegates "when to evict, and whom" to an
//! [`EvictionPolicy`](crate::application::ports::EvictionPolicy). The
//! shipped policy bounds the tracked-client count and victimizes the client
//! idle the longest, which never disturbs active clients' window state.

use crate::application::ports::{EvictionCandidate, EvictionPolicy};

/// Idle-LRU eviction with a tracked-client bound.
///
/// Evicts the least recently seen client when the bound is reached.
#[derive(Debug, Clone)]
pub struct IdleLruEviction {
    /// Maximum number of tracked clients before eviction
    max_clients: usize,
}

impl IdleLruEviction {
    /// Create a new idle-LRU policy with the given client bound.
    pub fn new(max_clients: usize) -> Self {
        Self { max_clients }
    }
}

impl<K> EvictionPolicy<K> for IdleLruEviction
where
    K: Clone,
{
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K> {
        candidates
            .iter()
            .min_by_key(|candidate| candidate.last_seen)
            .map(|candidate| candidate.key.clone())
    }

    fn should_evict(&self, current_entries: usize) -> bool {
        current_entries >= self.max_clients
    }
}
