//! Vote ledger orchestration.
//!
//! The vote service enforces the entity-existence check, the optional
//! self-vote rule, and the one-vote-per-user invariant (delegated to the
//! store's keying), and projects read-time summaries.

use std::sync::Arc;

use tracing::debug;

use crate::application::metrics::Metrics;
use crate::application::ports::{Clock, EntityDirectory, VoteStore};
use crate::domain::entity::{EntityRef, UserId};
use crate::domain::error::{ConflictKind, Error, Result};
use crate::domain::vote::{VoteDirection, VoteRecord, VoteSummary};

/// Coordinates vote writes and summaries over the vote ledger.
///
/// Generic over the directory and store ports; services hold cheap clones
/// (typically `Arc`s) of their collaborators.
#[derive(Clone)]
pub struct VoteService<D, V> {
    directory: D,
    store: V,
    clock: Arc<dyn Clock>,
    metrics: Metrics,
    reject_self_votes: bool,
}

impl<D, V> VoteService<D, V>
where
    D: EntityDirectory,
    V: VoteStore,
{
    /// Create a new vote service.
    ///
    /// `reject_self_votes` enables the `Conflict(SelfVote)` outcome for
    /// owners voting on their own entities; the default engine configuration
    /// leaves it off.
    pub fn new(
        directory: D,
        store: V,
        clock: Arc<dyn Clock>,
        metrics: Metrics,
        reject_self_votes: bool,
    ) -> Self {
        Self {
            directory,
            store,
            clock,
            metrics,
            reject_self_votes,
        }
    }

    /// Record or overwrite a user's vote on an entity.
    ///
    /// A second vote from the same user on the same entity overwrites the
    /// direction and refreshes `updated_at` rather than creating a second
    /// record; a direction no-op is not distinguished from a change.
    ///
    /// # Errors
    /// - `NotFound` if the entity does not exist
    /// - `Conflict(SelfVote)` if self-voting is disallowed and the caller
    ///   owns the entity
    pub fn upsert_vote(
        &self,
        entity: EntityRef,
        user_id: UserId,
        direction: VoteDirection,
    ) -> Result<VoteRecord> {
        if !self.directory.exists(entity) {
            return Err(Error::NotFound);
        }

        if self.reject_self_votes && self.directory.owner_of(entity) == Some(user_id) {
            return Err(Error::Conflict(ConflictKind::SelfVote));
        }

        let record = self
            .store
            .upsert(entity, user_id, direction, self.clock.now_utc());
        self.metrics.record_vote();
        debug!(entity = %entity, user_id, direction = %direction, "vote recorded");

        Ok(record)
    }

    /// Remove a user's vote. Returns whether a record existed.
    ///
    /// Removing a vote that was never cast is not an error.
    pub fn remove_vote(&self, entity: EntityRef, user_id: UserId) -> bool {
        let existed = self.store.remove(entity, user_id);
        if existed {
            self.metrics.record_vote_removal();
            debug!(entity = %entity, user_id, "vote removed");
        }
        existed
    }

    /// The user's current vote on an entity, if any.
    pub fn user_vote(&self, entity: EntityRef, user_id: UserId) -> Option<VoteRecord> {
        self.store.find(entity, user_id)
    }

    /// Vote breakdown for an entity.
    ///
    /// # Errors
    /// Returns `NotFound` if the entity does not exist.
    pub fn vote_summary(&self, entity: EntityRef) -> Result<VoteSummary> {
        if !self.directory.exists(entity) {
            return Err(Error::NotFound);
        }

        Ok(VoteSummary::from_tally(self.store.tally(entity)))
    }

    /// Drop every vote on an entity. Cascade hook for entity deletion.
    ///
    /// Returns how many records were removed. Deliberately skips the
    /// existence check - the entity is typically already gone.
    pub fn remove_entity_votes(&self, entity: EntityRef) -> usize {
        let removed = self.store.remove_entity_votes(entity);
        if removed > 0 {
            debug!(entity = %entity, removed, "entity votes dropped");
        }
        removed
    }

    /// Get a reference to the underlying vote store.
    pub fn store(&self) -> &V {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::memory::{MemoryDirectory, MemoryVoteStore};
    use std::sync::Arc;

    fn service(reject_self_votes: bool) -> VoteService<Arc<MemoryDirectory>, Arc<MemoryVoteStore>> {
        let directory = Arc::new(MemoryDirectory::new());
        directory.add(EntityRef::car(1), 100);
        directory.add(EntityRef::part(7), 200);

        VoteService::new(
            directory,
            Arc::new(MemoryVoteStore::new()),
            Arc::new(SystemClock::new()),
            Metrics::new(),
            reject_self_votes,
        )
    }

    #[test]
    fn test_upsert_missing_entity() {
        let service = service(false);
        let result = service.upsert_vote(EntityRef::car(999), 1, VoteDirection::Upvote);
        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[test]
    fn test_revote_overwrites() {
        let service = service(false);
        let entity = EntityRef::car(1);

        service
            .upsert_vote(entity, 1, VoteDirection::Upvote)
            .unwrap();
        let record = service
            .upsert_vote(entity, 1, VoteDirection::Downvote)
            .unwrap();

        assert_eq!(record.direction, VoteDirection::Downvote);
        let summary = service.vote_summary(entity).unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.downvotes, 1);
    }

    #[test]
    fn test_self_vote_allowed_by_default() {
        let service = service(false);
        assert!(service
            .upsert_vote(EntityRef::car(1), 100, VoteDirection::Upvote)
            .is_ok());
    }

    #[test]
    fn test_self_vote_rejected_when_configured() {
        let service = service(true);
        let result = service.upsert_vote(EntityRef::car(1), 100, VoteDirection::Upvote);
        assert_eq!(result.unwrap_err(), Error::Conflict(ConflictKind::SelfVote));
    }

    #[test]
    fn test_remove_missing_vote_is_false() {
        let service = service(false);
        assert!(!service.remove_vote(EntityRef::car(1), 42));
    }

    #[test]
    fn test_summary_identities() {
        let service = service(false);
        let entity = EntityRef::part(7);

        for user in 1..=3 {
            service
                .upsert_vote(entity, user, VoteDirection::Upvote)
                .unwrap();
        }
        service
            .upsert_vote(entity, 4, VoteDirection::Downvote)
            .unwrap();

        let summary = service.vote_summary(entity).unwrap();
        assert_eq!(summary.upvotes + summary.downvotes, summary.total);
        assert_eq!(summary.score, summary.upvotes as i64 - summary.downvotes as i64);
        assert_eq!(summary.upvote_pct, 75.0);
        assert_eq!(summary.downvote_pct, 25.0);
    }

    #[test]
    fn test_metrics_track_votes() {
        let service = service(false);
        let entity = EntityRef::car(1);

        service
            .upsert_vote(entity, 1, VoteDirection::Upvote)
            .unwrap();
        service.remove_vote(entity, 1);

        // Metrics are shared through the service's clone handle.
        assert_eq!(service.metrics.votes_recorded(), 1);
        assert_eq!(service.metrics.votes_removed(), 1);
    }
}
