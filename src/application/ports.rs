//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the
//! application layer needs. Infrastructure adapters implement these ports:
//! the environment supplies entity lookups and persistence, and this crate
//! ships in-memory adapters plus a system clock.

use std::fmt::Debug;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::domain::client::ClientKey;
use crate::domain::entity::{EntityId, EntityKind, EntityRef, UserId};
use crate::domain::report::{NewReport, ReportId, ReportRecord};
use crate::domain::vote::{VoteDirection, VoteRecord, VoteTally};
use crate::domain::window::ClientWindows;

/// Port for obtaining current time.
///
/// The rate limiter works in monotonic [`Instant`]s; the ledgers stamp
/// records with wall-clock time. Infrastructure provides concrete
/// implementations (`SystemClock`, `MockClock`).
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;

    /// Get the current wall-clock time.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Port for entity existence and ownership checks.
///
/// The trust core never loads entities itself; the environment answers these
/// two questions per (kind, id). Both checks are expected to be cheap reads.
pub trait EntityDirectory: Send + Sync {
    /// Whether the entity exists.
    fn exists(&self, entity: EntityRef) -> bool;

    /// The owning user, if the entity exists and has one.
    fn owner_of(&self, entity: EntityRef) -> Option<UserId>;
}

/// Port for the vote ledger.
///
/// Implementations must key records on the (entity, user) pair so that
/// concurrent upserts from the same user resolve to exactly one row -
/// last committer wins, never two rows for the same triple.
pub trait VoteStore: Send + Sync {
    /// Insert or overwrite the user's vote on an entity.
    ///
    /// A fresh record gets `created_at = updated_at = now`; an overwrite
    /// keeps `created_at` and refreshes `updated_at` even when the direction
    /// did not change.
    fn upsert(
        &self,
        entity: EntityRef,
        user_id: UserId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> VoteRecord;

    /// Delete the user's vote. Returns whether a record existed.
    fn remove(&self, entity: EntityRef, user_id: UserId) -> bool;

    /// The user's current vote, if any.
    fn find(&self, entity: EntityRef, user_id: UserId) -> Option<VoteRecord>;

    /// All-time per-direction counts for an entity.
    fn tally(&self, entity: EntityRef) -> VoteTally;

    /// Downvotes whose `updated_at` falls at or after `since`.
    fn downvotes_since(&self, entity: EntityRef, since: DateTime<Utc>) -> u64;

    /// Distinct ids of entities of a kind holding at least one vote.
    fn voted_entities(&self, kind: EntityKind) -> Vec<EntityId>;

    /// Drop every vote on an entity. Returns how many were removed.
    ///
    /// Cascade hook for entity deletion.
    fn remove_entity_votes(&self, entity: EntityRef) -> usize;
}

/// Port for the report ledger.
///
/// Reports are append-and-mutate: rows are never deleted, so resolved and
/// dismissed reports remain queryable as the audit trail.
pub trait ReportStore: Send + Sync {
    /// Persist a new report in `Pending` state and assign its id.
    fn insert(&self, report: NewReport, now: DateTime<Utc>) -> ReportRecord;

    /// Look up a report by id.
    fn find(&self, id: ReportId) -> Option<ReportRecord>;

    /// Mutate a report in place under the store's per-row lock.
    ///
    /// Returns the updated record, or `None` for an unknown id.
    fn update<F>(&self, id: ReportId, f: F) -> Option<ReportRecord>
    where
        F: FnOnce(&mut ReportRecord);

    /// Whether this reporter already holds a pending report on the entity.
    fn has_pending_from(&self, entity: EntityRef, reporter_id: UserId) -> bool;

    /// Whether any pending report exists for the entity.
    fn has_pending(&self, entity: EntityRef) -> bool;

    /// Whether any report on the entity was filed at or after `since`.
    fn reported_since(&self, entity: EntityRef, since: DateTime<Utc>) -> bool;

    /// Distinct ids of entities of a kind reported at or after `since`.
    fn reported_entities_since(&self, kind: EntityKind, since: DateTime<Utc>) -> Vec<EntityId>;

    /// Every report filed against an entity, oldest first.
    fn for_entity(&self, entity: EntityRef) -> Vec<ReportRecord>;

    /// Every pending report for a kind, oldest first. The moderation queue.
    fn pending_for_kind(&self, kind: EntityKind) -> Vec<ReportRecord>;
}

/// Port for per-client rate window storage.
///
/// Mutation is atomic per key: `with_windows_mut` holds the entry's lock for
/// the duration of the callback, so append and purge cannot interleave with
/// another evaluation of the same client. Cross-key operations need no
/// coordination. Implementations must never block on I/O - this port sits on
/// the request hot path.
pub trait WindowStore: Send + Sync {
    /// Access a client's windows with mutable access, creating fresh state
    /// for a first-seen client.
    fn with_windows_mut<F, T>(&self, key: &ClientKey, now: Instant, f: F) -> T
    where
        F: FnOnce(&mut ClientWindows) -> T;

    /// Clone a client's current window state without mutating it.
    ///
    /// Read-only introspection; returns `None` for an untracked client.
    fn snapshot(&self, key: &ClientKey) -> Option<ClientWindows>;

    /// Number of tracked clients.
    fn len(&self) -> usize;

    /// Whether no clients are tracked.
    fn is_empty(&self) -> bool;

    /// Drop every client idle for at least `max_idle`. Returns how many
    /// were dropped.
    fn purge_idle(&self, max_idle: Duration, now: Instant) -> usize;
}

// Allow ports to be used directly through shared handles. Services hold
// `Arc`s of their collaborators, so the Arc itself must satisfy the port.
impl<T: EntityDirectory + ?Sized> EntityDirectory for std::sync::Arc<T> {
    fn exists(&self, entity: EntityRef) -> bool {
        (**self).exists(entity)
    }

    fn owner_of(&self, entity: EntityRef) -> Option<UserId> {
        (**self).owner_of(entity)
    }
}

impl<T: VoteStore> VoteStore for std::sync::Arc<T> {
    fn upsert(
        &self,
        entity: EntityRef,
        user_id: UserId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> VoteRecord {
        (**self).upsert(entity, user_id, direction, now)
    }

    fn remove(&self, entity: EntityRef, user_id: UserId) -> bool {
        (**self).remove(entity, user_id)
    }

    fn find(&self, entity: EntityRef, user_id: UserId) -> Option<VoteRecord> {
        (**self).find(entity, user_id)
    }

    fn tally(&self, entity: EntityRef) -> VoteTally {
        (**self).tally(entity)
    }

    fn downvotes_since(&self, entity: EntityRef, since: DateTime<Utc>) -> u64 {
        (**self).downvotes_since(entity, since)
    }

    fn voted_entities(&self, kind: EntityKind) -> Vec<EntityId> {
        (**self).voted_entities(kind)
    }

    fn remove_entity_votes(&self, entity: EntityRef) -> usize {
        (**self).remove_entity_votes(entity)
    }
}

impl<T: ReportStore> ReportStore for std::sync::Arc<T> {
    fn insert(&self, report: NewReport, now: DateTime<Utc>) -> ReportRecord {
        (**self).insert(report, now)
    }

    fn find(&self, id: ReportId) -> Option<ReportRecord> {
        (**self).find(id)
    }

    fn update<F>(&self, id: ReportId, f: F) -> Option<ReportRecord>
    where
        F: FnOnce(&mut ReportRecord),
    {
        (**self).update(id, f)
    }

    fn has_pending_from(&self, entity: EntityRef, reporter_id: UserId) -> bool {
        (**self).has_pending_from(entity, reporter_id)
    }

    fn has_pending(&self, entity: EntityRef) -> bool {
        (**self).has_pending(entity)
    }

    fn reported_since(&self, entity: EntityRef, since: DateTime<Utc>) -> bool {
        (**self).reported_since(entity, since)
    }

    fn reported_entities_since(&self, kind: EntityKind, since: DateTime<Utc>) -> Vec<EntityId> {
        (**self).reported_entities_since(kind, since)
    }

    fn for_entity(&self, entity: EntityRef) -> Vec<ReportRecord> {
        (**self).for_entity(entity)
    }

    fn pending_for_kind(&self, kind: EntityKind) -> Vec<ReportRecord> {
        (**self).pending_for_kind(kind)
    }
}

impl<T: WindowStore> WindowStore for std::sync::Arc<T> {
    fn with_windows_mut<F, T2>(&self, key: &ClientKey, now: Instant, f: F) -> T2
    where
        F: FnOnce(&mut ClientWindows) -> T2,
    {
        (**self).with_windows_mut(key, now, f)
    }

    fn snapshot(&self, key: &ClientKey) -> Option<ClientWindows> {
        (**self).snapshot(key)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn purge_idle(&self, max_idle: Duration, now: Instant) -> usize {
        (**self).purge_idle(max_idle, now)
    }
}

/// Candidate entry for eviction consideration.
///
/// Carries the information needed to pick a victim among tracked clients.
pub struct EvictionCandidate<K> {
    /// The key of the entry.
    pub key: K,
    /// When the client was last seen.
    pub last_seen: Instant,
}

/// Port for counter-store eviction decisions.
///
/// The counter store delegates "is it time to evict, and whom" to a
/// pluggable policy so the windowing semantics stay untouched by resource
/// management. Infrastructure provides `IdleLruEviction`.
pub trait EvictionPolicy<K>: Send + Sync + Debug
where
    K: Clone,
{
    /// Select a victim among the given candidates.
    ///
    /// Returns the key to evict, or `None` if no eviction should occur.
    fn select_victim(&self, candidates: &[EvictionCandidate<K>]) -> Option<K>;

    /// Whether eviction should be triggered at the current entry count.
    fn should_evict(&self, current_entries: usize) -> bool;
}
