//! In-memory adapters for the directory and ledger ports.
//!
//! These back the default engine assembly, the test suites and the demos.
//! The vote store keys records on the (entity, user) pair, so the map entry
//! itself enforces the one-vote-per-user invariant under concurrency - the
//! same guarantee a database adapter gets from a unique constraint on the
//! triple.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::application::ports::{EntityDirectory, ReportStore, VoteStore};
use crate::domain::entity::{EntityId, EntityKind, EntityRef, UserId};
use crate::domain::report::{NewReport, ReportId, ReportRecord, ReportStatus};
use crate::domain::vote::{VoteDirection, VoteRecord, VoteTally};

/// In-memory entity directory.
///
/// Registered entities exist; everything else does not. Ownership is
/// optional - catalog entities like global parts may have no owning user.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entities: DashMap<EntityRef, Option<UserId>, ahash::RandomState>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            entities: DashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    /// Register an entity with an owner.
    pub fn add(&self, entity: EntityRef, owner: UserId) {
        self.entities.insert(entity, Some(owner));
    }

    /// Register an entity without an owner.
    pub fn add_unowned(&self, entity: EntityRef) {
        self.entities.insert(entity, None);
    }

    /// Deregister an entity.
    pub fn remove(&self, entity: EntityRef) {
        self.entities.remove(&entity);
    }
}

impl EntityDirectory for MemoryDirectory {
    fn exists(&self, entity: EntityRef) -> bool {
        self.entities.contains_key(&entity)
    }

    fn owner_of(&self, entity: EntityRef) -> Option<UserId> {
        self.entities.get(&entity).and_then(|owner| *owner)
    }
}

/// In-memory vote ledger keyed on (entity, user).
#[derive(Debug, Default)]
pub struct MemoryVoteStore {
    votes: DashMap<(EntityRef, UserId), VoteRecord, ahash::RandomState>,
}

impl MemoryVoteStore {
    /// Create an empty vote store.
    pub fn new() -> Self {
        Self {
            votes: DashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    /// Total number of vote records across all entities.
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    /// Whether the ledger holds no votes.
    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

impl VoteStore for MemoryVoteStore {
    fn upsert(
        &self,
        entity: EntityRef,
        user_id: UserId,
        direction: VoteDirection,
        now: DateTime<Utc>,
    ) -> VoteRecord {
        match self.votes.entry((entity, user_id)) {
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                record.direction = direction;
                record.updated_at = now;
                record.clone()
            }
            Entry::Vacant(vacant) => vacant
                .insert(VoteRecord {
                    entity,
                    user_id,
                    direction,
                    created_at: now,
                    updated_at: now,
                })
                .clone(),
        }
    }

    fn remove(&self, entity: EntityRef, user_id: UserId) -> bool {
        self.votes.remove(&(entity, user_id)).is_some()
    }

    fn find(&self, entity: EntityRef, user_id: UserId) -> Option<VoteRecord> {
        self.votes
            .get(&(entity, user_id))
            .map(|record| record.value().clone())
    }

    fn tally(&self, entity: EntityRef) -> VoteTally {
        let mut tally = VoteTally::default();
        for record in self.votes.iter().filter(|r| r.entity == entity) {
            match record.direction {
                VoteDirection::Upvote => tally.upvotes += 1,
                VoteDirection::Downvote => tally.downvotes += 1,
            }
        }
        tally
    }

    fn downvotes_since(&self, entity: EntityRef, since: DateTime<Utc>) -> u64 {
        self.votes
            .iter()
            .filter(|r| {
                r.entity == entity
                    && r.direction == VoteDirection::Downvote
                    && r.updated_at >= since
            })
            .count() as u64
    }

    fn voted_entities(&self, kind: EntityKind) -> Vec<EntityId> {
        let ids: BTreeSet<EntityId> = self
            .votes
            .iter()
            .filter(|r| r.entity.kind == kind)
            .map(|r| r.entity.id)
            .collect();
        ids.into_iter().collect()
    }

    fn remove_entity_votes(&self, entity: EntityRef) -> usize {
        let before = self.votes.len();
        self.votes.retain(|(voted, _), _| *voted != entity);
        before.saturating_sub(self.votes.len())
    }
}

/// In-memory report ledger with monotonically increasing ids.
#[derive(Debug, Default)]
pub struct MemoryReportStore {
    reports: DashMap<ReportId, ReportRecord, ahash::RandomState>,
    next_id: AtomicU64,
}

impl MemoryReportStore {
    /// Create an empty report store.
    pub fn new() -> Self {
        Self {
            reports: DashMap::with_hasher(ahash::RandomState::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Total number of reports ever filed.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether the ledger holds no reports.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn sorted_by_id(mut records: Vec<ReportRecord>) -> Vec<ReportRecord> {
        records.sort_by_key(|record| record.id);
        records
    }
}

impl ReportStore for MemoryReportStore {
    fn insert(&self, report: NewReport, now: DateTime<Utc>) -> ReportRecord {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let record = ReportRecord {
            id,
            entity: report.entity,
            reporter_id: report.reporter_id,
            reason: report.reason,
            description: report.description,
            status: ReportStatus::Pending,
            admin_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.reports.insert(id, record.clone());
        record
    }

    fn find(&self, id: ReportId) -> Option<ReportRecord> {
        self.reports.get(&id).map(|record| record.value().clone())
    }

    fn update<F>(&self, id: ReportId, f: F) -> Option<ReportRecord>
    where
        F: FnOnce(&mut ReportRecord),
    {
        self.reports.get_mut(&id).map(|mut record| {
            f(record.value_mut());
            record.value().clone()
        })
    }

    fn has_pending_from(&self, entity: EntityRef, reporter_id: UserId) -> bool {
        self.reports.iter().any(|r| {
            r.entity == entity && r.reporter_id == reporter_id && r.is_pending()
        })
    }

    fn has_pending(&self, entity: EntityRef) -> bool {
        self.reports
            .iter()
            .any(|r| r.entity == entity && r.is_pending())
    }

    fn reported_since(&self, entity: EntityRef, since: DateTime<Utc>) -> bool {
        self.reports
            .iter()
            .any(|r| r.entity == entity && r.created_at >= since)
    }

    fn reported_entities_since(&self, kind: EntityKind, since: DateTime<Utc>) -> Vec<EntityId> {
        let ids: BTreeSet<EntityId> = self
            .reports
            .iter()
            .filter(|r| r.entity.kind == kind && r.created_at >= since)
            .map(|r| r.entity.id)
            .collect();
        ids.into_iter().collect()
    }

    fn for_entity(&self, entity: EntityRef) -> Vec<ReportRecord> {
        Self::sorted_by_id(
            self.reports
                .iter()
                .filter(|r| r.entity == entity)
                .map(|r| r.value().clone())
                .collect(),
        )
    }

    fn pending_for_kind(&self, kind: EntityKind) -> Vec<ReportRecord> {
        Self::sorted_by_id(
            self.reports
                .iter()
                .filter(|r| r.entity.kind == kind && r.is_pending())
                .map(|r| r.value().clone())
                .collect(),
        )
    }
}
