//! Flagged-entity scanning.
//!
//! The scanner combines the vote and report ledgers into review-worthiness
//! listings. Each call is a full batch recomputation over the candidate set -
//! every entity of the kind holding votes, plus every entity reported within
//! the lookback window. There is no cache and no incremental state; slightly
//! stale listings between concurrent writes are acceptable.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::application::ports::{Clock, ReportStore, VoteStore};
use crate::domain::entity::{EntityKind, EntityRef};
use crate::domain::flag::{FlagCriteria, FlaggedSummary};

/// Computes flagged-entity listings from the two ledgers.
#[derive(Clone)]
pub struct FlagScanner<V, R> {
    votes: V,
    reports: R,
    clock: Arc<dyn Clock>,
}

impl<V, R> FlagScanner<V, R>
where
    V: VoteStore,
    R: ReportStore,
{
    /// Create a new scanner over the given ledgers.
    pub fn new(votes: V, reports: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            votes,
            reports,
            clock,
        }
    }

    /// Entities of a kind meeting the review thresholds.
    ///
    /// An entity qualifies when either its all-time downvote count reaches
    /// `criteria.min_downvotes()`, or at least one report against it was
    /// filed within the lookback window. Results are ordered by downvote
    /// count descending; ties break by entity id ascending, a stable but
    /// arbitrary secondary order.
    ///
    /// Pagination is the caller's concern; the scan always returns the full
    /// qualifying set.
    pub fn flagged_entities(
        &self,
        kind: EntityKind,
        criteria: FlagCriteria,
    ) -> Vec<FlaggedSummary> {
        let now = self.clock.now_utc();
        let window_start = criteria.window_start(now);

        // Candidate set: anything voted on, plus anything recently reported.
        // BTreeSet dedups and fixes the tie-break order up front.
        let mut candidates: BTreeSet<u64> = self.votes.voted_entities(kind).into_iter().collect();
        candidates.extend(self.reports.reported_entities_since(kind, window_start));

        let mut flagged: Vec<FlaggedSummary> = candidates
            .into_iter()
            .filter_map(|id| {
                let entity = EntityRef::new(kind, id);
                let tally = self.votes.tally(entity);
                let recently_reported = self.reports.reported_since(entity, window_start);

                let qualifies = tally.downvotes >= u64::from(criteria.min_downvotes())
                    || recently_reported;
                if !qualifies {
                    return None;
                }

                Some(FlaggedSummary::new(
                    id,
                    tally,
                    self.votes.downvotes_since(entity, window_start),
                    self.reports.has_pending(entity),
                    now,
                ))
            })
            .collect();

        // Candidates arrive id-ascending; the stable sort keeps that as the
        // tie-break under equal downvote counts.
        flagged.sort_by(|a, b| b.downvotes.cmp(&a.downvotes));

        debug!(
            kind = %kind,
            lookback_days = criteria.lookback_days(),
            min_downvotes = criteria.min_downvotes(),
            flagged = flagged.len(),
            "flag scan completed"
        );

        flagged
    }
}
