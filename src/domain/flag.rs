//! Flagged-entity criteria and projections.
//!
//! A flag scan walks every voted-on or recently-reported entity of a kind and
//! projects a [`FlaggedSummary`] for those crossing the review thresholds.
//! Summaries are never persisted; each scan recomputes them in full.

use chrono::{DateTime, Utc};

use crate::domain::entity::EntityId;
use crate::domain::error::Error;
use crate::domain::vote::VoteTally;

/// Lower/upper bounds accepted for `lookback_days`.
pub const LOOKBACK_DAYS_RANGE: (u32, u32) = (1, 365);

/// Lower/upper bounds accepted for `min_downvotes`.
pub const MIN_DOWNVOTES_RANGE: (u32, u32) = (1, 100);

/// Caller-supplied thresholds for a flag scan.
///
/// An entity qualifies when its all-time downvote count reaches
/// `min_downvotes`, or when at least one report against it was filed within
/// the last `lookback_days` days. Vote counts themselves are not windowed;
/// only report recency and the `recent_downvotes` figure are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagCriteria {
    lookback_days: u32,
    min_downvotes: u32,
}

impl FlagCriteria {
    /// Validate and build scan criteria.
    ///
    /// # Errors
    /// Returns `InvalidArgument` when either threshold falls outside its
    /// documented bounds (1-365 days, 1-100 downvotes).
    pub fn new(lookback_days: u32, min_downvotes: u32) -> Result<Self, Error> {
        let (days_min, days_max) = LOOKBACK_DAYS_RANGE;
        if !(days_min..=days_max).contains(&lookback_days) {
            return Err(Error::invalid_argument(format!(
                "lookback_days must be within {days_min}..={days_max}, got {lookback_days}"
            )));
        }

        let (down_min, down_max) = MIN_DOWNVOTES_RANGE;
        if !(down_min..=down_max).contains(&min_downvotes) {
            return Err(Error::invalid_argument(format!(
                "min_downvotes must be within {down_min}..={down_max}, got {min_downvotes}"
            )));
        }

        Ok(Self {
            lookback_days,
            min_downvotes,
        })
    }

    /// The report-recency window, in days.
    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// All-time downvote threshold.
    pub fn min_downvotes(&self) -> u32 {
        self.min_downvotes
    }

    /// Start of the lookback window relative to `now`.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - chrono::Duration::days(i64::from(self.lookback_days))
    }
}

impl Default for FlagCriteria {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            min_downvotes: 5,
        }
    }
}

/// Review-worthiness projection for one entity.
///
/// Derived at scan time from the vote and report ledgers; never stored.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FlaggedSummary {
    /// The flagged entity's id.
    pub entity_id: EntityId,
    /// All-time upvote count.
    pub upvotes: u64,
    /// All-time downvote count.
    pub downvotes: u64,
    /// All-time total votes.
    pub total_votes: u64,
    /// Upvotes minus downvotes.
    pub score: i64,
    /// Downvotes over total votes; 0.0 when there are no votes.
    pub downvote_ratio: f64,
    /// Downvotes cast within the lookback window.
    pub recent_downvotes: u64,
    /// Whether any report on this entity still awaits review.
    pub has_pending_reports: bool,
    /// When this projection was computed.
    pub computed_at: DateTime<Utc>,
}

impl FlaggedSummary {
    /// Build a projection from ledger figures.
    pub fn new(
        entity_id: EntityId,
        tally: VoteTally,
        recent_downvotes: u64,
        has_pending_reports: bool,
        computed_at: DateTime<Utc>,
    ) -> Self {
        let total_votes = tally.total();
        let downvote_ratio = if total_votes == 0 {
            0.0
        } else {
            tally.downvotes as f64 / total_votes as f64
        };

        Self {
            entity_id,
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            total_votes,
            score: tally.score(),
            downvote_ratio,
            recent_downvotes,
            has_pending_reports,
            computed_at,
        }
    }
}
