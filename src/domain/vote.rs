//! Vote records and tally math.
//!
//! A user holds at most one vote per entity; re-voting overwrites the
//! direction in place. Summaries are read-time projections - counts grouped
//! by direction, a score, and percentage breakdowns rounded to one decimal.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::entity::{EntityRef, UserId};
use crate::domain::error::Error;

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VoteDirection {
    /// An upvote.
    Upvote,
    /// A downvote.
    Downvote,
}

impl VoteDirection {
    /// Stable wire name for this direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Upvote => "upvote",
            VoteDirection::Downvote => "downvote",
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upvote" => Ok(VoteDirection::Upvote),
            "downvote" => Ok(VoteDirection::Downvote),
            other => Err(Error::invalid_argument(format!(
                "unknown vote direction: {other:?}"
            ))),
        }
    }
}

/// A single user's current vote on an entity.
///
/// At most one record exists per (entity, user); the store keys on that pair,
/// so a concurrent re-vote from the same user resolves to one final record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoteRecord {
    /// The entity voted on.
    pub entity: EntityRef,
    /// The voting user.
    pub user_id: UserId,
    /// Current direction. Overwritten on re-vote.
    pub direction: VoteDirection,
    /// When the user first voted on this entity.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every re-vote, including direction no-ops.
    pub updated_at: DateTime<Utc>,
}

/// Raw per-direction counts for one entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteTally {
    /// Number of upvotes.
    pub upvotes: u64,
    /// Number of downvotes.
    pub downvotes: u64,
}

impl VoteTally {
    /// Total number of votes.
    pub fn total(&self) -> u64 {
        self.upvotes + self.downvotes
    }

    /// Upvotes minus downvotes.
    pub fn score(&self) -> i64 {
        self.upvotes as i64 - self.downvotes as i64
    }
}

/// Read-time vote breakdown for one entity.
///
/// Percentages are rounded to one decimal place and are both 0.0 when the
/// entity has no votes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VoteSummary {
    /// Number of upvotes.
    pub upvotes: u64,
    /// Number of downvotes.
    pub downvotes: u64,
    /// Total number of votes.
    pub total: u64,
    /// Upvotes minus downvotes.
    pub score: i64,
    /// Share of upvotes, 0.0..=100.0, one decimal.
    pub upvote_pct: f64,
    /// Share of downvotes, 0.0..=100.0, one decimal.
    pub downvote_pct: f64,
}

impl VoteSummary {
    /// Build a summary from raw tallies.
    pub fn from_tally(tally: VoteTally) -> Self {
        let total = tally.total();
        let (upvote_pct, downvote_pct) = if total == 0 {
            (0.0, 0.0)
        } else {
            (
                round_one_decimal(tally.upvotes as f64 / total as f64 * 100.0),
                round_one_decimal(tally.downvotes as f64 / total as f64 * 100.0),
            )
        };

        Self {
            upvotes: tally.upvotes,
            downvotes: tally.downvotes,
            total,
            score: tally.score(),
            upvote_pct,
            downvote_pct,
        }
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_roundtrip() {
        assert_eq!(
            "upvote".parse::<VoteDirection>().unwrap(),
            VoteDirection::Upvote
        );
        assert_eq!(
            "downvote".parse::<VoteDirection>().unwrap(),
            VoteDirection::Downvote
        );
    }

    #[test]
    fn test_unknown_direction_rejected() {
        assert!(matches!(
            "sideways".parse::<VoteDirection>(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tally_identities() {
        let tally = VoteTally {
            upvotes: 7,
            downvotes: 3,
        };
        assert_eq!(tally.total(), 10);
        assert_eq!(tally.score(), 4);
    }

    #[test]
    fn test_score_can_go_negative() {
        let tally = VoteTally {
            upvotes: 1,
            downvotes: 5,
        };
        assert_eq!(tally.score(), -4);
    }

    #[test]
    fn test_summary_percentages_sum_to_hundred() {
        let summary = VoteSummary::from_tally(VoteTally {
            upvotes: 2,
            downvotes: 1,
        });
        assert_eq!(summary.upvote_pct, 66.7);
        assert_eq!(summary.downvote_pct, 33.3);
        assert!((summary.upvote_pct + summary.downvote_pct - 100.0).abs() <= 0.1);
    }

    #[test]
    fn test_summary_zero_votes() {
        let summary = VoteSummary::from_tally(VoteTally::default());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.upvote_pct, 0.0);
        assert_eq!(summary.downvote_pct, 0.0);
    }

    #[test]
    fn test_summary_one_sided() {
        let summary = VoteSummary::from_tally(VoteTally {
            upvotes: 0,
            downvotes: 4,
        });
        assert_eq!(summary.upvote_pct, 0.0);
        assert_eq!(summary.downvote_pct, 100.0);
        assert_eq!(summary.score, -4);
    }
}
