//! Moderation reports.
//!
//! Reports carry a closed reason taxonomy and a flat status set: any status
//! is reachable from any other, including back to `Pending`. Records are
//! never deleted - resolved and dismissed reports stay behind as the audit
//! trail, and only the pending state is exclusive per (entity, reporter).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::entity::{EntityRef, UserId};
use crate::domain::error::Error;

/// Id of a report row.
pub type ReportId = u64;

/// Why an entity was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReportReason {
    /// Offensive or inappropriate content.
    InappropriateContent,
    /// Commercial or repetitive spam.
    Spam,
    /// Factually wrong specs or data.
    Inaccurate,
    /// Duplicate of an existing entity.
    Duplicate,
    /// Anything else; see the description.
    Other,
}

impl ReportReason {
    /// Stable wire name for this reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportReason::InappropriateContent => "inappropriate_content",
            ReportReason::Spam => "spam",
            ReportReason::Inaccurate => "inaccurate",
            ReportReason::Duplicate => "duplicate",
            ReportReason::Other => "other",
        }
    }
}

impl fmt::Display for ReportReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportReason {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inappropriate_content" => Ok(ReportReason::InappropriateContent),
            "spam" => Ok(ReportReason::Spam),
            "inaccurate" => Ok(ReportReason::Inaccurate),
            "duplicate" => Ok(ReportReason::Duplicate),
            "other" => Ok(ReportReason::Other),
            other => Err(Error::invalid_argument(format!(
                "unknown report reason: {other:?}"
            ))),
        }
    }
}

/// Review state of a report.
///
/// The transition set is deliberately flat; reviewers may move a report
/// between any two states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReportStatus {
    /// Awaiting review. Initial state.
    #[default]
    Pending,
    /// Seen by a reviewer, no verdict yet.
    Reviewed,
    /// Action was taken.
    Resolved,
    /// No action warranted.
    Dismissed,
}

impl ReportStatus {
    /// Stable wire name for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "reviewed" => Ok(ReportStatus::Reviewed),
            "resolved" => Ok(ReportStatus::Resolved),
            "dismissed" => Ok(ReportStatus::Dismissed),
            other => Err(Error::invalid_argument(format!(
                "unknown report status: {other:?}"
            ))),
        }
    }
}

/// Fields supplied by the reporter when filing a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    /// The entity being reported.
    pub entity: EntityRef,
    /// The reporting user.
    pub reporter_id: UserId,
    /// Reason from the closed taxonomy.
    pub reason: ReportReason,
    /// Free-form details, if any.
    pub description: Option<String>,
}

/// A stored moderation report.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReportRecord {
    /// Store-assigned id.
    pub id: ReportId,
    /// The reported entity.
    pub entity: EntityRef,
    /// The reporting user.
    pub reporter_id: UserId,
    /// Reason from the closed taxonomy.
    pub reason: ReportReason,
    /// Free-form details from the reporter.
    pub description: Option<String>,
    /// Current review state.
    pub status: ReportStatus,
    /// Notes left by the reviewer.
    pub admin_notes: Option<String>,
    /// Reviewer who last moved the report out of `Pending`.
    pub reviewed_by: Option<UserId>,
    /// When the report last left `Pending`.
    pub reviewed_at: Option<DateTime<Utc>>,
    /// When the report was filed.
    pub created_at: DateTime<Utc>,
    /// Last mutation of any field.
    pub updated_at: DateTime<Utc>,
}

impl ReportRecord {
    /// Whether the report still awaits review.
    pub fn is_pending(&self) -> bool {
        self.status == ReportStatus::Pending
    }
}
