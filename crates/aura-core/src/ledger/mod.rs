//! Submission ledger records.
//!
//! The ledger is the authoritative log the whole engine is built around.
//! Submissions are appended when a member submits proof and mutated only by
//! the review state machine; once a submission has been reviewed it is never
//! physically deleted. Withdrawal before review is a soft status transition,
//! so the ledger stays complete and every cached total can be rebuilt from
//! it.
//!
//! `base_points` is the pre-multiplier score attributable to the event.
//! `final_points` is stored for audit and display but is never the source of
//! truth for recomputation; the recomputer always starts from the base.

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::now_ms;

/// Review status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Awaiting review.
    Pending,
    /// Approved; contributes to totals.
    Approved,
    /// Rejected; contributes nothing.
    Rejected,
    /// Withdrawn by the owner or an admin before review. Terminal.
    Withdrawn,
}

impl SubmissionStatus {
    /// Stable string form, used as an indexed storage column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "withdrawn" => Ok(Self::Withdrawn),
            other => Err(format!("unknown submission status: {other}")),
        }
    }
}

/// Legal status transitions.
///
/// ```text
/// pending  --> approved | rejected | withdrawn
/// approved <-> rejected            (admin correction)
/// withdrawn                        (terminal)
/// ```
///
/// Re-issuing the current reviewed status is legal so that reviews are
/// idempotent.
#[must_use]
pub const fn can_transition(from: SubmissionStatus, to: SubmissionStatus) -> bool {
    use SubmissionStatus::{Approved, Pending, Rejected, Withdrawn};
    matches!(
        (from, to),
        (Pending, Approved | Rejected | Withdrawn)
            | (Approved | Rejected, Approved | Rejected)
    )
}

/// One submission event in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Stable submission identifier.
    pub id: String,
    /// Season the submission belongs to, fixed at creation time.
    pub season: String,
    /// Submitting user.
    pub user_id: String,
    /// Task the proof is for.
    pub task_id: String,
    /// Pre-multiplier score. `None` on legacy records and on unscored
    /// variable-task submissions; the recomputer falls back to the live
    /// task or the stored final.
    pub base_points: Option<i64>,
    /// `round(base × multiplier)` at last review, for audit and display.
    pub final_points: i64,
    /// Review status.
    pub status: SubmissionStatus,
    /// Free-form proof note supplied by the member.
    pub proof: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at_ms: u64,
    /// Withdrawal time, if withdrawn.
    pub withdrawn_at_ms: Option<u64>,
}

impl Submission {
    /// Creates a pending submission for `(user, task)` in `season`.
    #[must_use]
    pub fn new(
        season: impl Into<String>,
        user_id: impl Into<String>,
        task_id: impl Into<String>,
        base_points: Option<i64>,
        proof: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("s-{}", Uuid::new_v4()),
            season: season.into(),
            user_id: user_id.into(),
            task_id: task_id.into(),
            base_points,
            final_points: 0,
            status: SubmissionStatus::Pending,
            proof: proof.into(),
            created_at_ms: now_ms(),
            withdrawn_at_ms: None,
        }
    }
}
