//! Review state machine over the submission ledger.
//!
//! A member action appends a pending submission; admin actions drive it
//! through the transition table in [`crate::ledger::can_transition`]. Every
//! reviewed transition recomputes the owner's total from the ledger — never
//! an incremental delta — and commits the submission write and the rebuilt
//! total as one atomic batch, so a submission can not end up approved while
//! its owner's total was never updated.


use serde::{Deserialize, Serialize};

use crate::catalog::ScoringKind;
use crate::error::EngineError;
use crate::ledger::{can_transition, Submission, SubmissionStatus};
use crate::recompute::{apply_chunked, projection_with_overlay};
use crate::roles::{apply_multiplier, multiplier_bps};
use crate::season::SeasonContext;
use crate::store::{Batch, Mutation, Store, MAX_BATCH_MUTATIONS};
use crate::types::{now_ms, Caller};

/// Admin decision on a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    /// Approve and award points.
    Approve,
    /// Reject; the base score is forced to zero.
    Reject,
}

impl ReviewAction {
    /// The status this action transitions to.
    #[must_use]
    pub const fn status(self) -> SubmissionStatus {
        match self {
            Self::Approve => SubmissionStatus::Approved,
            Self::Reject => SubmissionStatus::Rejected,
        }
    }
}

/// Creates a pending submission for the caller in the active season.
///
/// Fixed tasks stamp their current score as the base; variable tasks are
/// scored by the reviewer on approval and carry no base until then.
///
/// # Errors
///
/// Returns [`EngineError::UnknownTask`] if the task is not visible in the
/// active season, [`EngineError::UnknownUser`] if the caller has no user
/// record, or a storage error.
pub fn submit<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    task_id: &str,
    proof: &str,
) -> Result<Submission, EngineError> {
    if store.user(&caller.user_id)?.is_none() {
        return Err(EngineError::UnknownUser {
            id: caller.user_id.clone(),
        });
    }
    let task = store
        .task(task_id)?
        .filter(|t| t.scope.visible_in(&ctx.active))
        .ok_or_else(|| EngineError::UnknownTask {
            id: task_id.to_string(),
        })?;

    let base_points = match task.scoring {
        ScoringKind::Fixed { points } => Some(points),
        ScoringKind::Variable => None,
    };

    let submission = Submission::new(&ctx.active, &caller.user_id, task_id, base_points, proof);
    store.apply(Batch::single(Mutation::PutSubmission(submission.clone())))?;
    tracing::info!(
        submission_id = %submission.id,
        user_id = %caller.user_id,
        task_id,
        season = %ctx.active,
        "submission created"
    );
    Ok(submission)
}

/// Withdraws a pending submission.
///
/// Withdrawal is a soft status transition that keeps the ledger complete;
/// the record is never deleted. Only the owner or an admin may withdraw, and
/// only before review.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSubmission`] if the submission does not
/// exist, [`EngineError::Forbidden`] if the caller is neither owner nor
/// admin or the submission is no longer pending, or a storage error.
pub fn withdraw<S: Store>(
    store: &S,
    caller: &Caller,
    submission_id: &str,
) -> Result<Submission, EngineError> {
    let sub = store
        .submission(submission_id)?
        .ok_or_else(|| EngineError::InvalidSubmission {
            id: submission_id.to_string(),
        })?;

    if !caller.is_admin && caller.user_id != sub.user_id {
        return Err(EngineError::forbidden("withdraw another member's submission"));
    }
    if sub.status != SubmissionStatus::Pending {
        return Err(EngineError::forbidden("withdraw a reviewed submission"));
    }

    let mut updated = sub;
    updated.status = SubmissionStatus::Withdrawn;
    updated.withdrawn_at_ms = Some(now_ms());
    store.apply(Batch::single(Mutation::PutSubmission(updated.clone())))?;
    tracing::info!(submission_id, "submission withdrawn");
    Ok(updated)
}

/// Reviews a submission: approve or reject, with the reviewer's base score
/// for variable tasks.
///
/// On approval of a still-extant fixed task, the task's *current* score
/// overrides `input_base_points`, keeping historical submissions in sync
/// with live task edits. Rejection forces the base to zero. The transition
/// is idempotent: re-reviewing with the same inputs yields the same state.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers,
/// [`EngineError::InvalidSubmission`] if the submission is missing or
/// withdrawn, or a storage error.
pub fn review<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    submission_id: &str,
    action: ReviewAction,
    input_base_points: i64,
) -> Result<Submission, EngineError> {
    caller.require_admin("review submission")?;
    apply_transition(store, ctx, submission_id, action, input_base_points)
}

/// Administrative correction of an already-reviewed submission.
///
/// Same effect path as [`review`], usable after the fact to flip
/// `approved ↔ rejected` or to adjust an awarded score. Always re-triggers
/// the owner's recompute.
///
/// # Errors
///
/// Same as [`review`].
pub fn correct<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    submission_id: &str,
    new_status: ReviewAction,
    new_base_points: i64,
) -> Result<Submission, EngineError> {
    caller.require_admin("correct submission")?;
    apply_transition(store, ctx, submission_id, new_status, new_base_points)
}

fn apply_transition<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    submission_id: &str,
    action: ReviewAction,
    input_base_points: i64,
) -> Result<Submission, EngineError> {
    let sub = store
        .submission(submission_id)?
        .ok_or_else(|| EngineError::InvalidSubmission {
            id: submission_id.to_string(),
        })?;
    let new_status = action.status();
    if !can_transition(sub.status, new_status) {
        return Err(EngineError::InvalidSubmission {
            id: submission_id.to_string(),
        });
    }

    let base_points = match action {
        ReviewAction::Reject => 0,
        ReviewAction::Approve => match store.task(&sub.task_id)? {
            Some(task) => match task.scoring {
                ScoringKind::Fixed { points } => points,
                ScoringKind::Variable => input_base_points.max(0),
            },
            // Task deleted since submission: trust the reviewer's score.
            None => input_base_points.max(0),
        },
    };

    let user = store
        .user(&sub.user_id)?
        .ok_or_else(|| EngineError::UnknownUser {
            id: sub.user_id.clone(),
        })?;
    let mult_bps = multiplier_bps(&user.role_codes, &store.roles()?);

    let mut updated = sub.clone();
    updated.status = new_status;
    updated.base_points = Some(base_points);
    updated.final_points = apply_multiplier(base_points, mult_bps);

    // Rebuild the owner's total with the transition folded in, and commit
    // the submission write and the total as one durable unit.
    let projection = projection_with_overlay(store, &user, &sub.season, Some(&updated))?;

    // The reviewed submission and the owner's total lead the mutation list;
    // even when drifted fixups force chunking, those two commit together in
    // the first chunk and only fixups spill into later ones.
    let mut mutations = vec![Mutation::PutSubmission(updated.clone())];
    if sub.season == ctx.active {
        let mut owner = user;
        owner.cached_total_points = projection.total;
        mutations.push(Mutation::PutUser(owner));
    }
    mutations.extend(projection.fixups.iter().cloned().map(Mutation::PutSubmission));

    if mutations.len() <= MAX_BATCH_MUTATIONS {
        let mut batch = Batch::new();
        for m in mutations {
            batch.push(m);
        }
        store.apply(batch)?;
    } else {
        // Degraded path: more drifted finals than one batch can carry. The
        // ledger stays the source of truth and the next recompute converges
        // any fixups lost between chunks.
        tracing::warn!(
            submission_id,
            mutation_count = mutations.len(),
            "review transition exceeds one write batch, committing chunked"
        );
        apply_chunked(store, mutations)?;
    }

    tracing::info!(
        submission_id,
        user_id = %updated.user_id,
        status = %updated.status,
        base_points,
        final_points = updated.final_points,
        total = projection.total,
        "submission reviewed"
    );
    Ok(updated)
}
