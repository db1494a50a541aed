//! Point recomputer: full rebuild of cached totals from the ledger.
//!
//! Incremental deltas drift: concurrent admin edits, role changes, and task
//! score edits can each invalidate a `total += delta` update that was correct
//! when it was computed. A full recompute from the ledger is the only
//! representation guaranteed consistent after arbitrary out-of-order
//! corrections, so it is the *only* mutation path for cached totals.
//!
//! # Base-point resolution
//!
//! For each approved submission, the pre-multiplier base is resolved as:
//!
//! 1. the submission's stored `base_points`;
//! 2. else, the live task's fixed score (legacy records predating
//!    `base_points`);
//! 3. else, the already-finalized `final_points`, carried through unchanged —
//!    zeroing a user's history because a task was deleted is worse than an
//!    approximate score.
//!
//! The total is never negative. Recomputation is idempotent: running it twice
//! in a row yields the same integer and the second run writes nothing new.


use std::collections::BTreeMap;

use crate::catalog::{ScoringKind, Task};
use crate::error::EngineError;
use crate::ledger::{Submission, SubmissionStatus};
use crate::roles::{apply_multiplier, multiplier_bps};
use crate::season::SeasonContext;
use crate::store::{Mutation, Store, SubmissionFilter, MAX_BATCH_MUTATIONS};
use crate::types::User;

/// Result of a batch recompute over several users.
///
/// Partial failures are reported per user so a retry can target only the
/// stale ones; they are never silently dropped.
#[derive(Debug, Clone, Default)]
pub struct RecomputeReport {
    /// Users whose totals were rebuilt.
    pub recomputed: Vec<String>,
    /// Users whose rebuild failed, with the reason.
    pub failed: Vec<RecomputeFailure>,
}

impl RecomputeReport {
    /// Whether every affected user was recomputed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A single failed rebuild inside a batch recompute.
#[derive(Debug, Clone)]
pub struct RecomputeFailure {
    /// The user whose rebuild failed.
    pub user_id: String,
    /// Human-readable failure reason.
    pub reason: String,
}

/// Outcome of projecting one user's approved submissions.
#[derive(Debug, Clone)]
pub(crate) struct UserProjection {
    /// Rebuilt total, never negative.
    pub total: i64,
    /// Submissions whose stored `final_points` no longer match the
    /// projection and must be rewritten.
    pub fixups: Vec<Submission>,
}

/// Projects a set of approved submissions into a total under `mult_bps`.
///
/// Pure function over its inputs; both the live recomputer and the history
/// reconstructor go through here so the two can never disagree.
pub(crate) fn project_submissions(
    submissions: &[Submission],
    tasks_by_id: &BTreeMap<String, Task>,
    mult_bps: u32,
) -> UserProjection {
    let mut total: i64 = 0;
    let mut fixups = Vec::new();

    for sub in submissions {
        let base = sub.base_points.or_else(|| {
            match tasks_by_id.get(&sub.task_id).map(|t| t.scoring) {
                Some(ScoringKind::Fixed { points }) => Some(points),
                _ => None,
            }
        });

        match base {
            Some(base) => {
                let final_points = apply_multiplier(base, mult_bps);
                if final_points != sub.final_points {
                    let mut fixed = sub.clone();
                    fixed.final_points = final_points;
                    fixups.push(fixed);
                }
                total += final_points;
            }
            // No recoverable base: keep the finalized score as-is.
            None => total += sub.final_points,
        }
    }

    UserProjection {
        total: total.max(0),
        fixups,
    }
}

/// Fetches and projects one user's approved submissions for `season`.
///
/// `overlay`, when given, replaces (or supplies) the submission with the same
/// ID before projecting; the review state machine uses this to fold a
/// not-yet-committed transition into the rebuilt total.
pub(crate) fn projection_with_overlay<S: Store>(
    store: &S,
    user: &User,
    season: &str,
    overlay: Option<&Submission>,
) -> Result<UserProjection, EngineError> {
    let filter = SubmissionFilter::any()
        .user(&user.id)
        .season(season)
        .status(SubmissionStatus::Approved);
    let mut submissions = store.submissions(&filter)?;

    if let Some(overlay) = overlay {
        submissions.retain(|s| s.id != overlay.id);
        if overlay.status == SubmissionStatus::Approved {
            submissions.push(overlay.clone());
        }
    }

    let tasks_by_id: BTreeMap<String, Task> = store
        .tasks()?
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();
    let mult_bps = multiplier_bps(&user.role_codes, &store.roles()?);

    Ok(project_submissions(&submissions, &tasks_by_id, mult_bps))
}

/// Rebuilds one user's total for `season` from the ledger.
///
/// Drifted per-submission `final_points` are rewritten alongside the total.
/// The cached total is only written when `season` is the active one; closed
/// seasons are read-only and their totals are derived on view instead.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSeason`] if `season` is neither active nor
/// closed, [`EngineError::UnknownUser`] if the user does not exist, or a
/// storage error (in which case nothing was written).
pub fn recompute<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    user_id: &str,
    season: &str,
) -> Result<i64, EngineError> {
    if !ctx.knows(season) {
        return Err(EngineError::invalid_season(format!(
            "unknown season tag: {season}"
        )));
    }
    let user = store
        .user(user_id)?
        .ok_or_else(|| EngineError::UnknownUser {
            id: user_id.to_string(),
        })?;

    let projection = projection_with_overlay(store, &user, season, None)?;

    let mut mutations: Vec<Mutation> = projection
        .fixups
        .iter()
        .cloned()
        .map(Mutation::PutSubmission)
        .collect();

    if season == ctx.active && user.cached_total_points != projection.total {
        let mut updated = user.clone();
        updated.cached_total_points = projection.total;
        mutations.push(Mutation::PutUser(updated));
    }

    if !mutations.is_empty() {
        apply_chunked(store, mutations)?;
        tracing::debug!(
            user_id,
            season,
            total = projection.total,
            fixups = projection.fixups.len(),
            "recomputed user total"
        );
    }

    Ok(projection.total)
}

/// Rebuilds every holder of `role_code` as an independent unit.
///
/// One user's failure neither blocks nor corrupts the others; failures are
/// logged and reported so retries can be scoped to the stale users.
///
/// # Errors
///
/// Returns a storage error if the holder list itself cannot be read.
pub fn recompute_for_role<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    role_code: &str,
) -> Result<RecomputeReport, EngineError> {
    let holders = store.users_with_role(role_code)?;
    let mut report = RecomputeReport::default();

    for user in holders {
        match recompute(store, ctx, &user.id, &ctx.active) {
            Ok(_) => report.recomputed.push(user.id),
            Err(err) => {
                tracing::warn!(
                    user_id = %user.id,
                    role_code,
                    error = %err,
                    "recompute failed for role holder"
                );
                report.failed.push(RecomputeFailure {
                    user_id: user.id,
                    reason: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        role_code,
        recomputed = report.recomputed.len(),
        failed = report.failed.len(),
        "role cascade recompute finished"
    );
    Ok(report)
}

/// Applies mutations in batches under the store's write ceiling.
///
/// Each chunk is atomic on its own; a failure between chunks leaves earlier
/// chunks committed. Every caller of this path is idempotent (rebuilds, not
/// deltas), so a retry converges.
pub(crate) fn apply_chunked<S: Store>(
    store: &S,
    mutations: Vec<Mutation>,
) -> Result<(), EngineError> {
    let mut pending = mutations;
    while !pending.is_empty() {
        let rest = if pending.len() > MAX_BATCH_MUTATIONS {
            pending.split_off(MAX_BATCH_MUTATIONS)
        } else {
            Vec::new()
        };
        let mut batch = crate::store::Batch::new();
        for m in pending {
            batch.push(m);
        }
        store.apply(batch)?;
        pending = rest;
    }
    Ok(())
}
