//! Read-only reconstruction of past seasons and season-level aggregates.

use std::collections::BTreeMap;

use crate::catalog::Task;
use crate::error::EngineError;
use crate::ledger::{Submission, SubmissionStatus};
use crate::recompute::project_submissions;
use crate::roles::multiplier_bps;
use crate::season::SeasonContext;
use crate::store::{Store, SubmissionFilter};

use super::Season;

/// One row of a season's standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsEntry {
    /// The user's ID.
    pub user_id: String,
    /// Display name at read time.
    pub display_name: String,
    /// Points for the requested season.
    pub points: i64,
}

/// Returns the standings for a season, highest points first.
///
/// The active season is served from the live cached totals. A closed season
/// is derived on the fly by replaying its approved submissions through the
/// same projection the recomputer uses — with the *currently configured*
/// role multipliers, since role history is not retained (a documented
/// approximation, see the module docs). Nothing is written on this path.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSeason`] for a tag that is neither active
/// nor closed, or a storage error.
pub fn view_season<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    tag: &str,
) -> Result<Vec<StandingsEntry>, EngineError> {
    if !ctx.knows(tag) {
        return Err(EngineError::invalid_season(format!(
            "unknown season tag: {tag}"
        )));
    }

    let mut entries = if tag == ctx.active {
        store
            .users()?
            .into_iter()
            .map(|u| StandingsEntry {
                user_id: u.id,
                display_name: u.display_name,
                points: u.cached_total_points,
            })
            .collect()
    } else {
        reconstruct_closed_season(store, tag)?
    };

    entries.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user_id.cmp(&b.user_id)));
    Ok(entries)
}

fn reconstruct_closed_season<S: Store>(
    store: &S,
    tag: &str,
) -> Result<Vec<StandingsEntry>, EngineError> {
    let filter = SubmissionFilter::any()
        .season(tag)
        .status(SubmissionStatus::Approved);
    let mut by_user: BTreeMap<String, Vec<Submission>> = BTreeMap::new();
    for sub in store.submissions(&filter)? {
        by_user.entry(sub.user_id.clone()).or_default().push(sub);
    }

    let tasks_by_id: BTreeMap<String, Task> = store
        .tasks()?
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();
    let roles = store.roles()?;
    let users: BTreeMap<String, _> = store
        .users()?
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect();

    let mut entries = Vec::with_capacity(by_user.len());
    for (user_id, subs) in by_user {
        // A submission may outlive its user record; fall back to the raw ID
        // and a 1.0x multiplier rather than dropping the history row.
        let (display_name, mult_bps) = match users.get(&user_id) {
            Some(u) => (
                u.display_name.clone(),
                multiplier_bps(&u.role_codes, &roles),
            ),
            None => (user_id.clone(), crate::roles::RATE_ONE_BPS),
        };
        let projection = project_submissions(&subs, &tasks_by_id, mult_bps);
        entries.push(StandingsEntry {
            user_id,
            display_name,
            points: projection.total,
        });
    }
    Ok(entries)
}

/// Team-wide progress toward the season goal.
///
/// Sums the awarded `final_points` of approved submissions whose task is not
/// bonus-only. Bonus-only points count toward user totals but never toward
/// the goal. Submissions whose task has been deleted are counted; dropping
/// them would silently shrink recorded progress.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSeason`] for an unknown tag, or a storage
/// error.
pub fn season_goal_progress<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    tag: &str,
) -> Result<i64, EngineError> {
    if !ctx.knows(tag) {
        return Err(EngineError::invalid_season(format!(
            "unknown season tag: {tag}"
        )));
    }
    let tasks_by_id: BTreeMap<String, Task> = store
        .tasks()?
        .into_iter()
        .map(|t| (t.id.clone(), t))
        .collect();

    let filter = SubmissionFilter::any()
        .season(tag)
        .status(SubmissionStatus::Approved);
    let mut progress: i64 = 0;
    for sub in store.submissions(&filter)? {
        let bonus_only = tasks_by_id
            .get(&sub.task_id)
            .is_some_and(|t| t.bonus_only);
        if !bonus_only {
            progress += sub.final_points;
        }
    }
    Ok(progress)
}

/// Users whose live total meets the active season's lottery threshold,
/// highest first.
///
/// # Errors
///
/// Returns a storage error if users or the season record cannot be read.
pub fn lottery_eligible<S: Store>(
    store: &S,
    ctx: &SeasonContext,
) -> Result<Vec<StandingsEntry>, EngineError> {
    let threshold = store
        .season(&ctx.active)?
        .map_or(super::DEFAULT_LOTTERY_THRESHOLD, |s: Season| {
            s.lottery_threshold
        });

    let mut entries: Vec<StandingsEntry> = store
        .users()?
        .into_iter()
        .filter(|u| u.cached_total_points >= threshold)
        .map(|u| StandingsEntry {
            user_id: u.id,
            display_name: u.display_name,
            points: u.cached_total_points,
        })
        .collect();
    entries.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.user_id.cmp(&b.user_id)));
    Ok(entries)
}
