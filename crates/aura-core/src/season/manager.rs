//! Season boundary operations.

use crate::error::EngineError;
use crate::recompute::apply_chunked;
use crate::store::{Batch, Mutation, Store};
use crate::types::Caller;

use super::{Season, SeasonContext, SystemConfig};

/// Loads the season context from the system configuration record.
///
/// # Errors
///
/// Returns [`EngineError::InvalidSeason`] if the store has no configuration
/// (nothing is active), or a storage error.
pub fn load_context<S: Store>(store: &S) -> Result<SeasonContext, EngineError> {
    let config = store
        .config()?
        .ok_or_else(|| EngineError::invalid_season("no active season configured"))?;
    Ok(SeasonContext {
        active: config.active_season,
        closed: config.closed_seasons,
    })
}

/// Closes the active season and opens `new_tag`.
///
/// The closed tag joins the history list, a fresh season record is created
/// with default goal and threshold, and every user's live total is zeroed.
/// Submissions and tasks keep their original season tags, which is what
/// makes the closed season reconstructible.
///
/// The boundary itself (old season, new season, config pointer) commits as
/// one atomic batch. Zeroing then runs in bounded chunks; it is idempotent,
/// so an interrupted archive is finished by calling [`reset_live_totals`]
/// again.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers,
/// [`EngineError::DuplicateSeason`] if `new_tag` already names a season, or
/// a storage error.
pub fn archive_season<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    new_tag: &str,
) -> Result<SeasonContext, EngineError> {
    caller.require_admin("archive season")?;
    if ctx.knows(new_tag) || store.season(new_tag)?.is_some() {
        return Err(EngineError::DuplicateSeason {
            tag: new_tag.to_string(),
        });
    }

    let mut closed = ctx.closed.clone();
    closed.push(ctx.active.clone());
    let config = SystemConfig {
        active_season: new_tag.to_string(),
        closed_seasons: closed.clone(),
    };

    let mut batch = Batch::new();
    if let Some(mut old) = store.season(&ctx.active)? {
        old.is_active = false;
        batch.push(Mutation::PutSeason(old));
    }
    batch.push(Mutation::PutSeason(Season::with_defaults(new_tag)));
    batch.push(Mutation::PutConfig(config));
    store.apply(batch)?;

    let zeroed = reset_live_totals(store)?;
    tracing::info!(
        closed_season = %ctx.active,
        new_season = new_tag,
        users_zeroed = zeroed,
        "season archived"
    );

    Ok(SeasonContext {
        active: new_tag.to_string(),
        closed,
    })
}

/// Zeroes every user's live cached total, in bounded-size write chunks.
///
/// Idempotent: users already at zero are skipped, so re-running after an
/// interrupted archive converges without touching finished users.
///
/// # Errors
///
/// Returns a storage error; chunks already committed stay committed.
pub fn reset_live_totals<S: Store>(store: &S) -> Result<usize, EngineError> {
    let mutations: Vec<Mutation> = store
        .users()?
        .into_iter()
        .filter(|u| u.cached_total_points != 0)
        .map(|mut u| {
            u.cached_total_points = 0;
            Mutation::PutUser(u)
        })
        .collect();
    let count = mutations.len();
    apply_chunked(store, mutations)?;
    Ok(count)
}

/// Updates the active season's goal fields. Admin only.
///
/// A missing season record (legacy store) is created with defaults first.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers or a storage
/// error.
pub fn update_season_goal<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    goal_points: i64,
    goal_title: &str,
) -> Result<(), EngineError> {
    caller.require_admin("update season goal")?;
    let mut season = store
        .season(&ctx.active)?
        .unwrap_or_else(|| Season::with_defaults(&ctx.active));
    season.goal_points = goal_points;
    season.goal_title = goal_title.to_string();
    store.apply(Batch::single(Mutation::PutSeason(season)))?;
    tracing::info!(season = %ctx.active, goal_points, "season goal updated");
    Ok(())
}
