//! Engine facade.
//!
//! [`Engine`] ties the scoring rules to one storage backend and exposes the
//! operation surface the surrounding application consumes. It holds no state
//! of its own beyond the store handle; every entry point takes the resolved
//! [`SeasonContext`] explicitly, so callers control exactly which season
//! view an operation runs against and the core stays testable without a
//! live backend.

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use crate::catalog::{self, NewTask, ScoringKind, Task};
use crate::error::EngineError;
use crate::ledger::Submission;
use crate::recompute::{self, RecomputeReport};
use crate::review::{self, ReviewAction};
use crate::roles::{self, Role, RoleUpdate};
use crate::season::{self, Season, SeasonContext, StandingsEntry, SystemConfig};
use crate::store::{Batch, Mutation, Store};
use crate::types::{Caller, User};

/// Tag of the season created by [`Engine::bootstrap`].
pub const FIRST_SEASON_TAG: &str = "season-1";

/// The engine facade over a storage backend.
pub struct Engine<S> {
    store: S,
}

impl<S: Store> Engine<S> {
    /// Wraps a storage backend.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Direct access to the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Loads the current season context.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidSeason`] if the store is not
    /// initialized.
    pub fn season_context(&self) -> Result<SeasonContext, EngineError> {
        season::load_context(&self.store)
    }

    /// Seeds an empty store: first season, its config record, an admin
    /// user, a sample role, and a starter task.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyInitialized`] if a configuration
    /// record already exists, or a storage error.
    pub fn bootstrap(
        &self,
        admin_id: &str,
        admin_name: &str,
    ) -> Result<SeasonContext, EngineError> {
        if self.store.config()?.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }

        let mut admin = User::new(admin_id, admin_name);
        admin.is_admin = true;

        let mut sample_role = Role::new("vip", "VIP", 11_000);
        sample_role.color = String::from("#eab308");

        let starter_task = Task {
            id: String::from("t-daily-checkin"),
            scope: crate::catalog::SeasonScope::Tagged {
                tag: FIRST_SEASON_TAG.to_string(),
            },
            title: String::from("Daily check-in"),
            scoring: ScoringKind::Fixed { points: 10 },
            bonus_only: false,
            group_key: String::from("1"),
        };

        let mut batch = Batch::new();
        batch.push(Mutation::PutConfig(SystemConfig {
            active_season: FIRST_SEASON_TAG.to_string(),
            closed_seasons: Vec::new(),
        }));
        batch.push(Mutation::PutSeason(Season::with_defaults(FIRST_SEASON_TAG)));
        batch.push(Mutation::PutUser(admin));
        batch.push(Mutation::PutRole(sample_role));
        batch.push(Mutation::PutTask(starter_task));
        self.store.apply(batch)?;

        tracing::info!(season = FIRST_SEASON_TAG, "store bootstrapped");
        Ok(SeasonContext {
            active: FIRST_SEASON_TAG.to_string(),
            closed: Vec::new(),
        })
    }

    /// Creates a user record if one does not exist, returning the stored
    /// record either way.
    ///
    /// # Errors
    ///
    /// Returns a storage error.
    pub fn ensure_user(&self, id: &str, display_name: &str) -> Result<User, EngineError> {
        if let Some(existing) = self.store.user(id)? {
            return Ok(existing);
        }
        let user = User::new(id, display_name);
        self.store
            .apply(Batch::single(Mutation::PutUser(user.clone())))?;
        tracing::info!(user_id = id, "user created");
        Ok(user)
    }

    // === Submissions ===

    /// See [`review::submit`].
    ///
    /// # Errors
    ///
    /// See [`review::submit`].
    pub fn submit(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        task_id: &str,
        proof: &str,
    ) -> Result<Submission, EngineError> {
        review::submit(&self.store, ctx, caller, task_id, proof)
    }

    /// See [`review::withdraw`].
    ///
    /// # Errors
    ///
    /// See [`review::withdraw`].
    pub fn withdraw(&self, caller: &Caller, submission_id: &str) -> Result<Submission, EngineError> {
        review::withdraw(&self.store, caller, submission_id)
    }

    /// See [`review::review`].
    ///
    /// # Errors
    ///
    /// See [`review::review`].
    pub fn review(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        submission_id: &str,
        action: ReviewAction,
        input_base_points: i64,
    ) -> Result<Submission, EngineError> {
        review::review(&self.store, ctx, caller, submission_id, action, input_base_points)
    }

    /// See [`review::correct`].
    ///
    /// # Errors
    ///
    /// See [`review::correct`].
    pub fn correct(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        submission_id: &str,
        new_status: ReviewAction,
        new_base_points: i64,
    ) -> Result<Submission, EngineError> {
        review::correct(&self.store, ctx, caller, submission_id, new_status, new_base_points)
    }

    // === Recomputation ===

    /// Rebuilds one user's active-season total from the ledger.
    ///
    /// # Errors
    ///
    /// See [`recompute::recompute`].
    pub fn recompute(&self, ctx: &SeasonContext, user_id: &str) -> Result<i64, EngineError> {
        recompute::recompute(&self.store, ctx, user_id, &ctx.active)
    }

    /// See [`recompute::recompute_for_role`].
    ///
    /// # Errors
    ///
    /// See [`recompute::recompute_for_role`].
    pub fn recompute_for_role(
        &self,
        ctx: &SeasonContext,
        role_code: &str,
    ) -> Result<RecomputeReport, EngineError> {
        recompute::recompute_for_role(&self.store, ctx, role_code)
    }

    // === Roles ===

    /// Computes the multiplier for a role-code set against the registry.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the registry cannot be read.
    pub fn multiplier_bps(&self, role_codes: &BTreeSet<String>) -> Result<u32, EngineError> {
        Ok(roles::multiplier_bps(role_codes, &self.store.roles()?))
    }

    /// See [`roles::add_role`].
    ///
    /// # Errors
    ///
    /// See [`roles::add_role`].
    pub fn add_role(&self, caller: &Caller, role: Role) -> Result<(), EngineError> {
        roles::add_role(&self.store, caller, role)
    }

    /// See [`roles::update_role`].
    ///
    /// # Errors
    ///
    /// See [`roles::update_role`].
    pub fn update_role(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        code: &str,
        update: RoleUpdate,
    ) -> Result<RecomputeReport, EngineError> {
        roles::update_role(&self.store, ctx, caller, code, update)
    }

    /// See [`roles::delete_role`].
    ///
    /// # Errors
    ///
    /// See [`roles::delete_role`].
    pub fn delete_role(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        code: &str,
    ) -> Result<RecomputeReport, EngineError> {
        roles::delete_role(&self.store, ctx, caller, code)
    }

    /// See [`roles::assign_roles`].
    ///
    /// # Errors
    ///
    /// See [`roles::assign_roles`].
    pub fn assign_roles(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        user_id: &str,
        role_codes: BTreeSet<String>,
    ) -> Result<i64, EngineError> {
        roles::assign_roles(&self.store, ctx, caller, user_id, role_codes)
    }

    // === Tasks ===

    /// See [`catalog::add_task`].
    ///
    /// # Errors
    ///
    /// See [`catalog::add_task`].
    pub fn add_task(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        new: NewTask,
    ) -> Result<Task, EngineError> {
        catalog::add_task(&self.store, ctx, caller, new)
    }

    /// See [`catalog::update_task`].
    ///
    /// # Errors
    ///
    /// See [`catalog::update_task`].
    pub fn update_task(&self, caller: &Caller, task: Task) -> Result<(), EngineError> {
        catalog::update_task(&self.store, caller, task)
    }

    /// See [`catalog::delete_task`].
    ///
    /// # Errors
    ///
    /// See [`catalog::delete_task`].
    pub fn delete_task(&self, caller: &Caller, task_id: &str) -> Result<(), EngineError> {
        catalog::delete_task(&self.store, caller, task_id)
    }

    /// See [`catalog::tasks_for_season`].
    ///
    /// # Errors
    ///
    /// See [`catalog::tasks_for_season`].
    pub fn tasks_for_season(&self, season: &str) -> Result<Vec<Task>, EngineError> {
        catalog::tasks_for_season(&self.store, season)
    }

    // === Seasons ===

    /// See [`season::archive_season`].
    ///
    /// # Errors
    ///
    /// See [`season::archive_season`].
    pub fn archive_season(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        new_tag: &str,
    ) -> Result<SeasonContext, EngineError> {
        season::archive_season(&self.store, ctx, caller, new_tag)
    }

    /// See [`season::view_season`].
    ///
    /// # Errors
    ///
    /// See [`season::view_season`].
    pub fn view_season(
        &self,
        ctx: &SeasonContext,
        tag: &str,
    ) -> Result<Vec<StandingsEntry>, EngineError> {
        season::view_season(&self.store, ctx, tag)
    }

    /// See [`season::season_goal_progress`].
    ///
    /// # Errors
    ///
    /// See [`season::season_goal_progress`].
    pub fn season_goal_progress(
        &self,
        ctx: &SeasonContext,
        tag: &str,
    ) -> Result<i64, EngineError> {
        season::season_goal_progress(&self.store, ctx, tag)
    }

    /// See [`season::lottery_eligible`].
    ///
    /// # Errors
    ///
    /// See [`season::lottery_eligible`].
    pub fn lottery_eligible(
        &self,
        ctx: &SeasonContext,
    ) -> Result<Vec<StandingsEntry>, EngineError> {
        season::lottery_eligible(&self.store, ctx)
    }

    /// See [`season::update_season_goal`].
    ///
    /// # Errors
    ///
    /// See [`season::update_season_goal`].
    pub fn update_season_goal(
        &self,
        ctx: &SeasonContext,
        caller: &Caller,
        goal_points: i64,
        goal_title: &str,
    ) -> Result<(), EngineError> {
        season::update_season_goal(&self.store, ctx, caller, goal_points, goal_title)
    }
}
