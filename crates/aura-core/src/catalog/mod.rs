//! Season-scoped task catalog.
//!
//! Tasks define what can be submitted and how it is scored. A task is either
//! `Fixed` (a stable point value, stamped onto submissions and re-read at
//! review time so live edits propagate) or `Variable` (the reviewer assigns
//! the score on approval). A `bonus_only` task counts toward a user's total
//! but is excluded from the season-goal aggregate.
//!
//! Tasks carry an explicit [`SeasonScope`] instead of a nullable tag:
//! legacy records with no tag are `Shared` and visible in every season.


use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::season::SeasonContext;
use crate::store::{Batch, Mutation, Store};
use crate::types::Caller;

/// How a task is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringKind {
    /// A stable point value awarded on approval.
    Fixed {
        /// Points awarded before the multiplier.
        points: i64,
    },
    /// The reviewer assigns the score when approving.
    Variable,
}

/// Season visibility of a shared-collection record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum SeasonScope {
    /// Visible only in the named season.
    Tagged {
        /// The owning season tag.
        tag: String,
    },
    /// Visible in every season (legacy untagged records).
    Shared,
}

impl SeasonScope {
    /// Whether a record with this scope is visible in `season`.
    #[must_use]
    pub fn visible_in(&self, season: &str) -> bool {
        match self {
            Self::Tagged { tag } => tag == season,
            Self::Shared => true,
        }
    }
}

/// A task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable task identifier.
    pub id: String,
    /// Season visibility.
    pub scope: SeasonScope,
    /// Title shown to members.
    pub title: String,
    /// Scoring model.
    pub scoring: ScoringKind,
    /// Counts toward user totals but not the season goal.
    pub bonus_only: bool,
    /// Week or grouping key used by the task list.
    pub group_key: String,
}

/// Fields for a new task; the ID and season stamp are assigned on creation.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Title shown to members.
    pub title: String,
    /// Scoring model.
    pub scoring: ScoringKind,
    /// Counts toward user totals but not the season goal.
    pub bonus_only: bool,
    /// Week or grouping key.
    pub group_key: String,
}

/// Creates a task in the active season. Admin only.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers, or a storage
/// error.
pub fn add_task<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    new: NewTask,
) -> Result<Task, EngineError> {
    caller.require_admin("add task")?;
    let task = Task {
        id: format!("t-{}", Uuid::new_v4()),
        scope: SeasonScope::Tagged {
            tag: ctx.active.clone(),
        },
        title: new.title,
        scoring: new.scoring,
        bonus_only: new.bonus_only,
        group_key: new.group_key,
    };
    let mut batch = Batch::new();
    batch.push(Mutation::PutTask(task.clone()));
    store.apply(batch)?;
    tracing::info!(task_id = %task.id, season = %ctx.active, "task created");
    Ok(task)
}

/// Replaces a task definition. Admin only.
///
/// Point edits to fixed tasks propagate lazily: the next review or recompute
/// touching the task reads the live value. No cascade runs here.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers,
/// [`EngineError::UnknownTask`] if the task does not exist, or a storage
/// error.
pub fn update_task<S: Store>(store: &S, caller: &Caller, task: Task) -> Result<(), EngineError> {
    caller.require_admin("update task")?;
    if store.task(&task.id)?.is_none() {
        return Err(EngineError::UnknownTask { id: task.id });
    }
    let mut batch = Batch::new();
    batch.push(Mutation::PutTask(task));
    store.apply(batch)?;
    Ok(())
}

/// Deletes a task definition. Admin only.
///
/// Submissions referencing the task are untouched; the recomputer falls back
/// to their stored points when the task is gone.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers or a storage
/// error.
pub fn delete_task<S: Store>(store: &S, caller: &Caller, task_id: &str) -> Result<(), EngineError> {
    caller.require_admin("delete task")?;
    let mut batch = Batch::new();
    batch.push(Mutation::DeleteTask {
        id: task_id.to_string(),
    });
    store.apply(batch)?;
    tracing::info!(task_id, "task deleted");
    Ok(())
}

/// Lists the tasks visible in `season` (tagged for it, or shared).
///
/// # Errors
///
/// Returns a storage error if the catalog cannot be read.
pub fn tasks_for_season<S: Store>(store: &S, season: &str) -> Result<Vec<Task>, EngineError> {
    let mut tasks = store.tasks()?;
    tasks.retain(|t| t.scope.visible_in(season));
    Ok(tasks)
}
