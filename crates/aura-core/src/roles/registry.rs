//! Role registry operations.
//!
//! Any change that can move a holder's multiplier — rate edits, deletion,
//! assignment changes — cascades into a full recompute of the affected
//! users instead of trusting cached totals.

use std::collections::BTreeSet;

use crate::error::EngineError;
use crate::recompute::{recompute, recompute_for_role, RecomputeReport};
use crate::season::SeasonContext;
use crate::store::{Batch, Mutation, Store};
use crate::types::Caller;

use super::Role;

/// Editable fields of an existing role. The code is immutable.
#[derive(Debug, Clone)]
pub struct RoleUpdate {
    /// New label.
    pub label: String,
    /// New rate in basis points.
    pub rate_bps: u32,
    /// New display color.
    pub color: String,
}

/// Registers a new role. Admin only.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers,
/// [`EngineError::DuplicateRole`] if the code is taken, or a storage error.
pub fn add_role<S: Store>(store: &S, caller: &Caller, role: Role) -> Result<(), EngineError> {
    caller.require_admin("add role")?;
    if store.role(&role.code)?.is_some() {
        return Err(EngineError::DuplicateRole { code: role.code });
    }
    let code = role.code.clone();
    store.apply(Batch::single(Mutation::PutRole(role)))?;
    tracing::info!(code, "role created");
    Ok(())
}

/// Edits a role and recomputes every holder. Admin only.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers,
/// [`EngineError::UnknownRole`] if the code is not registered, or a storage
/// error. Per-holder recompute failures are returned in the report, not as
/// an error.
pub fn update_role<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    code: &str,
    update: RoleUpdate,
) -> Result<RecomputeReport, EngineError> {
    caller.require_admin("update role")?;
    let mut role = store.role(code)?.ok_or_else(|| EngineError::UnknownRole {
        code: code.to_string(),
    })?;
    role.label = update.label;
    role.rate_bps = update.rate_bps;
    role.color = update.color;
    store.apply(Batch::single(Mutation::PutRole(role)))?;
    tracing::info!(code, rate_bps = update.rate_bps, "role updated");

    recompute_for_role(store, ctx, code)
}

/// Deletes a role and recomputes its former holders. Admin only.
///
/// Holders keep the stale code in their role set; it contributes nothing
/// once the registry entry is gone, which the recompute makes effective.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers or a storage
/// error. Per-holder recompute failures are returned in the report.
pub fn delete_role<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    code: &str,
) -> Result<RecomputeReport, EngineError> {
    caller.require_admin("delete role")?;
    // Snapshot the holders before the registry entry disappears.
    let holders = store.users_with_role(code)?;
    store.apply(Batch::single(Mutation::DeleteRole {
        code: code.to_string(),
    }))?;
    tracing::info!(code, holders = holders.len(), "role deleted");

    let mut report = RecomputeReport::default();
    for user in holders {
        match recompute(store, ctx, &user.id, &ctx.active) {
            Ok(_) => report.recomputed.push(user.id),
            Err(err) => {
                tracing::warn!(user_id = %user.id, code, error = %err, "recompute failed");
                report.failed.push(crate::recompute::RecomputeFailure {
                    user_id: user.id,
                    reason: err.to_string(),
                });
            }
        }
    }
    Ok(report)
}

/// Replaces a user's role set and recomputes their total. Admin only.
///
/// # Errors
///
/// Returns [`EngineError::Forbidden`] for non-admin callers,
/// [`EngineError::UnknownUser`] if the user does not exist, or a storage
/// error.
pub fn assign_roles<S: Store>(
    store: &S,
    ctx: &SeasonContext,
    caller: &Caller,
    user_id: &str,
    role_codes: BTreeSet<String>,
) -> Result<i64, EngineError> {
    caller.require_admin("assign roles")?;
    let mut user = store
        .user(user_id)?
        .ok_or_else(|| EngineError::UnknownUser {
            id: user_id.to_string(),
        })?;
    user.role_codes = role_codes;
    store.apply(Batch::single(Mutation::PutUser(user)))?;

    let total = recompute(store, ctx, user_id, &ctx.active)?;
    tracing::info!(user_id, total, "roles assigned and total rebuilt");
    Ok(total)
}
