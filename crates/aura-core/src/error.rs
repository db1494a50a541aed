//! Engine-level error taxonomy.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by engine operations.
///
/// Anything touching point totals fails loudly: storage errors are wrapped
/// and returned, never swallowed, so a failed recompute is never reported as
/// success.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// No active season is configured, or the requested tag is unknown.
    #[error("invalid season: {reason}")]
    InvalidSeason {
        /// Why the season could not be resolved.
        reason: String,
    },

    /// The submission is missing or already in a terminal state.
    #[error("invalid submission: {id}")]
    InvalidSubmission {
        /// The submission ID that was rejected.
        id: String,
    },

    /// The caller lacks rights over the record.
    #[error("forbidden: {action}")]
    Forbidden {
        /// The action that was refused.
        action: String,
    },

    /// Season archival would reuse an existing tag.
    #[error("season tag already exists: {tag}")]
    DuplicateSeason {
        /// The colliding tag.
        tag: String,
    },

    /// A role with this code is already registered.
    #[error("role code already exists: {code}")]
    DuplicateRole {
        /// The colliding role code.
        code: String,
    },

    /// The referenced task does not exist in the given season.
    #[error("unknown task: {id}")]
    UnknownTask {
        /// The task ID that was not found.
        id: String,
    },

    /// The referenced user does not exist.
    #[error("unknown user: {id}")]
    UnknownUser {
        /// The user ID that was not found.
        id: String,
    },

    /// The referenced role does not exist.
    #[error("unknown role: {code}")]
    UnknownRole {
        /// The role code that was not found.
        code: String,
    },

    /// Bootstrap was requested on a store that already holds data.
    #[error("store already initialized")]
    AlreadyInitialized,

    /// Storage collaborator failure.
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidSeason`].
    #[must_use]
    pub fn invalid_season(reason: impl Into<String>) -> Self {
        Self::InvalidSeason {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`EngineError::Forbidden`].
    #[must_use]
    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }
}
