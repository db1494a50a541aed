//! Shared record types.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A team member.
///
/// `cached_total_points` is a derived projection of the submission ledger,
/// maintained exclusively by the point recomputer. It exists so reads do not
/// rescan the ledger; it is never an independent write target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: String,
    /// Display name shown on standings.
    pub display_name: String,
    /// Role codes currently held. `BTreeSet` keeps iteration deterministic.
    pub role_codes: BTreeSet<String>,
    /// Cached total for the active season.
    pub cached_total_points: i64,
    /// Whether the user may perform admin operations.
    pub is_admin: bool,
}

impl User {
    /// Creates a member with no roles and a zero total.
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            role_codes: BTreeSet::new(),
            cached_total_points: 0,
            is_admin: false,
        }
    }
}

/// Identity of the party invoking an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// The calling user's ID.
    pub user_id: String,
    /// Whether the caller holds admin rights.
    pub is_admin: bool,
}

impl Caller {
    /// Fails with [`EngineError::Forbidden`] unless the caller is an admin.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Forbidden`] naming `action`.
    pub fn require_admin(&self, action: &str) -> Result<(), crate::EngineError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(crate::EngineError::forbidden(action))
        }
    }

    /// A regular member caller.
    #[must_use]
    pub fn member(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    /// An admin caller.
    #[must_use]
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }
}

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
