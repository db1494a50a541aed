//! Season boundaries, archival, and history reconstruction.
//!
//! Exactly one season is active at a time. Archiving a season is a one-way
//! transition: the old tag joins the closed list, a fresh season record is
//! created, and every user's live cached total is zeroed. Submissions and
//! tasks are never migrated or deleted; they keep their original season tag
//! forever, which is what makes any past season reconstructible on demand.
//!
//! Reads against a closed season never touch the live projection: the
//! history reconstructor replays the ledger for that tag. Because role
//! assignment history is not retained, closed-season views apply the
//! *currently configured* multipliers. A role granted or revoked after a
//! season closed therefore retroactively changes that season's displayed
//! totals. This is a known, documented approximation, not a bug.

mod history;
mod manager;


pub use history::{lottery_eligible, season_goal_progress, view_season, StandingsEntry};
pub use manager::{archive_season, load_context, reset_live_totals, update_season_goal};

use serde::{Deserialize, Serialize};

/// Default goal points for a freshly created season.
pub const DEFAULT_GOAL_POINTS: i64 = 10_000;

/// Default goal title for a freshly created season.
pub const DEFAULT_GOAL_TITLE: &str = "Season Goal";

/// Default lottery threshold for a freshly created season.
pub const DEFAULT_LOTTERY_THRESHOLD: i64 = 100;

/// Per-season configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    /// Unique, human-readable tag; doubles as the ledger partition key.
    pub tag: String,
    /// Whether this is the live season.
    pub is_active: bool,
    /// Team-wide goal the non-bonus aggregate is measured against.
    pub goal_points: i64,
    /// Display title for the goal.
    pub goal_title: String,
    /// Minimum live total for lottery eligibility.
    pub lottery_threshold: i64,
}

impl Season {
    /// Creates an active season with default goal and threshold.
    #[must_use]
    pub fn with_defaults(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            is_active: true,
            goal_points: DEFAULT_GOAL_POINTS,
            goal_title: DEFAULT_GOAL_TITLE.to_string(),
            lottery_threshold: DEFAULT_LOTTERY_THRESHOLD,
        }
    }
}

/// The single system configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Tag of the active season.
    pub active_season: String,
    /// Tags of closed seasons, oldest first.
    pub closed_seasons: Vec<String>,
}

/// Resolved season context, loaded once and passed into every engine entry
/// point.
///
/// Operations take this explicitly instead of reading ambient state, which
/// keeps the core testable without a live storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonContext {
    /// The active season tag.
    pub active: String,
    /// Closed season tags, oldest first.
    pub closed: Vec<String>,
}

impl SeasonContext {
    /// Whether `tag` names the active or a closed season.
    #[must_use]
    pub fn knows(&self, tag: &str) -> bool {
        self.active == tag || self.closed.iter().any(|t| t == tag)
    }
}
