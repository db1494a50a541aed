//! Storage collaborator for the engine.
//!
//! The engine needs three things from storage: durable keyed records,
//! equality queries filtered by field, and an atomic multi-record write.
//! [`Store`] captures exactly that surface, so the scoring rules never know
//! which backend they run against.
//!
//! Two backends are provided:
//!
//! - [`MemoryStore`]: `BTreeMap`s behind a mutex; used by tests and
//!   embedded callers
//! - [`SqliteStore`]: `SQLite` with WAL mode; entity tables carry the
//!   filterable columns plus a JSON payload column, and a batch is applied
//!   inside a single transaction
//!
//! # Batches
//!
//! Writes go through [`Batch`], an ordered list of [`Mutation`]s committed
//! atomically. A batch may hold at most [`MAX_BATCH_MUTATIONS`] mutations;
//! oversized batches are rejected before any write. Multi-user work (role
//! cascades, season archival) therefore batches *per user*, never globally.

mod batch;
mod memory;
mod sqlite;

#[cfg(test)]
mod tests;

pub use batch::{Batch, Mutation, MAX_BATCH_MUTATIONS};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::catalog::Task;
use crate::ledger::{Submission, SubmissionStatus};
use crate::roles::Role;
use crate::season::{Season, SystemConfig};
use crate::types::User;

/// Errors from the storage collaborator.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A batch exceeded the write ceiling.
    #[error("batch of {len} mutations exceeds the limit of {max}")]
    BatchTooLarge {
        /// Number of mutations in the rejected batch.
        len: usize,
        /// The enforced ceiling.
        max: usize,
    },

    /// Database error from `SQLite`.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored payload could not be (de)serialized.
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Equality filter over the submissions collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionFilter {
    /// Match a single user.
    pub user_id: Option<String>,
    /// Match a single season tag.
    pub season: Option<String>,
    /// Match a single status.
    pub status: Option<SubmissionStatus>,
}

impl SubmissionFilter {
    /// An empty filter matching every submission.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the filter to one user.
    #[must_use]
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Restricts the filter to one season.
    #[must_use]
    pub fn season(mut self, season: impl Into<String>) -> Self {
        self.season = Some(season.into());
        self
    }

    /// Restricts the filter to one status.
    #[must_use]
    pub const fn status(mut self, status: SubmissionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether `sub` matches the filter.
    #[must_use]
    pub fn matches(&self, sub: &Submission) -> bool {
        self.user_id.as_ref().is_none_or(|u| *u == sub.user_id)
            && self.season.as_ref().is_none_or(|s| *s == sub.season)
            && self.status.is_none_or(|st| st == sub.status)
    }
}

/// Keyed-record storage with field-equality queries and atomic batches.
///
/// All reads return owned data; the engine holds nothing across the storage
/// round-trip. Collections are small enough (team-sized) that whole-table
/// reads are acceptable for roles, users, and tasks; submissions are the
/// only collection queried by filter.
pub trait Store {
    /// All registered roles, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn roles(&self) -> Result<Vec<Role>, StoreError>;

    /// One role by code.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn role(&self, code: &str) -> Result<Option<Role>, StoreError>;

    /// All users, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn users(&self) -> Result<Vec<User>, StoreError>;

    /// One user by ID.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn user(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Users currently holding `code`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn users_with_role(&self, code: &str) -> Result<Vec<User>, StoreError> {
        let mut users = self.users()?;
        users.retain(|u| u.role_codes.contains(code));
        Ok(users)
    }

    /// All task definitions, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// One task by ID.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn task(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// One submission by ID.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn submission(&self, id: &str) -> Result<Option<Submission>, StoreError>;

    /// Submissions matching `filter`, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>, StoreError>;

    /// All season records.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn seasons(&self) -> Result<Vec<Season>, StoreError>;

    /// One season record by tag.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn season(&self, tag: &str) -> Result<Option<Season>, StoreError>;

    /// The system configuration record, if the store is initialized.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the read fails.
    fn config(&self) -> Result<Option<SystemConfig>, StoreError>;

    /// Applies a batch atomically: either every mutation lands or none do.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::BatchTooLarge`] for batches over
    /// [`MAX_BATCH_MUTATIONS`], or a backend error (in which case nothing
    /// was written).
    fn apply(&self, batch: Batch) -> Result<(), StoreError>;
}
