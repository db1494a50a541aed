//! Atomic write batches.

use crate::catalog::Task;
use crate::ledger::Submission;
use crate::roles::Role;
use crate::season::{Season, SystemConfig};
use crate::types::User;

use super::StoreError;

/// Maximum number of mutations per atomic batch.
///
/// Matches the write-batch ceiling of the document stores this engine is
/// deployed against. Batch producers must chunk below this limit.
pub const MAX_BATCH_MUTATIONS: usize = 400;

/// A single keyed-record write.
///
/// Submissions have no delete variant: reviewed records are permanent and
/// withdrawal is a status transition, never a removal.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Insert or replace a role.
    PutRole(Role),
    /// Remove a role from the registry.
    DeleteRole {
        /// Code of the role to remove.
        code: String,
    },
    /// Insert or replace a user.
    PutUser(User),
    /// Insert or replace a task definition.
    PutTask(Task),
    /// Remove a task definition.
    DeleteTask {
        /// ID of the task to remove.
        id: String,
    },
    /// Insert or replace a submission record.
    PutSubmission(Submission),
    /// Insert or replace a season record.
    PutSeason(Season),
    /// Replace the system configuration record.
    PutConfig(SystemConfig),
}

/// An ordered list of mutations committed as one durable unit.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    mutations: Vec<Mutation>,
}

impl Batch {
    /// An empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A batch holding a single mutation.
    #[must_use]
    pub fn single(mutation: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
        }
    }

    /// Appends a mutation. The size ceiling is enforced at commit time.
    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    /// Number of queued mutations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether the batch holds no mutations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Fails closed if the batch exceeds [`MAX_BATCH_MUTATIONS`].
    pub(crate) fn validate(&self) -> Result<(), StoreError> {
        if self.mutations.len() > MAX_BATCH_MUTATIONS {
            return Err(StoreError::BatchTooLarge {
                len: self.mutations.len(),
                max: MAX_BATCH_MUTATIONS,
            });
        }
        Ok(())
    }

    /// Consumes the batch, yielding its mutations in insertion order.
    pub(crate) fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

impl From<Mutation> for Batch {
    fn from(mutation: Mutation) -> Self {
        Self::single(mutation)
    }
}
