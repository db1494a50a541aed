//! In-memory store backend.

// Mutex poisoning indicates a panic in another thread, which is
// unrecoverable for an in-process store.
#![allow(clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::catalog::Task;
use crate::ledger::Submission;
use crate::roles::Role;
use crate::season::{Season, SystemConfig};
use crate::types::User;

use super::{Batch, Mutation, Store, StoreError, SubmissionFilter};

#[derive(Debug, Default)]
struct Inner {
    roles: BTreeMap<String, Role>,
    users: BTreeMap<String, User>,
    tasks: BTreeMap<String, Task>,
    submissions: BTreeMap<String, Submission>,
    seasons: BTreeMap<String, Season>,
    config: Option<SystemConfig>,
}

/// `BTreeMap`-backed store for tests and embedded use.
///
/// A batch is applied under one lock acquisition, so it is atomic with
/// respect to every other reader and writer of the store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

impl Store for MemoryStore {
    fn roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.lock().roles.values().cloned().collect())
    }

    fn role(&self, code: &str) -> Result<Option<Role>, StoreError> {
        Ok(self.lock().roles.get(code).cloned())
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock().users.values().cloned().collect())
    }

    fn user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(id).cloned())
    }

    fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.lock().tasks.values().cloned().collect())
    }

    fn task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.lock().tasks.get(id).cloned())
    }

    fn submission(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        Ok(self.lock().submissions.get(id).cloned())
    }

    fn submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>, StoreError> {
        Ok(self
            .lock()
            .submissions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    fn seasons(&self) -> Result<Vec<Season>, StoreError> {
        Ok(self.lock().seasons.values().cloned().collect())
    }

    fn season(&self, tag: &str) -> Result<Option<Season>, StoreError> {
        Ok(self.lock().seasons.get(tag).cloned())
    }

    fn config(&self) -> Result<Option<SystemConfig>, StoreError> {
        Ok(self.lock().config.clone())
    }

    fn apply(&self, batch: Batch) -> Result<(), StoreError> {
        batch.validate()?;
        let mut inner = self.lock();
        for mutation in batch.into_mutations() {
            match mutation {
                Mutation::PutRole(role) => {
                    inner.roles.insert(role.code.clone(), role);
                }
                Mutation::DeleteRole { code } => {
                    inner.roles.remove(&code);
                }
                Mutation::PutUser(user) => {
                    inner.users.insert(user.id.clone(), user);
                }
                Mutation::PutTask(task) => {
                    inner.tasks.insert(task.id.clone(), task);
                }
                Mutation::DeleteTask { id } => {
                    inner.tasks.remove(&id);
                }
                Mutation::PutSubmission(sub) => {
                    inner.submissions.insert(sub.id.clone(), sub);
                }
                Mutation::PutSeason(season) => {
                    inner.seasons.insert(season.tag.clone(), season);
                }
                Mutation::PutConfig(config) => {
                    inner.config = Some(config);
                }
            }
        }
        Ok(())
    }
}
