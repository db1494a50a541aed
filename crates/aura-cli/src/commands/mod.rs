//! Command implementations.

pub mod init;
pub mod role;
pub mod season;
pub mod submission;
pub mod task;

use anyhow::{Context, Result};
use aura_core::store::{SqliteStore, Store};
use aura_core::{Caller, Engine};

/// Resolves a user ID into a caller, reading the admin flag off the stored
/// record.
pub(crate) fn caller_for(engine: &Engine<SqliteStore>, user_id: &str) -> Result<Caller> {
    let user = engine
        .store()
        .user(user_id)?
        .with_context(|| format!("no user record for '{user_id}' (run `aura user` first)"))?;
    tracing::debug!(user_id, is_admin = user.is_admin, "resolved caller");
    Ok(if user.is_admin {
        Caller::admin(user_id)
    } else {
        Caller::member(user_id)
    })
}

#[cfg(test)]
mod tests {
    use aura_core::store::SqliteStore;
    use aura_core::Engine;

    use super::caller_for;

    #[test]
    fn caller_for_reads_the_admin_flag_off_the_record() {
        let engine = Engine::new(SqliteStore::in_memory().unwrap());
        engine.bootstrap("root", "Root").unwrap();
        engine.ensure_user("alice", "Alice").unwrap();

        assert!(caller_for(&engine, "root").unwrap().is_admin);
        assert!(!caller_for(&engine, "alice").unwrap().is_admin);
        assert!(caller_for(&engine, "ghost").is_err());
    }
}
