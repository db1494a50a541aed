//! `SQLite`-backed store implementation.
//!
//! Records are stored as JSON payloads alongside the columns the engine
//! filters on. WAL mode keeps concurrent reviewers' reads cheap while a
//! batch commits; a batch is applied inside a single transaction, so it is
//! all-or-nothing.

// Mutex poisoning indicates a panic in another thread, which is
// unrecoverable for an in-process store.
#![allow(clippy::missing_panics_doc)]

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::Task;
use crate::ledger::Submission;
use crate::roles::Role;
use crate::season::{Season, SystemConfig};
use crate::types::User;

use super::{Batch, Mutation, Store, StoreError, SubmissionFilter};

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Connection pragmas applied on open.
const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;
";

/// `SQLite` store for durable deployments.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens or creates a store at the given path.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the database cannot be opened or the
    /// schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Creates an in-memory store, useful for tests.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the schema cannot be applied.
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(PRAGMAS)?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    fn fetch_all<T: DeserializeOwned>(&self, sql: &str) -> Result<Vec<T>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut out = Vec::new();
        for payload in rows {
            out.push(serde_json::from_str(&payload?)?);
        }
        Ok(out)
    }

    fn fetch_by_key<T: DeserializeOwned>(
        &self,
        sql: &str,
        key: &str,
    ) -> Result<Option<T>, StoreError> {
        let conn = self.lock();
        let payload: Option<String> = conn
            .query_row(sql, params![key], |row| row.get(0))
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(StoreError::from))
            .transpose()
    }
}

fn to_payload<T: Serialize>(record: &T) -> Result<String, StoreError> {
    Ok(serde_json::to_string(record)?)
}

impl Store for SqliteStore {
    fn roles(&self) -> Result<Vec<Role>, StoreError> {
        self.fetch_all("SELECT payload FROM roles ORDER BY code")
    }

    fn role(&self, code: &str) -> Result<Option<Role>, StoreError> {
        self.fetch_by_key("SELECT payload FROM roles WHERE code = ?1", code)
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        self.fetch_all("SELECT payload FROM users ORDER BY id")
    }

    fn user(&self, id: &str) -> Result<Option<User>, StoreError> {
        self.fetch_by_key("SELECT payload FROM users WHERE id = ?1", id)
    }

    fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.fetch_all("SELECT payload FROM tasks ORDER BY id")
    }

    fn task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        self.fetch_by_key("SELECT payload FROM tasks WHERE id = ?1", id)
    }

    fn submission(&self, id: &str) -> Result<Option<Submission>, StoreError> {
        self.fetch_by_key("SELECT payload FROM submissions WHERE id = ?1", id)
    }

    fn submissions(&self, filter: &SubmissionFilter) -> Result<Vec<Submission>, StoreError> {
        let mut sql = String::from("SELECT payload FROM submissions");
        let mut clauses = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(user_id) = &filter.user_id {
            params.push(user_id.clone());
            clauses.push(format!("user_id = ?{}", params.len()));
        }
        if let Some(season) = &filter.season {
            params.push(season.clone());
            clauses.push(format!("season = ?{}", params.len()));
        }
        if let Some(status) = filter.status {
            params.push(status.as_str().to_string());
            clauses.push(format!("status = ?{}", params.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id");

        let conn = self.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            row.get::<_, String>(0)
        })?;
        let mut out = Vec::new();
        for payload in rows {
            out.push(serde_json::from_str(&payload?)?);
        }
        Ok(out)
    }

    fn seasons(&self) -> Result<Vec<Season>, StoreError> {
        self.fetch_all("SELECT payload FROM seasons ORDER BY tag")
    }

    fn season(&self, tag: &str) -> Result<Option<Season>, StoreError> {
        self.fetch_by_key("SELECT payload FROM seasons WHERE tag = ?1", tag)
    }

    fn config(&self) -> Result<Option<SystemConfig>, StoreError> {
        let conn = self.lock();
        let payload: Option<String> = conn
            .query_row("SELECT payload FROM system_config WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        payload
            .map(|p| serde_json::from_str(&p).map_err(StoreError::from))
            .transpose()
    }

    fn apply(&self, batch: Batch) -> Result<(), StoreError> {
        batch.validate()?;
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for mutation in batch.into_mutations() {
            match mutation {
                Mutation::PutRole(role) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO roles (code, payload) VALUES (?1, ?2)",
                        params![role.code, to_payload(&role)?],
                    )?;
                }
                Mutation::DeleteRole { code } => {
                    tx.execute("DELETE FROM roles WHERE code = ?1", params![code])?;
                }
                Mutation::PutUser(user) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO users (id, payload) VALUES (?1, ?2)",
                        params![user.id, to_payload(&user)?],
                    )?;
                }
                Mutation::PutTask(task) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO tasks (id, payload) VALUES (?1, ?2)",
                        params![task.id, to_payload(&task)?],
                    )?;
                }
                Mutation::DeleteTask { id } => {
                    tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
                }
                Mutation::PutSubmission(sub) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO submissions \
                         (id, user_id, season, status, payload) \
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![
                            sub.id,
                            sub.user_id,
                            sub.season,
                            sub.status.as_str(),
                            to_payload(&sub)?
                        ],
                    )?;
                }
                Mutation::PutSeason(season) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO seasons (tag, payload) VALUES (?1, ?2)",
                        params![season.tag, to_payload(&season)?],
                    )?;
                }
                Mutation::PutConfig(config) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO system_config (id, payload) VALUES (1, ?1)",
                        params![to_payload(&config)?],
                    )?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}
