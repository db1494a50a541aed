//! Scoring and season ledger engine for the aura team points tracker.
//!
//! Members submit proof of completed tasks, administrators review the
//! submissions, and a role-based multiplier scales the awarded points. The
//! submission ledger is the single source of truth: every cached per-user
//! total is a projection that can be rebuilt from the ledger at any time,
//! which is what makes admin corrections, role edits, and season archival
//! safe to apply in any order.
//!
//! # Architecture
//!
//! ```text
//! member action ---> Submission (pending) ---+
//!                                            |
//! admin action ----> review state machine ---+--> ledger (source of truth)
//!                                            |
//!                    point recomputer <------+
//!                          |
//!                          v
//!                 cached user totals (projection)
//! ```
//!
//! Seasons partition the ledger by an opaque tag. Archiving a season never
//! moves or deletes records; it only retags the active season pointer and
//! zeroes the live projection. Closed seasons are answered by replaying the
//! ledger for that tag ([`season::view_season`]).
//!
//! # Key modules
//!
//! - [`store`]: keyed-record storage collaborator (in-memory and `SQLite`)
//!   with an atomic multi-record batch primitive
//! - [`roles`]: role registry and the additive multiplier calculator
//! - [`catalog`]: season-scoped task definitions
//! - [`ledger`]: submission records and the status transition table
//! - [`review`]: submit / withdraw / review / correct operations
//! - [`recompute`]: full rebuild of cached totals from the ledger
//! - [`season`]: season boundaries, archival, and history reconstruction
//! - [`engine`]: facade tying the above to one storage backend

pub mod catalog;
pub mod engine;
mod error;
pub mod ledger;
pub mod recompute;
pub mod review;
pub mod roles;
pub mod season;
pub mod store;
mod types;

pub use engine::Engine;
pub use error::EngineError;
pub use types::{now_ms, Caller, User};
