//! Tests for the storage backends.
//!
//! Both backends must be observationally equivalent for the engine's query
//! surface; the shared exercises below run against each.

use tempfile::TempDir;

use crate::catalog::{ScoringKind, SeasonScope, Task};
use crate::ledger::{Submission, SubmissionStatus};
use crate::roles::Role;
use crate::season::{Season, SystemConfig};
use crate::types::User;

use super::*;

fn temp_sqlite() -> (SqliteStore, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let store = SqliteStore::open(dir.path().join("aura.db")).expect("failed to open store");
    (store, dir)
}

fn sample_submission(id: &str, user: &str, season: &str, status: SubmissionStatus) -> Submission {
    let mut sub = Submission::new(season, user, "t-1", Some(10), "proof");
    sub.id = id.to_string();
    sub.status = status;
    sub
}

fn exercise_round_trips<S: Store>(store: &S) {
    let mut batch = Batch::new();
    batch.push(Mutation::PutRole(Role::new("vip", "VIP", 12_000)));
    batch.push(Mutation::PutUser(User::new("alice", "Alice")));
    batch.push(Mutation::PutTask(Task {
        id: "t-1".to_string(),
        scope: SeasonScope::Tagged {
            tag: "s1".to_string(),
        },
        title: "Check in".to_string(),
        scoring: ScoringKind::Fixed { points: 10 },
        bonus_only: false,
        group_key: "1".to_string(),
    }));
    batch.push(Mutation::PutSeason(Season::with_defaults("s1")));
    batch.push(Mutation::PutConfig(SystemConfig {
        active_season: "s1".to_string(),
        closed_seasons: vec![],
    }));
    store.apply(batch).unwrap();

    assert_eq!(store.role("vip").unwrap().unwrap().rate_bps, 12_000);
    assert_eq!(store.user("alice").unwrap().unwrap().display_name, "Alice");
    assert_eq!(
        store.task("t-1").unwrap().unwrap().scoring,
        ScoringKind::Fixed { points: 10 }
    );
    assert_eq!(store.season("s1").unwrap().unwrap().goal_points, 10_000);
    assert_eq!(store.config().unwrap().unwrap().active_season, "s1");
    assert!(store.role("ghost").unwrap().is_none());

    // Put is an upsert.
    store
        .apply(Batch::single(Mutation::PutRole(Role::new(
            "vip", "VIP+", 13_000,
        ))))
        .unwrap();
    assert_eq!(store.role("vip").unwrap().unwrap().rate_bps, 13_000);
    assert_eq!(store.roles().unwrap().len(), 1);

    store
        .apply(Batch::single(Mutation::DeleteRole {
            code: "vip".to_string(),
        }))
        .unwrap();
    assert!(store.role("vip").unwrap().is_none());
}

fn exercise_submission_filters<S: Store>(store: &S) {
    let mut batch = Batch::new();
    for (id, user, season, status) in [
        ("s-1", "alice", "s1", SubmissionStatus::Approved),
        ("s-2", "alice", "s1", SubmissionStatus::Pending),
        ("s-3", "alice", "s2", SubmissionStatus::Approved),
        ("s-4", "bob", "s1", SubmissionStatus::Approved),
        ("s-5", "bob", "s1", SubmissionStatus::Withdrawn),
    ] {
        batch.push(Mutation::PutSubmission(sample_submission(
            id, user, season, status,
        )));
    }
    store.apply(batch).unwrap();

    let alice_s1_approved = store
        .submissions(
            &SubmissionFilter::any()
                .user("alice")
                .season("s1")
                .status(SubmissionStatus::Approved),
        )
        .unwrap();
    assert_eq!(alice_s1_approved.len(), 1);
    assert_eq!(alice_s1_approved[0].id, "s-1");

    let s1_approved = store
        .submissions(
            &SubmissionFilter::any()
                .season("s1")
                .status(SubmissionStatus::Approved),
        )
        .unwrap();
    let ids: Vec<&str> = s1_approved.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s-1", "s-4"]);

    assert_eq!(store.submissions(&SubmissionFilter::any()).unwrap().len(), 5);
    assert_eq!(store.submission("s-5").unwrap().unwrap().status, SubmissionStatus::Withdrawn);
}

fn exercise_users_with_role<S: Store>(store: &S) {
    let mut vip_user = User::new("carol", "Carol");
    vip_user.role_codes.insert("vip".to_string());
    let mut batch = Batch::new();
    batch.push(Mutation::PutUser(vip_user));
    batch.push(Mutation::PutUser(User::new("dave", "Dave")));
    store.apply(batch).unwrap();

    let holders = store.users_with_role("vip").unwrap();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].id, "carol");
    assert!(store.users_with_role("ghost").unwrap().is_empty());
}

#[test]
fn memory_round_trips() {
    exercise_round_trips(&MemoryStore::new());
}

#[test]
fn sqlite_round_trips() {
    let (store, _dir) = temp_sqlite();
    exercise_round_trips(&store);
}

#[test]
fn memory_submission_filters() {
    exercise_submission_filters(&MemoryStore::new());
}

#[test]
fn sqlite_submission_filters() {
    let (store, _dir) = temp_sqlite();
    exercise_submission_filters(&store);
}

#[test]
fn memory_users_with_role() {
    exercise_users_with_role(&MemoryStore::new());
}

#[test]
fn sqlite_users_with_role() {
    let (store, _dir) = temp_sqlite();
    exercise_users_with_role(&store);
}

#[test]
fn sqlite_in_memory_works() {
    let store = SqliteStore::in_memory().unwrap();
    exercise_round_trips(&store);
}

#[test]
fn oversized_batch_is_rejected_before_any_write() {
    let store = MemoryStore::new();
    let mut batch = Batch::new();
    for i in 0..=MAX_BATCH_MUTATIONS {
        batch.push(Mutation::PutUser(User::new(format!("u{i}"), "User")));
    }
    let err = store.apply(batch).unwrap_err();
    assert!(matches!(
        err,
        StoreError::BatchTooLarge { len, max }
            if len == MAX_BATCH_MUTATIONS + 1 && max == MAX_BATCH_MUTATIONS
    ));
    // Nothing landed.
    assert!(store.users().unwrap().is_empty());
}

#[test]
fn sqlite_rejects_oversized_batch_too() {
    let (store, _dir) = temp_sqlite();
    let mut batch = Batch::new();
    for i in 0..=MAX_BATCH_MUTATIONS {
        batch.push(Mutation::PutUser(User::new(format!("u{i}"), "User")));
    }
    assert!(matches!(
        store.apply(batch).unwrap_err(),
        StoreError::BatchTooLarge { .. }
    ));
    assert!(store.users().unwrap().is_empty());
}

#[test]
fn full_batch_at_the_ceiling_is_accepted() {
    let store = MemoryStore::new();
    let mut batch = Batch::new();
    for i in 0..MAX_BATCH_MUTATIONS {
        batch.push(Mutation::PutUser(User::new(format!("u{i}"), "User")));
    }
    store.apply(batch).unwrap();
    assert_eq!(store.users().unwrap().len(), MAX_BATCH_MUTATIONS);
}

#[test]
fn sqlite_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("aura.db");
    {
        let store = SqliteStore::open(&path).unwrap();
        store
            .apply(Batch::single(Mutation::PutUser(User::new("alice", "Alice"))))
            .unwrap();
    }
    let reopened = SqliteStore::open(&path).unwrap();
    assert_eq!(reopened.user("alice").unwrap().unwrap().display_name, "Alice");
}

#[test]
fn filter_matches_agrees_with_queries() {
    let filter = SubmissionFilter::any()
        .user("alice")
        .status(SubmissionStatus::Approved);
    let hit = sample_submission("s-1", "alice", "s1", SubmissionStatus::Approved);
    let miss_user = sample_submission("s-2", "bob", "s1", SubmissionStatus::Approved);
    let miss_status = sample_submission("s-3", "alice", "s1", SubmissionStatus::Pending);

    assert!(filter.matches(&hit));
    assert!(!filter.matches(&miss_user));
    assert!(!filter.matches(&miss_status));
}
