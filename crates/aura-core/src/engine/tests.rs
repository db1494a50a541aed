//! End-to-end tests over the engine facade.

use std::collections::BTreeSet;

use crate::catalog::{NewTask, ScoringKind};
use crate::error::EngineError;
use crate::review::ReviewAction;
use crate::roles::{Role, RoleUpdate};
use crate::store::{MemoryStore, SqliteStore, Store};
use crate::types::Caller;

use super::*;

fn engine() -> (Engine<MemoryStore>, SeasonContext) {
    let engine = Engine::new(MemoryStore::new());
    let ctx = engine.bootstrap("root", "Root").unwrap();
    (engine, ctx)
}

fn codes(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn bootstrap_seeds_a_working_system() {
    let (engine, ctx) = engine();
    assert_eq!(ctx.active, FIRST_SEASON_TAG);
    assert!(ctx.closed.is_empty());

    let admin = engine.store().user("root").unwrap().unwrap();
    assert!(admin.is_admin);
    assert!(engine.store().role("vip").unwrap().is_some());
    assert_eq!(engine.tasks_for_season(FIRST_SEASON_TAG).unwrap().len(), 1);
}

#[test]
fn bootstrap_refuses_to_run_twice() {
    let (engine, _ctx) = engine();
    let err = engine.bootstrap("root", "Root").unwrap_err();
    assert!(matches!(err, EngineError::AlreadyInitialized));
}

#[test]
fn ensure_user_is_idempotent() {
    let (engine, _ctx) = engine();
    engine.ensure_user("alice", "Alice").unwrap();
    let again = engine.ensure_user("alice", "Alice Renamed").unwrap();
    // The existing record wins.
    assert_eq!(again.display_name, "Alice");
}

#[test]
fn submission_lifecycle_awards_multiplied_points() {
    let (engine, ctx) = engine();
    let admin = Caller::admin("root");
    engine.ensure_user("alice", "Alice").unwrap();
    engine
        .add_role(&admin, Role::new("mvp", "MVP", 15_000))
        .unwrap();
    engine
        .assign_roles(&ctx, &admin, "alice", codes(&["mvp"]))
        .unwrap();

    // The bootstrap task is fixed at 10 points.
    let sub = engine
        .submit(&ctx, &Caller::member("alice"), "t-daily-checkin", "done")
        .unwrap();
    let reviewed = engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();
    assert_eq!(reviewed.final_points, 15);

    let standings = engine.view_season(&ctx, FIRST_SEASON_TAG).unwrap();
    let alice = standings.iter().find(|e| e.user_id == "alice").unwrap();
    assert_eq!(alice.points, 15);
}

#[test]
fn task_edit_plus_correction_rescores_history() {
    let (engine, ctx) = engine();
    let admin = Caller::admin("root");
    engine.ensure_user("alice", "Alice").unwrap();
    engine
        .add_role(&admin, Role::new("mvp", "MVP", 15_000))
        .unwrap();
    engine
        .assign_roles(&ctx, &admin, "alice", codes(&["mvp"]))
        .unwrap();

    let sub = engine
        .submit(&ctx, &Caller::member("alice"), "t-daily-checkin", "done")
        .unwrap();
    engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();

    let mut task = engine.store().task("t-daily-checkin").unwrap().unwrap();
    task.scoring = ScoringKind::Fixed { points: 20 };
    engine.update_task(&admin, task).unwrap();

    let corrected = engine
        .correct(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();
    assert_eq!(corrected.final_points, 30);
    assert_eq!(engine.recompute(&ctx, "alice").unwrap(), 30);
}

#[test]
fn role_rate_update_cascades_to_holders() {
    let (engine, ctx) = engine();
    let admin = Caller::admin("root");
    engine.ensure_user("alice", "Alice").unwrap();
    engine
        .assign_roles(&ctx, &admin, "alice", codes(&["vip"]))
        .unwrap();

    let sub = engine
        .submit(&ctx, &Caller::member("alice"), "t-daily-checkin", "done")
        .unwrap();
    engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();
    // Bootstrap VIP is 1.1x: 10 -> 11.
    assert_eq!(
        engine.store().user("alice").unwrap().unwrap().cached_total_points,
        11
    );

    let report = engine
        .update_role(
            &ctx,
            &admin,
            "vip",
            RoleUpdate {
                label: "VIP".to_string(),
                rate_bps: 20_000,
                color: "#eab308".to_string(),
            },
        )
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(
        engine.store().user("alice").unwrap().unwrap().cached_total_points,
        20
    );
}

#[test]
fn role_deletion_drops_the_boost_from_holders() {
    let (engine, ctx) = engine();
    let admin = Caller::admin("root");
    engine.ensure_user("alice", "Alice").unwrap();
    engine
        .assign_roles(&ctx, &admin, "alice", codes(&["vip"]))
        .unwrap();
    let sub = engine
        .submit(&ctx, &Caller::member("alice"), "t-daily-checkin", "done")
        .unwrap();
    engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();

    let report = engine.delete_role(&ctx, &admin, "vip").unwrap();
    assert!(report.is_complete());
    assert!(engine.store().role("vip").unwrap().is_none());
    assert_eq!(
        engine.store().user("alice").unwrap().unwrap().cached_total_points,
        10
    );
}

#[test]
fn archive_then_view_round_trips_the_season() {
    let (engine, ctx) = engine();
    let admin = Caller::admin("root");
    engine.ensure_user("alice", "Alice").unwrap();
    let sub = engine
        .submit(&ctx, &Caller::member("alice"), "t-daily-checkin", "done")
        .unwrap();
    engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();
    let before = engine.view_season(&ctx, FIRST_SEASON_TAG).unwrap();

    let ctx2 = engine.archive_season(&ctx, &admin, "season-2").unwrap();
    assert_eq!(ctx2.active, "season-2");
    assert_eq!(
        engine.store().user("alice").unwrap().unwrap().cached_total_points,
        0
    );
    assert_eq!(engine.view_season(&ctx2, FIRST_SEASON_TAG).unwrap(), before);

    // The old season's tasks are no longer submittable.
    let err = engine
        .submit(&ctx2, &Caller::member("alice"), "t-daily-checkin", "again")
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownTask { .. }));
}

#[test]
fn goal_progress_and_lottery_follow_the_season_record() {
    let (engine, ctx) = engine();
    let admin = Caller::admin("root");
    engine.ensure_user("alice", "Alice").unwrap();
    let sub = engine
        .submit(&ctx, &Caller::member("alice"), "t-daily-checkin", "done")
        .unwrap();
    engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();

    assert_eq!(engine.season_goal_progress(&ctx, FIRST_SEASON_TAG).unwrap(), 10);

    engine
        .update_season_goal(&ctx, &admin, 500, "Sprint goal")
        .unwrap();
    let season = engine.store().season(FIRST_SEASON_TAG).unwrap().unwrap();
    assert_eq!(season.goal_points, 500);

    // Default threshold is 100; nobody qualifies at 10 points.
    assert!(engine.lottery_eligible(&ctx).unwrap().is_empty());
}

#[test]
fn bonus_only_points_raise_totals_but_not_the_goal() {
    let (engine, ctx) = engine();
    let admin = Caller::admin("root");
    engine.ensure_user("alice", "Alice").unwrap();
    // Bootstrap VIP is 1.1x.
    engine
        .assign_roles(&ctx, &admin, "alice", codes(&["vip"]))
        .unwrap();

    let task = engine
        .add_task(
            &ctx,
            &admin,
            NewTask {
                title: "Side quest".to_string(),
                scoring: ScoringKind::Fixed { points: 50 },
                bonus_only: true,
                group_key: "9".to_string(),
            },
        )
        .unwrap();
    let sub = engine
        .submit(&ctx, &Caller::member("alice"), &task.id, "done")
        .unwrap();
    engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 0)
        .unwrap();

    // 50 x 1.1 lands on the owner's total and the standings.
    assert_eq!(
        engine.store().user("alice").unwrap().unwrap().cached_total_points,
        55
    );
    let standings = engine.view_season(&ctx, FIRST_SEASON_TAG).unwrap();
    let alice = standings.iter().find(|e| e.user_id == "alice").unwrap();
    assert_eq!(alice.points, 55);
    // The goal aggregate never sees bonus-only points.
    assert_eq!(
        engine.season_goal_progress(&ctx, FIRST_SEASON_TAG).unwrap(),
        0
    );
}

#[test]
fn variable_task_flow_over_sqlite() {
    let engine = Engine::new(SqliteStore::in_memory().unwrap());
    let ctx = engine.bootstrap("root", "Root").unwrap();
    let admin = Caller::admin("root");
    engine.ensure_user("bob", "Bob").unwrap();

    let task = engine
        .add_task(
            &ctx,
            &admin,
            NewTask {
                title: "Writeup".to_string(),
                scoring: ScoringKind::Variable,
                bonus_only: false,
                group_key: "2".to_string(),
            },
        )
        .unwrap();

    let sub = engine
        .submit(&ctx, &Caller::member("bob"), &task.id, "draft attached")
        .unwrap();
    assert_eq!(sub.base_points, None);

    let reviewed = engine
        .review(&ctx, &admin, &sub.id, ReviewAction::Approve, 35)
        .unwrap();
    assert_eq!(reviewed.final_points, 35);
    assert_eq!(
        engine.store().user("bob").unwrap().unwrap().cached_total_points,
        35
    );
}
