//! Tests for the role registry and multiplier arithmetic.

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::error::EngineError;
use crate::season::SeasonContext;
use crate::store::{Batch, MemoryStore, Mutation, Store};
use crate::types::{Caller, User};

use super::*;

fn codes(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn empty_role_set_is_identity() {
    let roles = vec![Role::new("vip", "VIP", 12_000)];
    assert_eq!(multiplier_bps(&codes(&[]), &roles), RATE_ONE_BPS);
}

#[test]
fn multiplier_is_additive_not_compounding() {
    // +20% and +30% stack to +50%, not +56%.
    let roles = vec![
        Role::new("vip", "VIP", 12_000),
        Role::new("mod", "Moderator", 13_000),
    ];
    assert_eq!(multiplier_bps(&codes(&["vip", "mod"]), &roles), 15_000);
}

#[test]
fn unknown_codes_contribute_nothing() {
    let roles = vec![Role::new("vip", "VIP", 12_000)];
    assert_eq!(multiplier_bps(&codes(&["ghost"]), &roles), RATE_ONE_BPS);
    assert_eq!(
        multiplier_bps(&codes(&["vip", "ghost"]), &roles),
        12_000
    );
}

#[test]
fn multiplier_never_drops_below_one() {
    // A sub-1.0x role cannot push the combined multiplier under the base.
    let roles = vec![
        Role::new("penalty", "Penalty", 2_000),
        Role::new("vip", "VIP", 11_000),
    ];
    assert_eq!(
        multiplier_bps(&codes(&["penalty", "vip"]), &roles),
        RATE_ONE_BPS
    );
    assert_eq!(multiplier_bps(&codes(&["penalty"]), &roles), RATE_ONE_BPS);
}

#[test]
fn apply_multiplier_rounds_half_up() {
    assert_eq!(apply_multiplier(10, 15_000), 15);
    // 1 x 1.5 = 1.5, rounds up to 2.
    assert_eq!(apply_multiplier(1, 15_000), 2);
    // 1 x 1.05 = 1.05, rounds down to 1.
    assert_eq!(apply_multiplier(1, 10_500), 1);
    assert_eq!(apply_multiplier(0, 15_000), 0);
    // Negative bases are clamped, not awarded.
    assert_eq!(apply_multiplier(-5, 15_000), 0);
}

#[test]
fn add_role_rejects_duplicate_code() {
    let store = MemoryStore::new();
    let admin = Caller::admin("admin");
    add_role(&store, &admin, Role::new("vip", "VIP", 11_000)).unwrap();

    let err = add_role(&store, &admin, Role::new("vip", "VIP again", 12_000)).unwrap_err();
    assert!(matches!(err, EngineError::DuplicateRole { code } if code == "vip"));
}

#[test]
fn add_role_requires_admin() {
    let store = MemoryStore::new();
    let err = add_role(&store, &Caller::member("m"), Role::new("vip", "VIP", 11_000)).unwrap_err();
    assert!(matches!(err, EngineError::Forbidden { .. }));
}

#[test]
fn assign_roles_rebuilds_the_total() {
    let store = MemoryStore::new();
    let ctx = SeasonContext {
        active: "s1".to_string(),
        closed: vec![],
    };
    let admin = Caller::admin("admin");

    let mut batch = Batch::new();
    batch.push(Mutation::PutUser(User::new("alice", "Alice")));
    batch.push(Mutation::PutRole(Role::new("vip", "VIP", 15_000)));
    store.apply(batch).unwrap();

    // No submissions yet: the total stays zero even with the role.
    let total = assign_roles(&store, &ctx, &admin, "alice", codes(&["vip"])).unwrap();
    assert_eq!(total, 0);
    let alice = store.user("alice").unwrap().unwrap();
    assert!(alice.role_codes.contains("vip"));
}

#[test]
fn update_role_requires_known_code() {
    let store = MemoryStore::new();
    let ctx = SeasonContext {
        active: "s1".to_string(),
        closed: vec![],
    };
    let err = update_role(
        &store,
        &ctx,
        &Caller::admin("admin"),
        "ghost",
        RoleUpdate {
            label: "Ghost".to_string(),
            rate_bps: 12_000,
            color: "#fff".to_string(),
        },
    )
    .unwrap_err();
    assert!(matches!(err, EngineError::UnknownRole { .. }));
}

proptest! {
    /// For any registry and any held subset, the multiplier is at least 1.0x.
    #[test]
    fn multiplier_has_a_floor(
        rates in prop::collection::vec(0u32..40_000, 0..8),
        held in prop::collection::vec(any::<bool>(), 0..8),
    ) {
        let roles: Vec<Role> = rates
            .iter()
            .enumerate()
            .map(|(i, rate)| Role::new(format!("r{i}"), format!("Role {i}"), *rate))
            .collect();
        let held_codes: BTreeSet<String> = roles
            .iter()
            .zip(held.iter())
            .filter(|(_, keep)| **keep)
            .map(|(r, _)| r.code.clone())
            .collect();

        prop_assert!(multiplier_bps(&held_codes, &roles) >= RATE_ONE_BPS);
    }

    /// Scaling by 1.0x is the identity on non-negative bases.
    #[test]
    fn identity_multiplier_preserves_base(base in 0i64..1_000_000) {
        prop_assert_eq!(apply_multiplier(base, RATE_ONE_BPS), base);
    }
}
