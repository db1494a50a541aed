//! Pure multiplier arithmetic.

use std::collections::BTreeSet;

use super::Role;

/// Basis-point representation of a 1.0× rate.
pub const RATE_ONE_BPS: u32 = 10_000;

/// Computes the additive multiplier for a role set, in basis points.
///
/// Roles not present in `roles` contribute nothing, so a stale code left on
/// a user after a role deletion is harmless. The result never drops below
/// 1.0× even if a role carries a sub-1.0× rate.
#[must_use]
pub fn multiplier_bps(role_codes: &BTreeSet<String>, roles: &[Role]) -> u32 {
    let extra: i64 = roles
        .iter()
        .filter(|r| role_codes.contains(&r.code))
        .map(|r| i64::from(r.rate_bps) - i64::from(RATE_ONE_BPS))
        .sum();

    let combined = i64::from(RATE_ONE_BPS) + extra;
    u32::try_from(combined.max(i64::from(RATE_ONE_BPS))).unwrap_or(u32::MAX)
}

/// Applies a basis-point multiplier to a base score, rounding half-up.
///
/// Base points are non-negative by construction (rejection forces zero and
/// review clamps its input), so half-up and half-away-from-zero coincide.
#[must_use]
pub fn apply_multiplier(base_points: i64, mult_bps: u32) -> i64 {
    let base = base_points.max(0) as i128;
    let scaled = base * i128::from(mult_bps) + i128::from(RATE_ONE_BPS / 2);
    (scaled / i128::from(RATE_ONE_BPS)) as i64
}
