//! Role registry and multiplier calculator.
//!
//! Roles are named, multiplier-bearing tags. A user may hold any number of
//! them; the resulting score multiplier is **additive**: each role
//! contributes its rate minus 1.0×, and the contributions are summed on top
//! of the 1.0× base. Two "+20%" roles therefore stack to "+40%", not "+44%".
//! Stacking is deliberately non-compounding so the effect of granting a role
//! is predictable regardless of what else the user holds.
//!
//! All rates are carried in basis points (`10_000` = 1.0×) so that scoring
//! is pure integer arithmetic and recomputation is deterministic across
//! platforms.
//!
//! Editing or deleting a role changes the multiplier of every holder, so the
//! registry operations cascade into a full recompute for the affected users
//! rather than trusting any cached totals.

mod multiplier;
mod registry;

#[cfg(test)]
mod tests;

pub use multiplier::{apply_multiplier, multiplier_bps, RATE_ONE_BPS};
pub use registry::{add_role, assign_roles, delete_role, update_role, RoleUpdate};

use serde::{Deserialize, Serialize};

/// A named multiplier-bearing tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique registry code, e.g. `"vip"`.
    pub code: String,
    /// Human-readable label.
    pub label: String,
    /// Full multiplier rate in basis points (`12_000` = 1.2× = "+20%").
    pub rate_bps: u32,
    /// Display color, as a CSS hex string.
    pub color: String,
}

impl Role {
    /// Creates a role with the given code, label, and rate.
    #[must_use]
    pub fn new(code: impl Into<String>, label: impl Into<String>, rate_bps: u32) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            rate_bps,
            color: String::from("#9ca3af"),
        }
    }
}
