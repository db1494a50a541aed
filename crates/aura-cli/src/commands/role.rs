//! Role registry commands.

use std::collections::BTreeSet;

use anyhow::{bail, Context, Result};
use aura_core::roles::{Role, RoleUpdate, RATE_ONE_BPS};
use aura_core::store::{SqliteStore, Store};
use aura_core::Engine;
use clap::Subcommand;

use super::caller_for;

#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// Add a role to the registry (admin)
    Add {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Role code
        code: String,

        /// Display label
        label: String,

        /// Rate in basis points (10000 = 1.0x, 15000 = 1.5x)
        #[arg(long, default_value_t = RATE_ONE_BPS)]
        rate_bps: u32,

        /// Display color
        #[arg(long)]
        color: Option<String>,
    },

    /// Change a role's rate; holders are recomputed (admin)
    SetRate {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Role code
        code: String,

        /// New rate in basis points
        rate_bps: u32,
    },

    /// Replace a user's role set; their total is recomputed (admin)
    Assign {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// User ID
        user_id: String,

        /// Role codes (empty clears all roles)
        codes: Vec<String>,
    },

    /// Delete a role; former holders are recomputed (admin)
    Remove {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Role code
        code: String,
    },

    /// List the role registry
    List,
}

pub fn run(engine: &Engine<SqliteStore>, cmd: RoleCommand) -> Result<()> {
    match cmd {
        RoleCommand::Add {
            caller,
            code,
            label,
            rate_bps,
            color,
        } => {
            let caller = caller_for(engine, &caller)?;
            let mut role = Role::new(&code, &label, rate_bps);
            if let Some(color) = color {
                role.color = color;
            }
            engine.add_role(&caller, role)?;
            println!("added role {code} at {rate_bps} bps");
        },
        RoleCommand::SetRate {
            caller,
            code,
            rate_bps,
        } => {
            let ctx = engine.season_context()?;
            let caller = caller_for(engine, &caller)?;
            let current = engine
                .store()
                .role(&code)?
                .with_context(|| format!("no role '{code}'"))?;
            let report = engine.update_role(
                &ctx,
                &caller,
                &code,
                RoleUpdate {
                    label: current.label,
                    rate_bps,
                    color: current.color,
                },
            )?;
            println!(
                "role {code} now {rate_bps} bps; recomputed {} holder(s)",
                report.recomputed.len()
            );
            report_failures(&report.failed);
        },
        RoleCommand::Assign {
            caller,
            user_id,
            codes,
        } => {
            let ctx = engine.season_context()?;
            let caller = caller_for(engine, &caller)?;
            let codes: BTreeSet<String> = codes.into_iter().collect();
            let total = engine.assign_roles(&ctx, &caller, &user_id, codes)?;
            println!("{user_id} now has {total} points");
        },
        RoleCommand::Remove { caller, code } => {
            let ctx = engine.season_context()?;
            let caller = caller_for(engine, &caller)?;
            let report = engine.delete_role(&ctx, &caller, &code)?;
            println!(
                "removed role {code}; recomputed {} holder(s)",
                report.recomputed.len()
            );
            report_failures(&report.failed);
        },
        RoleCommand::List => {
            for role in engine.store().roles()? {
                println!("{}  {}  {} bps", role.code, role.label, role.rate_bps);
            }
        },
    }
    Ok(())
}

pub fn recompute(
    engine: &Engine<SqliteStore>,
    user_id: Option<&str>,
    role: Option<&str>,
) -> Result<()> {
    let ctx = engine.season_context()?;
    match (user_id, role) {
        (Some(user_id), None) => {
            let total = engine.recompute(&ctx, user_id)?;
            println!("{user_id}: {total} points");
        },
        (None, Some(role)) => {
            let report = engine.recompute_for_role(&ctx, role)?;
            println!("recomputed {} holder(s) of {role}", report.recomputed.len());
            report_failures(&report.failed);
        },
        _ => bail!("pass a user ID or --role <code>"),
    }
    Ok(())
}

fn report_failures(failed: &[aura_core::recompute::RecomputeFailure]) {
    for failure in failed {
        eprintln!("failed: {} ({})", failure.user_id, failure.reason);
    }
}
