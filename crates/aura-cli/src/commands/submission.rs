//! Submission lifecycle commands.

use anyhow::Result;
use aura_core::review::ReviewAction;
use aura_core::store::SqliteStore;
use aura_core::Engine;
use clap::ValueEnum;

use super::caller_for;

/// Review verdict.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Verdict {
    Approve,
    Reject,
}

impl From<Verdict> for ReviewAction {
    fn from(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Approve => Self::Approve,
            Verdict::Reject => Self::Reject,
        }
    }
}

pub fn submit(
    engine: &Engine<SqliteStore>,
    caller: &str,
    task_id: &str,
    proof: &str,
) -> Result<()> {
    let ctx = engine.season_context()?;
    let caller = caller_for(engine, caller)?;
    let sub = engine.submit(&ctx, &caller, task_id, proof)?;
    println!("submitted {} (pending review)", sub.id);
    Ok(())
}

pub fn withdraw(engine: &Engine<SqliteStore>, caller: &str, submission_id: &str) -> Result<()> {
    let caller = caller_for(engine, caller)?;
    let sub = engine.withdraw(&caller, submission_id)?;
    println!("withdrew {}", sub.id);
    Ok(())
}

pub fn review(
    engine: &Engine<SqliteStore>,
    caller: &str,
    submission_id: &str,
    verdict: Verdict,
    points: i64,
    correction: bool,
) -> Result<()> {
    let ctx = engine.season_context()?;
    let caller = caller_for(engine, caller)?;
    let action = ReviewAction::from(verdict);
    let sub = if correction {
        engine.correct(&ctx, &caller, submission_id, action, points)?
    } else {
        engine.review(&ctx, &caller, submission_id, action, points)?
    };
    println!(
        "{} {} -> {} ({} points)",
        sub.id,
        sub.user_id,
        sub.status,
        sub.final_points
    );
    Ok(())
}
