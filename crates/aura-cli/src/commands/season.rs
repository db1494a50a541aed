//! Season commands: archival, standings, goal, lottery.

use anyhow::Result;
use aura_core::season::StandingsEntry;
use aura_core::store::{SqliteStore, Store};
use aura_core::Engine;
use clap::Subcommand;
use serde_json::json;

use super::caller_for;

#[derive(Debug, Subcommand)]
pub enum GoalCommand {
    /// Show a season's goal and current progress
    Show {
        /// Season tag (defaults to the active season)
        #[arg(long)]
        season: Option<String>,
    },

    /// Set the active season's goal (admin)
    Set {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Goal in points
        points: i64,

        /// Goal title
        #[arg(long, default_value = "Season Goal")]
        title: String,
    },
}

pub fn archive(engine: &Engine<SqliteStore>, caller: &str, new_tag: &str) -> Result<()> {
    let ctx = engine.season_context()?;
    let caller = caller_for(engine, caller)?;
    let new_ctx = engine.archive_season(&ctx, &caller, new_tag)?;
    println!("closed {}; active season is now {}", ctx.active, new_ctx.active);
    Ok(())
}

pub fn standings(engine: &Engine<SqliteStore>, season: Option<&str>, json: bool) -> Result<()> {
    let ctx = engine.season_context()?;
    let tag = season.unwrap_or(&ctx.active);
    let entries = engine.view_season(&ctx, tag)?;
    print_entries(&entries, json);
    Ok(())
}

pub fn goal(engine: &Engine<SqliteStore>, cmd: GoalCommand) -> Result<()> {
    let ctx = engine.season_context()?;
    match cmd {
        GoalCommand::Show { season } => {
            let tag = season.unwrap_or_else(|| ctx.active.clone());
            let progress = engine.season_goal_progress(&ctx, &tag)?;
            match engine.store().season(&tag)? {
                Some(record) => println!(
                    "{}: {progress} / {} ({})",
                    tag, record.goal_points, record.goal_title
                ),
                None => println!("{tag}: {progress} points (no goal set)"),
            }
        },
        GoalCommand::Set {
            caller,
            points,
            title,
        } => {
            let caller = caller_for(engine, &caller)?;
            engine.update_season_goal(&ctx, &caller, points, &title)?;
            println!("goal for {} set to {points} ({title})", ctx.active);
        },
    }
    Ok(())
}

pub fn lottery(engine: &Engine<SqliteStore>, json: bool) -> Result<()> {
    let ctx = engine.season_context()?;
    let entries = engine.lottery_eligible(&ctx)?;
    print_entries(&entries, json);
    Ok(())
}

fn print_entries(entries: &[StandingsEntry], json: bool) {
    if json {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| {
                json!({
                    "user_id": e.user_id,
                    "display_name": e.display_name,
                    "points": e.points,
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(rows));
    } else {
        for (rank, entry) in entries.iter().enumerate() {
            println!(
                "{:>3}. {}  {}  {}",
                rank + 1,
                entry.user_id,
                entry.display_name,
                entry.points
            );
        }
    }
}
