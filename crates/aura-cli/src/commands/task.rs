//! Task catalog commands.

use anyhow::{bail, Context, Result};
use aura_core::catalog::{NewTask, ScoringKind};
use aura_core::store::{SqliteStore, Store};
use aura_core::Engine;
use clap::Subcommand;

use super::caller_for;

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Add a task to the active season's catalog (admin)
    Add {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Task title
        title: String,

        /// Fixed score; omit for reviewer-scored tasks
        #[arg(long)]
        points: Option<i64>,

        /// Count toward user totals but not the season goal
        #[arg(long)]
        bonus_only: bool,

        /// Display group key
        #[arg(long, default_value = "1")]
        group: String,
    },

    /// List tasks visible in a season
    List {
        /// Season tag (defaults to the active season)
        #[arg(long)]
        season: Option<String>,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Remove a task (admin); approved submissions keep their points
    Remove {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Task ID
        id: String,
    },

    /// Change a fixed task's score (admin)
    SetPoints {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Task ID
        id: String,

        /// New fixed score
        points: i64,
    },
}

pub fn run(engine: &Engine<SqliteStore>, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            caller,
            title,
            points,
            bonus_only,
            group,
        } => {
            let ctx = engine.season_context()?;
            let caller = caller_for(engine, &caller)?;
            let scoring = match points {
                Some(points) => ScoringKind::Fixed { points },
                None => ScoringKind::Variable,
            };
            let task = engine.add_task(
                &ctx,
                &caller,
                NewTask {
                    title,
                    scoring,
                    bonus_only,
                    group_key: group,
                },
            )?;
            println!("added task {} ({})", task.id, task.title);
        },
        TaskCommand::List { season, json } => {
            let ctx = engine.season_context()?;
            let season = season.unwrap_or(ctx.active);
            let tasks = engine.tasks_for_season(&season)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                for task in tasks {
                    let score = match task.scoring {
                        ScoringKind::Fixed { points } => points.to_string(),
                        ScoringKind::Variable => "reviewer-scored".to_string(),
                    };
                    let bonus = if task.bonus_only { "  [bonus]" } else { "" };
                    println!("{}  {}  {}{}", task.id, task.title, score, bonus);
                }
            }
        },
        TaskCommand::Remove { caller, id } => {
            let caller = caller_for(engine, &caller)?;
            engine.delete_task(&caller, &id)?;
            println!("removed task {id}");
        },
        TaskCommand::SetPoints { caller, id, points } => {
            let caller = caller_for(engine, &caller)?;
            let mut task = engine
                .store()
                .task(&id)?
                .with_context(|| format!("no task '{id}'"))?;
            if !matches!(task.scoring, ScoringKind::Fixed { .. }) {
                bail!("task '{id}' is reviewer-scored and has no fixed score");
            }
            task.scoring = ScoringKind::Fixed { points };
            engine.update_task(&caller, task)?;
            println!("task {id} now scores {points}");
        },
    }
    Ok(())
}
