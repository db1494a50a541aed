//! aura - team task-points tracker.
//!
//! CLI over the scoring engine: submit task completions, review them, manage
//! roles and the task catalog, and roll seasons.

use std::path::PathBuf;

use anyhow::{Context, Result};
use aura_core::store::SqliteStore;
use aura_core::Engine;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;

/// aura - team task-points tracker
#[derive(Parser, Debug)]
#[command(name = "aura")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the ledger database
    #[arg(long, default_value = "aura.db")]
    data: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    // === Setup ===
    /// Initialize a fresh ledger: first season, config, admin user
    Init {
        /// Admin user ID
        admin_id: String,

        /// Admin display name
        #[arg(long, default_value = "Admin")]
        admin_name: String,
    },

    /// Register a user (no-op if the ID already exists)
    User {
        /// User ID
        id: String,

        /// Display name
        name: String,
    },

    // === Task catalog ===
    /// Task catalog management
    #[command(subcommand)]
    Task(commands::task::TaskCommand),

    // === Submissions ===
    /// Submit a task completion for review
    Submit {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Task ID
        task_id: String,

        /// Proof of completion (link or description)
        proof: String,
    },

    /// Withdraw a pending submission
    Withdraw {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Submission ID
        submission_id: String,
    },

    /// Review a pending submission (admin)
    Review {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Submission ID
        submission_id: String,

        /// Verdict
        #[arg(value_enum)]
        verdict: commands::submission::Verdict,

        /// Base score for reviewer-scored tasks
        #[arg(long, default_value_t = 0)]
        points: i64,
    },

    /// Re-review an already reviewed submission (admin)
    Correct {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Submission ID
        submission_id: String,

        /// New verdict
        #[arg(value_enum)]
        verdict: commands::submission::Verdict,

        /// New base score for reviewer-scored tasks
        #[arg(long, default_value_t = 0)]
        points: i64,
    },

    // === Roles ===
    /// Role registry management
    #[command(subcommand)]
    Role(commands::role::RoleCommand),

    /// Rebuild cached totals from the ledger
    Recompute {
        /// User to rebuild (omit with --role)
        user_id: Option<String>,

        /// Rebuild every holder of this role instead
        #[arg(long, conflicts_with = "user_id")]
        role: Option<String>,
    },

    // === Seasons ===
    /// Close the active season and open a new one (admin)
    Archive {
        /// Acting user ID
        #[arg(long = "as")]
        caller: String,

        /// Tag for the new season
        new_tag: String,
    },

    /// Show a season's standings
    Standings {
        /// Season tag (defaults to the active season)
        #[arg(long)]
        season: Option<String>,

        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },

    /// Season goal management
    #[command(subcommand)]
    Goal(commands::season::GoalCommand),

    /// List users at or above the season's lottery threshold
    Lottery {
        /// Machine-readable output
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let store = SqliteStore::open(&cli.data)
        .with_context(|| format!("failed to open ledger at {}", cli.data.display()))?;
    tracing::debug!(data = %cli.data.display(), "ledger opened");
    let engine = Engine::new(store);

    match cli.command {
        Commands::Init {
            admin_id,
            admin_name,
        } => commands::init::run(&engine, &admin_id, &admin_name),
        Commands::User { id, name } => commands::init::ensure_user(&engine, &id, &name),
        Commands::Task(cmd) => commands::task::run(&engine, cmd),
        Commands::Submit {
            caller,
            task_id,
            proof,
        } => commands::submission::submit(&engine, &caller, &task_id, &proof),
        Commands::Withdraw {
            caller,
            submission_id,
        } => commands::submission::withdraw(&engine, &caller, &submission_id),
        Commands::Review {
            caller,
            submission_id,
            verdict,
            points,
        } => commands::submission::review(&engine, &caller, &submission_id, verdict, points, false),
        Commands::Correct {
            caller,
            submission_id,
            verdict,
            points,
        } => commands::submission::review(&engine, &caller, &submission_id, verdict, points, true),
        Commands::Role(cmd) => commands::role::run(&engine, cmd),
        Commands::Recompute { user_id, role } => {
            commands::role::recompute(&engine, user_id.as_deref(), role.as_deref())
        },
        Commands::Archive { caller, new_tag } => {
            commands::season::archive(&engine, &caller, &new_tag)
        },
        Commands::Standings { season, json } => {
            commands::season::standings(&engine, season.as_deref(), json)
        },
        Commands::Goal(cmd) => commands::season::goal(&engine, cmd),
        Commands::Lottery { json } => commands::season::lottery(&engine, json),
    }
}
