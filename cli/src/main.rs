mod config;

use anyhow::{Context, Result};
use chirp_core::compose::{clean_message, compose_intro, ReplyComposer};
use chirp_core::lifecycle::{FavoriteLifecycle, FavoriteOutcome};
use chirp_core::models::FavoriteRecord;
use chirp_core::storage::{Database, SqliteFavoriteStore};
use chrono::{SubsecRound, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{load_config, Config};

/// Engagement bot: reply composition and favorite bookkeeping
#[derive(Parser, Debug)]
#[command(name = "chirp", version, about)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = "chirp.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the favorites database
    Init,
    /// Favorite an item unless it already has an active favorite
    Favorite {
        item_id: String,
        #[arg(long)]
        actor_id: i64,
        #[arg(long)]
        actor_name: String,
        #[arg(long, default_value = "")]
        status: String,
    },
    /// List favorites that are due to be reversed
    Candidates {
        #[arg(long)]
        json: bool,
    },
    /// Unfavorite every due favorite
    Sweep,
    /// Show every favorite recorded for an item
    History {
        item_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Compose a reply for a classified intent
    Reply {
        #[arg(long)]
        intent: String,
        #[arg(long)]
        confidence: f64,
        #[arg(long)]
        handle: String,
        /// Treat the actor as already followed back
        #[arg(long)]
        following: bool,
    },
    /// Print message text as it is sent to the classifier
    Clean { text: Vec<String> },
    /// Print an opening remark
    Intro,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("chirp_core={0},chirp={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli.command, &config)
}

fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Init => {
            let db = database(config);
            let conn = db.create()
                .with_context(|| format!("Failed to create database {}", db.path().display()))?;
            println!("Database ready at {} (schema version {})", db.path().display(), db.get_schema_version(&conn)?);
        }
        Command::Favorite { item_id, actor_id, actor_name, status } => {
            let mut lifecycle = open_lifecycle(config)?;
            match lifecycle.try_favorite(&item_id, actor_id, &actor_name, &status)? {
                FavoriteOutcome::Created(record) => {
                    println!("Favorited {} (id {})", record.item_id, record.id.unwrap_or_default());
                }
                FavoriteOutcome::AlreadyFavorited => println!("{} is already favorited", item_id),
            }
        }
        Command::Candidates { json } => {
            let lifecycle = open_lifecycle(config)?;
            let due = config.due_before(Utc::now().trunc_subsecs(0))?;
            let candidates = lifecycle.schedule_unfavorite_candidates(due, config.sweep_limit)?;
            print_records(&candidates, json)?;
        }
        Command::Sweep => {
            let mut lifecycle = open_lifecycle(config)?;
            let now = Utc::now().trunc_subsecs(0);
            let report = lifecycle.sweep(config.due_before(now)?, config.sweep_limit, now)?;
            for record in &report.unfavorited {
                println!("Unfavorited {}", record.item_id);
            }
            println!("{} unfavorited, {} skipped", report.unfavorited.len(), report.failed.len());
        }
        Command::History { item_id, json } => {
            let lifecycle = open_lifecycle(config)?;
            print_records(&lifecycle.history(&item_id)?, json)?;
        }
        Command::Reply { intent, confidence, handle, following } => {
            let follow_check = move |_: &str| -> chirp_core::Result<bool> { Ok(following) };
            let mut composer = ReplyComposer::from_entropy(follow_check);
            let reply = composer.compose(&intent, confidence, &handle);
            if reply.composed {
                println!("{}", reply.text);
            } else {
                tracing::info!(intent = %intent, confidence, "No reply composed");
            }
        }
        Command::Clean { text } => println!("{}", clean_message(&text.join(" "))),
        Command::Intro => println!("{}", compose_intro(&mut rand::thread_rng())),
    }

    Ok(())
}

fn database(config: &Config) -> Database {
    Database::new(&config.database_path).with_busy_timeout(config.busy_timeout())
}

fn open_lifecycle(config: &Config) -> Result<FavoriteLifecycle<SqliteFavoriteStore>> {
    let db = database(config);
    let conn = db.get_or_create()
        .with_context(|| format!("Failed to open database {}", db.path().display()))?;
    Ok(FavoriteLifecycle::new(SqliteFavoriteStore::new(conn)))
}

fn print_records(records: &[FavoriteRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    for record in records {
        println!(
            "{:>6}  {:<20}  @{:<16}  {:<11}  favorited {}  last action {}",
            record.id.unwrap_or_default(),
            record.item_id,
            record.actor_name,
            record.state().to_string(),
            record.favorited_at.format("%Y-%m-%d %H:%M:%S"),
            record.last_action_at.format("%Y-%m-%d %H:%M:%S"),
        );
    }
    Ok(())
}
