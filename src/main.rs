//! Cardwatch - classification-and-dispatch engine for profile cards
//!
//! Main entry point: loads configuration, opens the card store, wires
//! the engine to its feed-facing collaborators, and runs the event loop
//! alongside the operator console.

use cardwatch_core::{App, LogNotifier, LoggingFeed, Settings, SqliteStore};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Database filename used by pre-0.2 releases; honored when present so
/// existing classification state is not silently abandoned
const LEGACY_DATABASE_PATH: &str = "profiles.db";

#[derive(Parser)]
#[command(name = "cardwatch", version, about = "Profile-card triage for a live chat feed")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file (defaults to ./cardwatch.toml)
    #[arg(long, global = true, env = "CARDWATCH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the engine and the operator console (default)
    Run {
        /// Override the configured database path
        #[arg(long, env = "CARDWATCH_DB_PATH")]
        db_path: Option<String>,
    },
    /// Load and print the effective configuration, then exit
    CheckConfig,
}

/// Pick the database path: CLI/env override, then legacy file if one
/// exists alongside the default, then the configured path
fn resolve_db_path(settings: &Settings, override_path: Option<String>) -> String {
    if let Some(path) = override_path {
        return path;
    }

    if settings.database_path == Settings::default().database_path
        && Path::new(LEGACY_DATABASE_PATH).is_file()
    {
        warn!(
            "Found legacy database {}, using it instead of {}",
            LEGACY_DATABASE_PATH, settings.database_path
        );
        return LEGACY_DATABASE_PATH.to_string();
    }

    settings.database_path.clone()
}

async fn run(settings: Settings, db_path: Option<String>) -> anyhow::Result<()> {
    let db_path = resolve_db_path(&settings, db_path);
    let store = Arc::new(SqliteStore::open(&db_path)?);

    // The real chat transport is an external collaborator; until one is
    // wired in, outbound traffic goes to the log.
    let feed = Arc::new(LoggingFeed);
    let notifier = Arc::new(LogNotifier);

    let mut app = App::new(&settings, store, feed, notifier);
    let (tx, rx) = App::channel();

    let console = tokio::task::spawn_blocking(move || {
        cardwatch_core::console::run_reader(tx);
    });

    app.run(rx).await;

    console.await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::CheckConfig) => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        Some(Commands::Run { db_path }) => run(settings, db_path).await,
        None => {
            info!("No subcommand given, running the engine");
            run(settings, None).await
        }
    }
}
