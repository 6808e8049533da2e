//! BotHub CLI
//!
//! Operator tool for the BotHub record store. Opens the store the same way
//! the website does (environment-selected backend), runs one command and
//! waits for its flush before exiting.

mod commands;

use anyhow::Result;
use bothub_store::{Database, StoreConfig};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "bothub")]
#[command(author, version, about = "BotHub - user and download records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Snapshot file (overrides BOTHUB_DB_PATH)
    #[arg(long, global = true, env = "BOTHUB_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every counter
    Stats,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Record a file download
    Download {
        /// Downloading user id
        #[arg(long)]
        user_id: Option<String>,

        /// Download type (rdx, c3c)
        #[arg(long = "type")]
        download_type: Option<String>,
    },

    /// Record a repository clone
    Clone,
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Add {
        username: String,
        email: String,
        password: String,
    },
    /// Look up a user by username, or by email if it contains '@'
    Find { identifier: String },
    /// Store a verification code for a user
    SetCode {
        user_id: String,
        code: String,
        /// Minutes until the code is considered expired
        #[arg(long, default_value_t = 15)]
        ttl_minutes: i64,
    },
    /// Check a verification code
    Verify { user_id: String, code: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "bothub=debug,bothub_store=debug"
        } else {
            "bothub=info,bothub_store=info"
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = StoreConfig::from_env();
    if let Some(path) = cli.db_path {
        config.snapshot_path = path;
    }

    let db = Database::open(&config).await;
    info!("Using {}", describe_backend(&db));

    let result = match cli.command {
        Commands::Stats => commands::stats::run(&db).await,
        Commands::User { action } => match action {
            UserAction::Add {
                username,
                email,
                password,
            } => commands::user::add(&db, &username, &email, &password).await,
            UserAction::Find { identifier } => commands::user::find(&db, &identifier).await,
            UserAction::SetCode {
                user_id,
                code,
                ttl_minutes,
            } => commands::user::set_code(&db, &user_id, &code, ttl_minutes).await,
            UserAction::Verify { user_id, code } => {
                commands::user::verify(&db, &user_id, &code).await
            }
        },
        Commands::Download {
            user_id,
            download_type,
        } => commands::counter::download(&db, user_id.as_deref(), download_type.as_deref()).await,
        Commands::Clone => commands::counter::clone(&db).await,
    };

    db.close().await;

    if let Err(ref e) = result {
        error!("Command failed: {}", e);
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}

fn describe_backend(db: &Database) -> String {
    db.backend_kind()
        .map(|k| k.to_string())
        .unwrap_or_else(|| "no backend".to_string())
}
