//! Command-line interface definitions and dispatch

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "initsync",
    version,
    about = "Dependency-ordered initial data synchronization for a local SQLite store"
)]
pub struct Cli {
    /// Show which modules are being loaded and updated
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Path to the SQLite database (overrides config file and environment)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize initial data for every registered module
    Sync {
        /// Synchronize a single module instead (skips reconciliation)
        #[arg(long)]
        module: Option<String>,
    },
    /// Validate the module dependency graph without touching the database
    Check {
        /// Check a single module instead of the whole registry
        #[arg(long)]
        module: Option<String>,
    },
    /// Show persisted claim receipts grouped by record type
    Status,
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Sync { module } => commands::sync::handle_sync(cli.db, module).await,
        Commands::Check { module } => commands::check::handle_check(module),
        Commands::Status => commands::status::handle_status(cli.db).await,
    }
}
