//! initsync: dependency-ordered initial data synchronization
//!
//! Modules declare what records should exist and which modules must run
//! first; the engine runs each module at most once per pass with its
//! dependencies strictly before it, then deletes records that previous
//! passes claimed but the current one did not.

mod cli;
mod config;
mod modules;
mod store;
mod sync;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // --verbose raises the default filter; an explicit RUST_LOG still wins
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    cli::dispatch(cli).await
}
