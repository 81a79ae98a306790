//! Sync command handler

use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use crate::config::Config;
use crate::modules;
use crate::store;
use crate::sync::Updater;

/// Run the full synchronization pass, or a single module when `--module`
/// is given. Single-module runs skip reconciliation on purpose: only a
/// complete pass knows the full claim set.
pub async fn handle_sync(db_override: Option<PathBuf>, module: Option<String>) -> Result<()> {
    let config = Config::load(db_override)?;
    let pool = store::connect(&config.database_path).await?;
    store::migrations::apply(&pool).await?;

    let (registry, deleters) = modules::build_registries();
    let mut updater = Updater::new(pool.clone(), registry, deleters);

    match module {
        Some(name) => {
            updater.run_module(&name).await?;
            if updater.updated_count() == 0 {
                println!(
                    "{} no initializer registered for {}, nothing to do",
                    "-".yellow(),
                    name.cyan()
                );
            } else {
                println!("{} synchronized module {}", "✓".green(), name.cyan());
            }
        }
        None => {
            updater.run_all().await?;
            println!(
                "{} synchronized {} modules, {} records claimed",
                "✓".green(),
                updater.updated_count().to_string().cyan(),
                updater.claimed_count().to_string().cyan(),
            );
        }
    }

    pool.close().await;
    Ok(())
}
