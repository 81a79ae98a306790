//! Status command handler

use std::path::PathBuf;

use anyhow::Result;
use colored::*;

use crate::config::Config;
use crate::store;
use crate::store::repository::receipts;

/// Print a per-type summary of the persisted claim receipts
pub async fn handle_status(db_override: Option<PathBuf>) -> Result<()> {
    let config = Config::load(db_override)?;
    let pool = store::connect(&config.database_path).await?;
    store::migrations::apply(&pool).await?;

    let mut conn = pool.acquire().await?;
    let summaries = receipts::summarize_receipts(&mut conn).await?;
    drop(conn);

    if summaries.is_empty() {
        println!("no claim receipts recorded yet");
    } else {
        println!("{:<16} {:>7}  last claimed", "type".bold(), "count".bold());
        for summary in &summaries {
            println!(
                "{:<16} {:>7}  {}",
                summary.type_tag.cyan(),
                summary.count,
                summary.last_claimed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            );
        }
    }

    pool.close().await;
    Ok(())
}
