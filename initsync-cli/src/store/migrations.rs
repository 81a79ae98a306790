//! Versioned schema migrations, applied at startup
//!
//! Plain forward-only migrations: a `schema_version` table records what has
//! run, and anything newer is applied in order inside its own transaction.

use anyhow::{Context, Result};
use sqlx::SqlitePool;

struct Migration {
    version: i64,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "claim receipts",
        sql: "
            CREATE TABLE claim_receipts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type_tag TEXT NOT NULL,
                object_id INTEGER NOT NULL,
                claimed_at TEXT NOT NULL,
                UNIQUE (type_tag, object_id)
            );
        ",
    },
    Migration {
        version: 2,
        description: "reference data tables",
        sql: "
            CREATE TABLE regions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL
            );

            CREATE TABLE currencies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                minor_units INTEGER NOT NULL DEFAULT 2
            );

            CREATE TABLE countries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                region_id INTEGER NOT NULL REFERENCES regions (id) ON DELETE RESTRICT,
                currency_id INTEGER NOT NULL REFERENCES currencies (id) ON DELETE RESTRICT
            );

            CREATE TABLE locales (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                code TEXT NOT NULL UNIQUE,
                country_id INTEGER NOT NULL REFERENCES countries (id) ON DELETE CASCADE
            );
        ",
    },
];

/// Apply every migration that has not yet run
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at TEXT NOT NULL DEFAULT (datetime('now'))
         )",
    )
    .execute(pool)
    .await
    .context("Failed to create schema_version table")?;

    let (current,): (Option<i64>,) = sqlx::query_as("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await
        .context("Failed to read schema version")?;
    let current = current.unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }

        log::info!(
            "applying migration {}: {}",
            migration.version,
            migration.description
        );

        let mut tx = pool
            .begin()
            .await
            .context("Failed to begin migration transaction")?;
        sqlx::raw_sql(migration.sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Migration {} failed", migration.version))?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(migration.version)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to record migration {}", migration.version))?;
        tx.commit()
            .await
            .with_context(|| format!("Failed to commit migration {}", migration.version))?;
    }

    Ok(())
}
