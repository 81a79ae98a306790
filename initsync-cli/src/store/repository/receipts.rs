//! Claim receipt repository
//!
//! The persisted ledger behind mark-and-sweep reconciliation: one row per
//! `(type_tag, object_id)` pair, stamped with the last run that claimed it.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use crate::sync::RecordRef;

/// One receipt per distinct `(type_tag, object_id)` pair ever claimed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub type_tag: String,
    pub object_id: i64,
    pub claimed_at: DateTime<Utc>,
}

/// Per-type summary of the persisted receipts
#[derive(Debug, Clone)]
pub struct ReceiptSummary {
    pub type_tag: String,
    pub count: i64,
    pub last_claimed_at: DateTime<Utc>,
}

/// Insert or refresh a receipt for every claimed record
pub async fn upsert_receipts(
    conn: &mut SqliteConnection,
    claimed: &HashSet<RecordRef>,
    now: DateTime<Utc>,
) -> Result<()> {
    for record in claimed {
        sqlx::query(
            "INSERT INTO claim_receipts (type_tag, object_id, claimed_at)
             VALUES (?, ?, ?)
             ON CONFLICT(type_tag, object_id)
             DO UPDATE SET claimed_at = excluded.claimed_at",
        )
        .bind(&record.type_tag)
        .bind(record.id)
        .bind(now)
        .execute(&mut *conn)
        .await
        .context("Failed to upsert claim receipt")?;
    }

    Ok(())
}

/// Receipts that were not refreshed by the pass stamped `now`
pub async fn stale_receipts(
    conn: &mut SqliteConnection,
    now: DateTime<Utc>,
) -> Result<Vec<ClaimReceipt>> {
    let rows: Vec<(String, i64, DateTime<Utc>)> = sqlx::query_as(
        "SELECT type_tag, object_id, claimed_at FROM claim_receipts
         WHERE claimed_at != ?
         ORDER BY type_tag, object_id",
    )
    .bind(now)
    .fetch_all(&mut *conn)
    .await
    .context("Failed to select stale claim receipts")?;

    Ok(rows
        .into_iter()
        .map(|(type_tag, object_id, claimed_at)| ClaimReceipt {
            type_tag,
            object_id,
            claimed_at,
        })
        .collect())
}

/// Delete one receipt by its conflict key
pub async fn delete_receipt(
    conn: &mut SqliteConnection,
    type_tag: &str,
    object_id: i64,
) -> Result<()> {
    sqlx::query("DELETE FROM claim_receipts WHERE type_tag = ? AND object_id = ?")
        .bind(type_tag)
        .bind(object_id)
        .execute(&mut *conn)
        .await
        .context("Failed to delete claim receipt")?;

    Ok(())
}

/// Summarize persisted receipts per type tag
pub async fn summarize_receipts(conn: &mut SqliteConnection) -> Result<Vec<ReceiptSummary>> {
    let rows: Vec<(String, i64, DateTime<Utc>)> = sqlx::query_as(
        "SELECT type_tag, COUNT(*), MAX(claimed_at) FROM claim_receipts
         GROUP BY type_tag
         ORDER BY type_tag",
    )
    .fetch_all(&mut *conn)
    .await
    .context("Failed to summarize claim receipts")?;

    Ok(rows
        .into_iter()
        .map(|(type_tag, count, last_claimed_at)| ReceiptSummary {
            type_tag,
            count,
            last_claimed_at,
        })
        .collect())
}
