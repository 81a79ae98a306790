//! Region rows

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use sqlx::SqliteConnection;

/// Insert or update a region by its code, returning the row id
pub async fn upsert(conn: &mut SqliteConnection, code: &str, name: &str) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO regions (code, name)
         VALUES (?, ?)
         ON CONFLICT(code) DO UPDATE SET name = excluded.name
         RETURNING id",
    )
    .bind(code)
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .context("Failed to upsert region")?;

    Ok(id)
}

/// Find a region id by its code
pub async fn find_id_by_code(conn: &mut SqliteConnection, code: &str) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM regions WHERE code = ?")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to look up region")?;

    Ok(row.map(|(id,)| id))
}

/// Delete one region by id, within the caller's transaction
pub fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        sqlx::query("DELETE FROM regions WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .context("Failed to delete region")?;
        Ok(())
    })
}
