//! Currency rows

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use sqlx::SqliteConnection;

/// Insert or update a currency by its ISO code, returning the row id
pub async fn upsert(
    conn: &mut SqliteConnection,
    code: &str,
    name: &str,
    minor_units: i64,
) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO currencies (code, name, minor_units)
         VALUES (?, ?, ?)
         ON CONFLICT(code) DO UPDATE SET
             name = excluded.name,
             minor_units = excluded.minor_units
         RETURNING id",
    )
    .bind(code)
    .bind(name)
    .bind(minor_units)
    .fetch_one(&mut *conn)
    .await
    .context("Failed to upsert currency")?;

    Ok(id)
}

/// Find a currency id by its ISO code
pub async fn find_id_by_code(conn: &mut SqliteConnection, code: &str) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM currencies WHERE code = ?")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to look up currency")?;

    Ok(row.map(|(id,)| id))
}

/// Delete one currency by id, within the caller's transaction
pub fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        sqlx::query("DELETE FROM currencies WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .context("Failed to delete currency")?;
        Ok(())
    })
}
