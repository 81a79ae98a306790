//! Country rows

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use sqlx::SqliteConnection;

/// Insert or update a country by its ISO code, returning the row id
pub async fn upsert(
    conn: &mut SqliteConnection,
    code: &str,
    name: &str,
    region_id: i64,
    currency_id: i64,
) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO countries (code, name, region_id, currency_id)
         VALUES (?, ?, ?, ?)
         ON CONFLICT(code) DO UPDATE SET
             name = excluded.name,
             region_id = excluded.region_id,
             currency_id = excluded.currency_id
         RETURNING id",
    )
    .bind(code)
    .bind(name)
    .bind(region_id)
    .bind(currency_id)
    .fetch_one(&mut *conn)
    .await
    .context("Failed to upsert country")?;

    Ok(id)
}

/// Find a country id by its ISO code
pub async fn find_id_by_code(conn: &mut SqliteConnection, code: &str) -> Result<Option<i64>> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM countries WHERE code = ?")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to look up country")?;

    Ok(row.map(|(id,)| id))
}

/// Delete one country by id, within the caller's transaction
pub fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        sqlx::query("DELETE FROM countries WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .context("Failed to delete country")?;
        Ok(())
    })
}
