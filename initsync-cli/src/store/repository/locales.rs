//! Locale rows

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use sqlx::SqliteConnection;

/// Insert or update a locale by its code, returning the row id
pub async fn upsert(conn: &mut SqliteConnection, code: &str, country_id: i64) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO locales (code, country_id)
         VALUES (?, ?)
         ON CONFLICT(code) DO UPDATE SET country_id = excluded.country_id
         RETURNING id",
    )
    .bind(code)
    .bind(country_id)
    .fetch_one(&mut *conn)
    .await
    .context("Failed to upsert locale")?;

    Ok(id)
}

/// Delete one locale by id, within the caller's transaction
pub fn delete_by_id(conn: &mut SqliteConnection, id: i64) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        sqlx::query("DELETE FROM locales WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await
            .context("Failed to delete locale")?;
        Ok(())
    })
}
