//! Mark-and-sweep reconciliation of claimed records
//!
//! Every full run stamps a receipt per claimed record. Receipts that were
//! not re-stamped belong to records nobody wants anymore; those records are
//! deleted best-effort and their receipts dropped.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::claim::RecordRef;
use super::registry::DeleterRegistry;
use crate::store::repository::receipts;

/// Reconcile the set of currently claimed records against persisted
/// receipts, stamping this pass with `now`.
///
/// Domain-record deletion is best effort: a record that is already gone,
/// has no registered deleter, or is protected by a foreign key stays in
/// place, but its stale receipt is dropped regardless. A receipt only
/// exists to remember the previous run's claims; keeping one around for an
/// undeletable record would wedge reconciliation forever.
pub async fn reconcile(
    conn: &mut SqliteConnection,
    deleters: &DeleterRegistry,
    claimed: &HashSet<RecordRef>,
    now: DateTime<Utc>,
) -> Result<()> {
    receipts::upsert_receipts(&mut *conn, claimed, now).await?;

    let stale = receipts::stale_receipts(&mut *conn, now).await?;
    for receipt in stale {
        log::debug!(
            "sweeping {}:{} (last claimed {})",
            receipt.type_tag,
            receipt.object_id,
            receipt.claimed_at
        );

        match deleters.get(&receipt.type_tag) {
            Some(delete) => {
                if let Err(err) = delete(&mut *conn, receipt.object_id).await {
                    log::debug!(
                        "could not delete {}:{}: {err:#}",
                        receipt.type_tag,
                        receipt.object_id
                    );
                }
            }
            None => {
                log::debug!(
                    "no deleter registered for type tag {}, dropping receipt only",
                    receipt.type_tag
                );
            }
        }

        receipts::delete_receipt(&mut *conn, &receipt.type_tag, receipt.object_id).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use sqlx::SqlitePool;

    use crate::store;
    use crate::store::repository::currencies;
    use crate::store::repository::receipts::ClaimReceipt;
    use crate::store::repository::regions;

    async fn migrated_pool() -> SqlitePool {
        let pool = store::connect_in_memory().await.unwrap();
        store::migrations::apply(&pool).await.unwrap();
        pool
    }

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    fn claims(refs: &[RecordRef]) -> HashSet<RecordRef> {
        refs.iter().cloned().collect()
    }

    async fn all_receipts(pool: &SqlitePool) -> Vec<ClaimReceipt> {
        let rows: Vec<(String, i64, DateTime<Utc>)> = sqlx::query_as(
            "SELECT type_tag, object_id, claimed_at FROM claim_receipts
             ORDER BY type_tag, object_id",
        )
        .fetch_all(pool)
        .await
        .unwrap();
        rows.into_iter()
            .map(|(type_tag, object_id, claimed_at)| ClaimReceipt {
                type_tag,
                object_id,
                claimed_at,
            })
            .collect()
    }

    async fn currency_count(pool: &SqlitePool) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM currencies")
            .fetch_one(pool)
            .await
            .unwrap();
        count
    }

    fn currency_deleters() -> DeleterRegistry {
        let mut deleters = DeleterRegistry::new();
        deleters.register("currency", currencies::delete_by_id);
        deleters
    }

    #[tokio::test]
    async fn empty_claim_set_with_no_receipts_is_a_no_op() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        reconcile(
            &mut conn,
            &DeleterRegistry::new(),
            &HashSet::new(),
            at(2026, 8, 1, 0),
        )
        .await
        .unwrap();
        drop(conn);

        assert!(all_receipts(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn first_claim_creates_a_stamped_receipt() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = currencies::upsert(&mut conn, "XTS", "Test Currency", 2)
            .await
            .unwrap();

        let t1 = at(2026, 8, 1, 0);
        reconcile(
            &mut conn,
            &currency_deleters(),
            &claims(&[RecordRef::new("currency", id)]),
            t1,
        )
        .await
        .unwrap();
        drop(conn);

        let receipts = all_receipts(&pool).await;
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].type_tag, "currency");
        assert_eq!(receipts[0].object_id, id);
        assert_eq!(receipts[0].claimed_at, t1);
        assert_eq!(currency_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn reclaiming_refreshes_the_receipt_and_keeps_the_record() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = currencies::upsert(&mut conn, "XTS", "Test Currency", 2)
            .await
            .unwrap();

        let wanted = claims(&[RecordRef::new("currency", id)]);
        reconcile(&mut conn, &currency_deleters(), &wanted, at(2026, 8, 1, 0))
            .await
            .unwrap();
        let t2 = at(2026, 8, 2, 0);
        reconcile(&mut conn, &currency_deleters(), &wanted, t2)
            .await
            .unwrap();
        drop(conn);

        let receipts = all_receipts(&pool).await;
        assert_eq!(receipts.len(), 1);
        assert_eq!(receipts[0].claimed_at, t2);
        assert_eq!(currency_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn unclaimed_record_is_deleted_along_with_its_receipt() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = currencies::upsert(&mut conn, "XTS", "Test Currency", 2)
            .await
            .unwrap();

        reconcile(
            &mut conn,
            &currency_deleters(),
            &claims(&[RecordRef::new("currency", id)]),
            at(2026, 8, 1, 0),
        )
        .await
        .unwrap();
        reconcile(
            &mut conn,
            &currency_deleters(),
            &HashSet::new(),
            at(2026, 8, 2, 0),
        )
        .await
        .unwrap();
        drop(conn);

        assert!(all_receipts(&pool).await.is_empty());
        assert_eq!(currency_count(&pool).await, 0);
    }

    #[tokio::test]
    async fn alias_tags_produce_one_receipt_each() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = currencies::upsert(&mut conn, "XTS", "Test Currency", 2)
            .await
            .unwrap();

        reconcile(
            &mut conn,
            &currency_deleters(),
            &claims(&[
                RecordRef::new("currency", id),
                RecordRef::new("legacy_currency", id),
            ]),
            at(2026, 8, 1, 0),
        )
        .await
        .unwrap();
        drop(conn);

        let receipts = all_receipts(&pool).await;
        assert_eq!(receipts.len(), 2);
        assert_eq!(receipts[0].type_tag, "currency");
        assert_eq!(receipts[1].type_tag, "legacy_currency");
    }

    #[tokio::test]
    async fn already_deleted_record_still_loses_its_receipt() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let id = currencies::upsert(&mut conn, "XTS", "Test Currency", 2)
            .await
            .unwrap();

        reconcile(
            &mut conn,
            &currency_deleters(),
            &claims(&[RecordRef::new("currency", id)]),
            at(2026, 8, 1, 0),
        )
        .await
        .unwrap();

        sqlx::query("DELETE FROM currencies WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await
            .unwrap();

        reconcile(
            &mut conn,
            &currency_deleters(),
            &HashSet::new(),
            at(2026, 8, 2, 0),
        )
        .await
        .unwrap();
        drop(conn);

        assert!(all_receipts(&pool).await.is_empty());
    }

    #[tokio::test]
    async fn protected_record_survives_but_its_receipt_does_not() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        // a region referenced by a country cannot be deleted
        let region_id = regions::upsert(&mut conn, "EMEA", "Europe, Middle East & Africa")
            .await
            .unwrap();
        let currency_id = currencies::upsert(&mut conn, "EUR", "Euro", 2).await.unwrap();
        let country_id = crate::store::repository::countries::upsert(
            &mut conn,
            "NL",
            "Netherlands",
            region_id,
            currency_id,
        )
        .await
        .unwrap();

        let mut deleters = currency_deleters();
        deleters.register("region", regions::delete_by_id);
        deleters.register("country", crate::store::repository::countries::delete_by_id);

        reconcile(
            &mut conn,
            &deleters,
            &claims(&[
                RecordRef::new("region", region_id),
                RecordRef::new("currency", currency_id),
                RecordRef::new("country", country_id),
            ]),
            at(2026, 8, 1, 0),
        )
        .await
        .unwrap();

        // stop claiming the region while the country still references it
        let t2 = at(2026, 8, 2, 0);
        reconcile(
            &mut conn,
            &deleters,
            &claims(&[
                RecordRef::new("currency", currency_id),
                RecordRef::new("country", country_id),
            ]),
            t2,
        )
        .await
        .unwrap();
        drop(conn);

        let (region_rows,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM regions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(region_rows, 1);

        let receipts = all_receipts(&pool).await;
        assert_eq!(receipts.len(), 2);
        assert!(receipts.iter().all(|r| r.type_tag != "region"));
        assert!(receipts.iter().all(|r| r.claimed_at == t2));
    }

    #[tokio::test]
    async fn missing_deleter_drops_the_receipt_without_error() {
        let pool = migrated_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        reconcile(
            &mut conn,
            &DeleterRegistry::new(),
            &claims(&[RecordRef::new("unknown_kind", 42)]),
            at(2026, 8, 1, 0),
        )
        .await
        .unwrap();
        reconcile(
            &mut conn,
            &DeleterRegistry::new(),
            &HashSet::new(),
            at(2026, 8, 2, 0),
        )
        .await
        .unwrap();
        drop(conn);

        assert!(all_receipts(&pool).await.is_empty());
    }
}
