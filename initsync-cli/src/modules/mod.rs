//! Initial data modules shipped with this deployment
//!
//! Each module idempotently upserts one slice of reference data and claims
//! every record it wants kept. Claims drive mark-and-sweep: drop a row from
//! a fixture and the next full run deletes it from the store.

pub mod countries;
pub mod currencies;
pub mod locales;
pub mod regions;

use crate::store::repository;
use crate::sync::{DeleterRegistry, ModuleRegistry};

/// Claim type tags, one per domain table
pub mod type_tags {
    pub const REGION: &str = "region";
    pub const CURRENCY: &str = "currency";
    pub const COUNTRY: &str = "country";
    pub const LOCALE: &str = "locale";
}

/// Build the registries for this deployment: every module the binary knows
/// about, and a deleter per claimable record type.
pub fn build_registries() -> (ModuleRegistry, DeleterRegistry) {
    let mut registry = ModuleRegistry::new();
    registry.register("regions", regions::RegionsInit::new);
    registry.register("currencies", currencies::CurrenciesInit::new);
    registry.register("countries", countries::CountriesInit::new);
    registry.register("locales", locales::LocalesInit::new);

    let mut deleters = DeleterRegistry::new();
    deleters.register(type_tags::REGION, repository::regions::delete_by_id);
    deleters.register(type_tags::CURRENCY, repository::currencies::delete_by_id);
    deleters.register(type_tags::COUNTRY, repository::countries::delete_by_id);
    deleters.register(type_tags::LOCALE, repository::locales::delete_by_id);

    (registry, deleters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store;
    use crate::sync::{Updater, resolver};

    #[test]
    fn builtin_registry_is_acyclic() {
        let (registry, _deleters) = build_registries();
        for name in registry.names() {
            resolver::resolve(&registry, name, &[name.clone()]).unwrap();
        }
    }

    #[tokio::test]
    async fn full_run_seeds_and_claims_every_fixture_row() {
        let pool = store::connect_in_memory().await.unwrap();
        store::migrations::apply(&pool).await.unwrap();

        let (registry, deleters) = build_registries();
        let mut updater = Updater::new(pool.clone(), registry, deleters);
        updater.run_all().await.unwrap();

        assert_eq!(updater.updated_count(), 4);

        for (table, expected) in [
            ("regions", regions::FIXTURES.len()),
            ("currencies", currencies::FIXTURES.len()),
            ("countries", countries::FIXTURES.len()),
            ("locales", locales::FIXTURES.len()),
        ] {
            let (count,): (i64,) =
                sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
                    .fetch_one(&pool)
                    .await
                    .unwrap();
            assert_eq!(count as usize, expected, "unexpected row count in {table}");
        }

        let (receipts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM claim_receipts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(receipts as usize, updater.claimed_count());
    }

    #[tokio::test]
    async fn second_full_run_is_idempotent() {
        let pool = store::connect_in_memory().await.unwrap();
        store::migrations::apply(&pool).await.unwrap();

        let (registry, deleters) = build_registries();
        let mut updater = Updater::new(pool.clone(), registry, deleters);
        updater.run_all().await.unwrap();
        let first_claims = updater.claimed_count();

        // a fresh updater models a fresh process
        let (registry, deleters) = build_registries();
        let mut updater = Updater::new(pool.clone(), registry, deleters);
        updater.run_all().await.unwrap();

        assert_eq!(updater.claimed_count(), first_claims);

        let (receipts,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM claim_receipts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(receipts as usize, first_claims);

        let (currencies_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM currencies")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(currencies_count as usize, currencies::FIXTURES.len());
    }
}
