//! Country reference data
//!
//! Depends on regions and currencies: a country row carries foreign keys to
//! both, so those tables must be synchronized first.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::store::repository::{countries, currencies, regions};
use crate::sync::{ModuleInitializer, RecordRef, SyncContext};

use super::type_tags;

#[derive(Debug, Clone, Deserialize)]
pub struct CountryFixture {
    pub code: String,
    pub name: String,
    pub region: String,
    pub currency: String,
}

pub(crate) static FIXTURES: Lazy<Vec<CountryFixture>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../fixtures/countries.json"))
        .expect("embedded countries fixture is valid JSON")
});

/// Seeds the `countries` table from the embedded fixture
pub struct CountriesInit;

impl CountriesInit {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleInitializer for CountriesInit {
    fn dependencies(&self) -> Vec<String> {
        vec!["regions".to_string(), "currencies".to_string()]
    }

    async fn update(&mut self, ctx: &mut SyncContext<'_>) -> Result<Vec<RecordRef>> {
        let mut claimed = Vec::with_capacity(FIXTURES.len());

        for fixture in FIXTURES.iter() {
            let region_id = regions::find_id_by_code(ctx.conn(), &fixture.region)
                .await?
                .with_context(|| {
                    format!(
                        "Country {} references unknown region {}",
                        fixture.code, fixture.region
                    )
                })?;
            let currency_id = currencies::find_id_by_code(ctx.conn(), &fixture.currency)
                .await?
                .with_context(|| {
                    format!(
                        "Country {} references unknown currency {}",
                        fixture.code, fixture.currency
                    )
                })?;

            let id = countries::upsert(
                ctx.conn(),
                &fixture.code,
                &fixture.name,
                region_id,
                currency_id,
            )
            .await
            .with_context(|| format!("Failed to upsert country {}", fixture.code))?;
            claimed.push(RecordRef::new(type_tags::COUNTRY, id));
        }

        Ok(claimed)
    }
}
