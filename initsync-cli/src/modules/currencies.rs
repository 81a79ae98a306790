//! Currency reference data

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::store::repository::currencies;
use crate::sync::{ModuleInitializer, RecordRef, SyncContext};

use super::type_tags;

#[derive(Debug, Clone, Deserialize)]
pub struct CurrencyFixture {
    pub code: String,
    pub name: String,
    #[serde(default = "default_minor_units")]
    pub minor_units: i64,
}

fn default_minor_units() -> i64 {
    2
}

pub(crate) static FIXTURES: Lazy<Vec<CurrencyFixture>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../fixtures/currencies.json"))
        .expect("embedded currencies fixture is valid JSON")
});

/// Seeds the `currencies` table from the embedded fixture
pub struct CurrenciesInit;

impl CurrenciesInit {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleInitializer for CurrenciesInit {
    async fn update(&mut self, ctx: &mut SyncContext<'_>) -> Result<Vec<RecordRef>> {
        let mut claimed = Vec::with_capacity(FIXTURES.len());

        for fixture in FIXTURES.iter() {
            let id = currencies::upsert(
                ctx.conn(),
                &fixture.code,
                &fixture.name,
                fixture.minor_units,
            )
            .await
            .with_context(|| format!("Failed to upsert currency {}", fixture.code))?;
            claimed.push(RecordRef::new(type_tags::CURRENCY, id));
        }

        Ok(claimed)
    }
}
