//! Locale reference data
//!
//! Claims flow through the context rather than the update return value.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::store::repository::{countries, locales};
use crate::sync::{ModuleInitializer, RecordRef, SyncContext};

use super::type_tags;

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleFixture {
    pub code: String,
    pub country: String,
}

pub(crate) static FIXTURES: Lazy<Vec<LocaleFixture>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../fixtures/locales.json"))
        .expect("embedded locales fixture is valid JSON")
});

/// Seeds the `locales` table from the embedded fixture
pub struct LocalesInit;

impl LocalesInit {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleInitializer for LocalesInit {
    fn dependencies(&self) -> Vec<String> {
        vec!["countries".to_string()]
    }

    async fn update(&mut self, ctx: &mut SyncContext<'_>) -> Result<Vec<RecordRef>> {
        for fixture in FIXTURES.iter() {
            let country_id = countries::find_id_by_code(ctx.conn(), &fixture.country)
                .await?
                .with_context(|| {
                    format!(
                        "Locale {} references unknown country {}",
                        fixture.code, fixture.country
                    )
                })?;

            let id = locales::upsert(ctx.conn(), &fixture.code, country_id)
                .await
                .with_context(|| format!("Failed to upsert locale {}", fixture.code))?;
            ctx.claim(RecordRef::new(type_tags::LOCALE, id));
        }

        Ok(Vec::new())
    }
}
