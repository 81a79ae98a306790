//! Region reference data

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::store::repository::regions;
use crate::sync::{ModuleInitializer, RecordRef, SyncContext};

use super::type_tags;

#[derive(Debug, Clone, Deserialize)]
pub struct RegionFixture {
    pub code: String,
    pub name: String,
}

pub(crate) static FIXTURES: Lazy<Vec<RegionFixture>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../fixtures/regions.json"))
        .expect("embedded regions fixture is valid JSON")
});

/// Seeds the `regions` table from the embedded fixture
pub struct RegionsInit;

impl RegionsInit {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModuleInitializer for RegionsInit {
    async fn update(&mut self, ctx: &mut SyncContext<'_>) -> Result<Vec<RecordRef>> {
        let mut claimed = Vec::with_capacity(FIXTURES.len());

        for fixture in FIXTURES.iter() {
            let id = regions::upsert(ctx.conn(), &fixture.code, &fixture.name)
                .await
                .with_context(|| format!("Failed to upsert region {}", fixture.code))?;
            claimed.push(RecordRef::new(type_tags::REGION, id));
        }

        Ok(claimed)
    }
}
