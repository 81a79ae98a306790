//! Execution driver: at-most-once module runs, dependency ordering,
//! claim accumulation, and the reconciliation hand-off

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use sqlx::{SqliteConnection, SqlitePool};

use super::claim::RecordRef;
use super::module::SyncContext;
use super::reconciler;
use super::registry::{DeleterRegistry, ModuleFactory, ModuleRegistry};
use super::resolver;

/// Drives module synchronization for one run.
///
/// All caches live on the instance and last exactly one synchronization
/// run; nothing is shared between runs or processes. The updater assumes a
/// single run executes to completion before another begins.
pub struct Updater {
    pool: SqlitePool,
    registry: ModuleRegistry,
    deleters: DeleterRegistry,
    /// Modules already executed during this run
    updated_modules: HashSet<String>,
    /// Factory lookups already performed, including negative results
    loaded_modules: HashMap<String, Option<ModuleFactory>>,
    /// Records claimed so far, across every module executed this run
    claimed: HashSet<RecordRef>,
}

impl Updater {
    pub fn new(pool: SqlitePool, registry: ModuleRegistry, deleters: DeleterRegistry) -> Self {
        Self {
            pool,
            registry,
            deleters,
            updated_modules: HashSet::new(),
            loaded_modules: HashMap::new(),
            claimed: HashSet::new(),
        }
    }

    /// Number of modules executed so far this run
    pub fn updated_count(&self) -> usize {
        self.updated_modules.len()
    }

    /// Number of distinct records claimed so far this run
    pub fn claimed_count(&self) -> usize {
        self.claimed.len()
    }

    /// Look up a module's factory, caching positive and negative results
    fn load_module(&mut self, name: &str) -> Option<ModuleFactory> {
        if let Some(cached) = self.loaded_modules.get(name) {
            return cached.clone();
        }

        let factory = self.registry.get(name);
        if factory.is_some() {
            log::debug!("loaded module {name}");
        }
        self.loaded_modules.insert(name.to_string(), factory.clone());
        factory
    }

    /// Synchronize one module and, transitively, its dependencies.
    ///
    /// The module's own logic and its whole dependency chain run inside a
    /// single transaction; a failure anywhere rolls the run back. A name
    /// with no registered initializer is a silent no-op: only missing
    /// *dependencies* are fatal, and those surface from the resolver.
    pub async fn run_module(&mut self, name: &str) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin module transaction")?;

        self.run_module_inner(name.to_string(), &mut tx).await?;

        tx.commit()
            .await
            .context("Failed to commit module transaction")?;
        Ok(())
    }

    fn run_module_inner<'a>(
        &'a mut self,
        name: String,
        conn: &'a mut SqliteConnection,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            // at-most-once per run, no matter how many dependents ask
            if self.updated_modules.contains(&name) {
                return Ok(());
            }

            let Some(factory) = self.load_module(&name) else {
                log::debug!("no initializer registered for {name}, skipping");
                return Ok(());
            };

            log::debug!("checking dependencies for {name}");
            let dependencies = resolver::resolve(&self.registry, &name, &[name.clone()])?;

            for dependency in dependencies {
                self.run_module_inner(dependency, conn).await?;
            }

            log::info!("updating module {name}");

            let mut initializer = factory();
            let mut ctx = SyncContext::new(conn);
            let returned = initializer
                .update(&mut ctx)
                .await
                .with_context(|| format!("Module {name} failed to update"))?;

            self.claimed.extend(returned);
            self.claimed.extend(ctx.into_claimed());

            self.updated_modules.insert(name);
            Ok(())
        }
        .boxed()
    }

    /// Synchronize every registered module in registration order, then
    /// reconcile claimed records exactly once.
    pub async fn run_all(&mut self) -> Result<()> {
        let names: Vec<String> = self.registry.names().to_vec();
        for name in names {
            self.run_module(&name).await?;
        }

        // Reconciliation gets its own transaction: a failure here never
        // rolls back module updates that already committed.
        let now = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin reconciliation transaction")?;
        reconciler::reconcile(&mut tx, &self.deleters, &self.claimed, now).await?;
        tx.commit()
            .await
            .context("Failed to commit reconciliation transaction")?;

        Ok(())
    }
}
