//! Static registries populated at process start
//!
//! Module lookup is an explicit name -> factory mapping rather than any kind
//! of runtime reflection; likewise record deletion is an explicit type tag ->
//! capability mapping consulted by the reconciler.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use sqlx::SqliteConnection;

use super::module::ModuleInitializer;

/// Constructs a fresh initializer instance each time a module is resolved
pub type ModuleFactory = Arc<dyn Fn() -> Box<dyn ModuleInitializer> + Send + Sync>;

/// Registration-ordered mapping from module name to initializer factory.
#[derive(Default)]
pub struct ModuleRegistry {
    order: Vec<String>,
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an initializer factory under a module name.
    ///
    /// Registration order is the order `run_all` visits modules.
    /// Re-registering a name replaces its factory but keeps its position.
    pub fn register<F, M>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> M + Send + Sync + 'static,
        M: ModuleInitializer + 'static,
    {
        if !self.factories.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.factories
            .insert(name.to_string(), Arc::new(move || Box::new(factory())));
    }

    /// Look up the factory for a module name
    pub fn get(&self, name: &str) -> Option<ModuleFactory> {
        self.factories.get(name).cloned()
    }

    /// All registered module names, in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

/// Deletes one record of a given type by id, within the caller's transaction
pub type DeleteFn = for<'a> fn(&'a mut SqliteConnection, i64) -> BoxFuture<'a, Result<()>>;

/// Mapping from claim type tag to the capability that deletes such records.
#[derive(Default)]
pub struct DeleterRegistry {
    deleters: HashMap<String, DeleteFn>,
}

impl DeleterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, type_tag: &str, delete: DeleteFn) {
        self.deleters.insert(type_tag.to_string(), delete);
    }

    pub fn get(&self, type_tag: &str) -> Option<DeleteFn> {
        self.deleters.get(type_tag).copied()
    }
}
