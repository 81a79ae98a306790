//! Module initializer contract

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqliteConnection;

use super::claim::RecordRef;

/// A named unit of idempotent data synchronization.
///
/// Implementations are instantiated fresh every time they are resolved and
/// hold no state across runs beyond whatever they persist in the store.
#[async_trait]
pub trait ModuleInitializer: Send {
    /// Names of modules that must be synchronized before this one, in order
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    /// Perform idempotent creation/update of this module's records.
    ///
    /// Records the module wants kept alive are claimed either by returning
    /// them or by calling [`SyncContext::claim`] while running; both
    /// channels are honored. Anything claimed in a previous run but in no
    /// channel of the current run becomes eligible for deletion.
    async fn update(&mut self, ctx: &mut SyncContext<'_>) -> Result<Vec<RecordRef>>;
}

/// Execution context handed to a module's `update`.
///
/// Borrows the transaction shared by the whole top-level module run, and
/// collects claims made imperatively during execution.
pub struct SyncContext<'a> {
    conn: &'a mut SqliteConnection,
    claimed: Vec<RecordRef>,
}

impl<'a> SyncContext<'a> {
    pub(crate) fn new(conn: &'a mut SqliteConnection) -> Self {
        Self {
            conn,
            claimed: Vec::new(),
        }
    }

    /// The connection for this module's transaction scope
    pub fn conn(&mut self) -> &mut SqliteConnection {
        self.conn
    }

    /// Claim a record outside the `update` return value
    pub fn claim(&mut self, record: RecordRef) {
        self.claimed.push(record);
    }

    pub(crate) fn into_claimed(self) -> Vec<RecordRef> {
        self.claimed
    }
}
