//! Error types for the synchronization engine

use std::fmt;

/// Fatal errors raised while resolving the module dependency graph.
///
/// Module update failures are not represented here; they propagate as-is
/// and abort the enclosing module transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A declared dependency has no registered initializer
    MissingModule { name: String },
    /// A module transitively depends on itself. `chain` is the full
    /// resolution path, ending with the module that reappeared.
    CircularDependency { chain: Vec<String> },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::MissingModule { name } => {
                write!(
                    f,
                    "missing dependency {name}: no initializer is registered under that name"
                )
            }
            SyncError::CircularDependency { chain } => {
                write!(f, "circular dependency detected: {}", chain.join(" -> "))
            }
        }
    }
}

impl std::error::Error for SyncError {}
