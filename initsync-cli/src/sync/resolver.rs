//! Dependency resolution: cycle detection and ordering
//!
//! Resolution validates deep but returns shallow: a call checks its whole
//! branch for cycles and missing modules, then hands back only the direct
//! dependency list. The caller runs each returned dependency, and that run
//! resolves its own sub-dependencies in turn.

use super::error::SyncError;
use super::registry::ModuleRegistry;

/// Resolve the direct dependencies of `name`, validating the branch
/// depth-first in declaration order.
///
/// `call_chain` is the path of modules already being resolved, starting
/// with the root. The first dependency already present on the path wins:
/// the error carries `call_chain` plus the repeated module appended, so a
/// caller can render the complete cycle.
pub fn resolve(
    registry: &ModuleRegistry,
    name: &str,
    call_chain: &[String],
) -> Result<Vec<String>, SyncError> {
    let factory = registry.get(name).ok_or_else(|| SyncError::MissingModule {
        name: name.to_string(),
    })?;

    let dependencies = factory().dependencies();

    for dependency in &dependencies {
        let mut chain = call_chain.to_vec();
        chain.push(dependency.clone());

        if call_chain.iter().any(|visited| visited == dependency) {
            return Err(SyncError::CircularDependency { chain });
        }

        resolve(registry, dependency, &chain)?;
    }

    Ok(dependencies)
}
