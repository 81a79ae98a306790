//! Check command handler: dependency graph validation without execution

use anyhow::Result;
use colored::*;

use crate::modules;
use crate::sync::{SyncError, resolver};

/// Resolve every module (or a single one) without running anything and
/// report cycles or missing dependencies.
pub fn handle_check(module: Option<String>) -> Result<()> {
    let (registry, _deleters) = modules::build_registries();

    let targets: Vec<String> = match module {
        Some(name) => vec![name],
        None => registry.names().to_vec(),
    };

    let mut failed = false;
    for name in &targets {
        match resolver::resolve(&registry, name, &[name.clone()]) {
            Ok(deps) if deps.is_empty() => {
                println!("{} {} (no dependencies)", "✓".green(), name);
            }
            Ok(deps) => {
                println!("{} {} -> {}", "✓".green(), name, deps.join(", "));
            }
            Err(SyncError::CircularDependency { chain }) => {
                failed = true;
                println!("{} {}: circular dependency", "✗".red(), name);
                print_cycle(&chain);
            }
            Err(err) => {
                failed = true;
                println!("{} {}: {}", "✗".red(), name, err);
            }
        }
    }

    if failed {
        anyhow::bail!("dependency graph validation failed");
    }
    Ok(())
}

/// Render a cycle one hop per line, highlighting the module that repeats
fn print_cycle(chain: &[String]) {
    let repeated = chain.last().cloned().unwrap_or_default();
    for (depth, module) in chain.iter().enumerate() {
        let rendered = if *module == repeated {
            module.red().bold().to_string()
        } else {
            module.to_string()
        };
        println!("  {}{}", "--".repeat(depth), rendered);
    }
}
