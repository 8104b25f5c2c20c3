//! Removal of zombie MySQL providers from an exported stack.
//!
//! When an RDS instance disappears outside the engine's control, its MySQL
//! provider and everything managed through it stay in the stack and make
//! every later update fail while refreshing them. Dropping those resources
//! from the exported state and importing it back lets reconciliation proceed.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::engine::Engine;
use crate::error::{DeployError, Result};
use crate::runner;

pub const MYSQL_PROVIDER_TYPE: &str = "pulumi:providers:mysql";

#[derive(Debug, Clone, PartialEq)]
pub struct Purged {
    pub stack: Value,
    /// Number of resources dropped, providers and dependents together.
    pub removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurgeOutcome {
    pub removed: usize,
    pub imported: bool,
}

/// Drop MySQL providers whose endpoint is not in `live_endpoints`, and every
/// resource that references one of them as its provider. `original` is a
/// `stack export` document and is left untouched.
///
/// Providers precede their dependents in an export, so one pass suffices.
pub fn purge_zombie_providers(original: &Value, live_endpoints: &HashSet<String>) -> Result<Purged> {
    let mut stack = original.clone();
    let resources = stack
        .pointer_mut("/deployment/resources")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| DeployError::InvalidStackExport("missing deployment.resources".into()))?;

    let before = resources.len();
    let mut zombies: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(before);

    for resource in resources.drain(..) {
        if is_zombie_provider(&resource, live_endpoints) {
            zombies.insert(provider_reference(&resource));
        } else if !depends_on_any(&resource, &zombies) {
            kept.push(resource);
        }
    }

    let removed = before - kept.len();
    *resources = kept;
    Ok(Purged { stack, removed })
}

/// Export the stack, purge it, and import the result when anything changed.
pub async fn purge_stack(
    engine: &Engine,
    stack: Option<&str>,
    live_endpoints: &HashSet<String>,
    dry_run: bool,
) -> Result<PurgeOutcome> {
    let exported = runner::capture(&engine.export_stack(stack)).await?;
    let original: Value = serde_json::from_slice(&exported)?;
    let purged = purge_zombie_providers(&original, live_endpoints)?;

    if purged.removed == 0 {
        info!("stack has no zombie resources");
        return Ok(PurgeOutcome {
            removed: 0,
            imported: false,
        });
    }
    if dry_run {
        info!(removed = purged.removed, "dry run, stack left untouched");
        return Ok(PurgeOutcome {
            removed: purged.removed,
            imported: false,
        });
    }

    info!(removed = purged.removed, "purging resources from stack");
    let body = serde_json::to_vec(&purged.stack)?;
    runner::feed(&engine.import_stack(stack), &body).await?;
    Ok(PurgeOutcome {
        removed: purged.removed,
        imported: true,
    })
}

fn is_zombie_provider(resource: &Value, live_endpoints: &HashSet<String>) -> bool {
    if resource.get("type").and_then(Value::as_str) != Some(MYSQL_PROVIDER_TYPE) {
        return false;
    }
    // A provider without a recorded endpoint cannot be judged; keep it.
    match resource.pointer("/inputs/endpoint").and_then(Value::as_str) {
        Some(endpoint) => !live_endpoints.contains(endpoint),
        None => false,
    }
}

/// Resources name their provider as `<urn>::<id>`.
fn provider_reference(resource: &Value) -> String {
    let field = |name: &str| resource.get(name).and_then(Value::as_str).unwrap_or_default();
    format!("{}::{}", field("urn"), field("id"))
}

fn depends_on_any(resource: &Value, providers: &HashSet<String>) -> bool {
    resource
        .get("provider")
        .and_then(Value::as_str)
        .is_some_and(|p| providers.contains(p))
}
