//! Clone command: the full clone-verify-confirm-fanout workflow.
//!
//! Clones a source neighborhood to a new name on the hub, verifies the
//! clone after the settle wait, then optionally fans the new name out to
//! matching interfaces on the selected spokes. The confirmation callback is
//! the only gate between verification and fan-out; refusing it leaves every
//! spoke untouched.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing::warn;

use crate::api::ConductorClient;
use crate::index::NeighborhoodIndex;
use crate::propagate::{FanoutReport, PropagationEngine, name_contains};
use crate::target_list::TargetListStore;
use crate::types::ResourcePath;
use crate::walker::{TreeWalker, WalkScope};

/// Where the fan-out targets come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpokeSelection {
    /// Routers whose name starts with the prefix.
    Prefix(String),
    /// Routers listed in a hand-editable checkpoint file.
    TargetList(PathBuf),
    /// Clone and verify only; no fan-out.
    None,
}

#[derive(Debug, Clone)]
pub struct CloneOptions {
    pub hub: String,
    /// Existing neighborhood on the hub to clone from.
    pub source: String,
    pub new_name: String,
    pub spokes: SpokeSelection,
    /// Substring filter over network-interface names (case-insensitive).
    pub match_substring: String,
    /// Override the settle wait before verification.
    pub settle: Option<Duration>,
}

#[derive(Debug)]
pub struct CloneReport {
    pub source: ResourcePath,
    pub new_name: String,
    /// True when the operator refused the confirmation gate.
    pub declined: bool,
    /// Present when fan-out ran.
    pub fanout: Option<FanoutReport>,
}

/// Run the workflow. `confirm` receives the filtered fan-out targets and
/// decides whether mutation proceeds.
pub async fn run<F>(
    client: &ConductorClient,
    options: &CloneOptions,
    confirm: F,
) -> anyhow::Result<CloneReport>
where
    F: FnOnce(&[ResourcePath]) -> bool,
{
    // Locate the source neighborhood on the hub.
    let leaves = TreeWalker::new(client)
        .walk(&WalkScope::Router(options.hub.clone()))
        .await
        .with_context(|| format!("failed to walk hub '{}'", options.hub))?;
    let index = NeighborhoodIndex::build(&leaves);
    let owners = index.lookup(&options.source);
    let source_path = match owners {
        [] => anyhow::bail!(
            "neighborhood '{}' not found on hub '{}'",
            options.source,
            options.hub
        ),
        [only] => only.clone(),
        [first, ..] => {
            warn!(
                name = %options.source,
                count = owners.len(),
                "source name is ambiguous on the hub, using the first occurrence"
            );
            first.clone()
        }
    };

    let mut engine = PropagationEngine::new(client);
    if let Some(settle) = options.settle {
        engine = engine.with_settle(settle);
    }

    engine
        .clone_neighborhood(&source_path, &options.source, &options.new_name)
        .await?;
    engine.verify(&source_path, &options.new_name).await?;

    let spoke_routers = match &options.spokes {
        SpokeSelection::None => {
            return Ok(CloneReport {
                source: source_path,
                new_name: options.new_name.clone(),
                declined: false,
                fanout: None,
            });
        }
        SpokeSelection::Prefix(prefix) => client
            .routers()
            .await
            .context("failed to list routers")?
            .into_iter()
            .filter(|name| name.starts_with(prefix.as_str()) && *name != options.hub)
            .collect(),
        SpokeSelection::TargetList(path) => TargetListStore::load(path)?,
    };

    let spoke_leaves = TreeWalker::new(client)
        .walk(&WalkScope::Routers(spoke_routers))
        .await
        .context("failed to walk spoke routers")?;
    let targets: Vec<ResourcePath> = spoke_leaves.into_iter().map(|leaf| leaf.path).collect();

    let predicate = name_contains(&options.match_substring);
    let filtered: Vec<ResourcePath> = targets
        .iter()
        .filter(|p| predicate(&p.network_interface))
        .cloned()
        .collect();

    if !engine.confirm(confirm(&filtered)) {
        return Ok(CloneReport {
            source: source_path,
            new_name: options.new_name.clone(),
            declined: true,
            fanout: None,
        });
    }

    let report = engine
        .fan_out(&targets, &options.new_name, predicate)
        .await;

    Ok(CloneReport {
        source: source_path,
        new_name: options.new_name.clone(),
        declined: false,
        fanout: Some(report),
    })
}
