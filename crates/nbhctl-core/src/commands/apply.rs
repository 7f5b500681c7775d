//! Apply command: fan an existing neighborhood out over a target list.
//!
//! Re-enumerates the interfaces of every router in the checkpoint file at
//! run time, filters them by the interface-name substring, and applies the
//! neighborhood with per-target isolation.

use std::path::PathBuf;

use anyhow::Context;

use crate::api::ConductorClient;
use crate::propagate::{FanoutReport, PropagationEngine, name_contains};
use crate::target_list::TargetListStore;
use crate::types::ResourcePath;
use crate::walker::{TreeWalker, WalkScope};

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Neighborhood name to add on each matching interface.
    pub name: String,
    pub target_list: PathBuf,
    /// Substring filter over network-interface names (case-insensitive).
    pub match_substring: String,
}

#[derive(Debug)]
pub struct ApplyReport {
    pub routers: Vec<String>,
    /// True when the operator refused the confirmation gate.
    pub declined: bool,
    pub fanout: Option<FanoutReport>,
}

/// Run the fan-out. `confirm` receives the filtered targets and decides
/// whether mutation proceeds.
pub async fn run<F>(
    client: &ConductorClient,
    options: &ApplyOptions,
    confirm: F,
) -> anyhow::Result<ApplyReport>
where
    F: FnOnce(&[ResourcePath]) -> bool,
{
    let routers = TargetListStore::load(&options.target_list)?;
    let leaves = TreeWalker::new(client)
        .walk(&WalkScope::Routers(routers.clone()))
        .await
        .context("failed to walk target routers")?;
    let targets: Vec<ResourcePath> = leaves.into_iter().map(|leaf| leaf.path).collect();

    let predicate = name_contains(&options.match_substring);
    let filtered: Vec<ResourcePath> = targets
        .iter()
        .filter(|p| predicate(&p.network_interface))
        .cloned()
        .collect();

    let mut engine = PropagationEngine::new(client);
    if !engine.confirm(confirm(&filtered)) {
        return Ok(ApplyReport {
            routers,
            declined: true,
            fanout: None,
        });
    }

    let report = engine.fan_out(&targets, &options.name, predicate).await;
    Ok(ApplyReport {
        routers,
        declined: false,
        fanout: Some(report),
    })
}
