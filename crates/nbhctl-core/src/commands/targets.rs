//! Targets command: write the router-list checkpoint for a neighborhood.
//!
//! The written file is meant to be hand-edited by the operator before being
//! fed to `apply`.

use std::path::PathBuf;

use anyhow::Context;

use crate::api::ConductorClient;
use crate::index::NeighborhoodIndex;
use crate::target_list::TargetListStore;
use crate::walker::{TreeWalker, WalkScope};

use super::{ScanScope, resolve_routers};

#[derive(Debug, Clone)]
pub struct TargetsOptions {
    /// Reference neighborhood whose carriers become the target list.
    pub neighborhood: String,
    pub scope: ScanScope,
    pub output: PathBuf,
}

#[derive(Debug)]
pub struct TargetsReport {
    pub routers_scanned: usize,
    pub routers: Vec<String>,
    pub output: PathBuf,
}

pub async fn run(
    client: &ConductorClient,
    options: &TargetsOptions,
) -> anyhow::Result<TargetsReport> {
    let scanned = resolve_routers(client, &options.scope).await?;
    let leaves = TreeWalker::new(client)
        .walk(&WalkScope::Routers(scanned.clone()))
        .await?;
    let index = NeighborhoodIndex::build(&leaves);

    let routers = index.routers_with(&options.neighborhood);
    if routers.is_empty() {
        anyhow::bail!(
            "no router carries neighborhood '{}'",
            options.neighborhood
        );
    }

    TargetListStore::save(&options.output, &routers)
        .with_context(|| format!("failed to write {}", options.output.display()))?;

    Ok(TargetsReport {
        routers_scanned: scanned.len(),
        routers,
        output: options.output.clone(),
    })
}
