//! Discover command: walk a scope and index its neighborhoods.

use crate::api::ConductorClient;
use crate::index::NeighborhoodIndex;
use crate::types::ResourcePath;
use crate::walker::{TreeWalker, WalkScope};

use super::{ScanScope, resolve_routers};

#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    pub scope: ScanScope,
}

/// One neighborhood name with every path that carries it.
#[derive(Debug, Clone)]
pub struct NeighborhoodEntry {
    pub name: String,
    pub paths: Vec<ResourcePath>,
}

#[derive(Debug)]
pub struct DiscoverReport {
    pub routers_scanned: usize,
    pub interfaces_scanned: usize,
    /// Entries in lexicographic name order.
    pub neighborhoods: Vec<NeighborhoodEntry>,
}

pub async fn run(
    client: &ConductorClient,
    options: &DiscoverOptions,
) -> anyhow::Result<DiscoverReport> {
    let routers = resolve_routers(client, &options.scope).await?;
    let leaves = TreeWalker::new(client)
        .walk(&WalkScope::Routers(routers.clone()))
        .await?;
    let index = NeighborhoodIndex::build(&leaves);

    let neighborhoods = index
        .names_sorted()
        .into_iter()
        .map(|name| NeighborhoodEntry {
            name: name.to_string(),
            paths: index.lookup(name).to_vec(),
        })
        .collect();

    Ok(DiscoverReport {
        routers_scanned: routers.len(),
        interfaces_scanned: leaves.len(),
        neighborhoods,
    })
}
