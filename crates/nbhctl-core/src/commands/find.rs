//! Find command: list every interface carrying a given neighborhood.

use std::path::PathBuf;

use anyhow::Context;

use crate::api::ConductorClient;
use crate::export::{self, InterfaceRecord};
use crate::walker::{TreeWalker, WalkScope};

use super::{ScanScope, resolve_routers};

#[derive(Debug, Clone)]
pub struct FindOptions {
    pub neighborhood: String,
    pub scope: ScanScope,
    /// Write matches to this CSV/JSON file instead of only reporting them.
    pub output: Option<PathBuf>,
}

#[derive(Debug)]
pub struct FindReport {
    pub routers_scanned: usize,
    pub interfaces_scanned: usize,
    pub records: Vec<InterfaceRecord>,
    pub written_to: Option<PathBuf>,
}

pub async fn run(client: &ConductorClient, options: &FindOptions) -> anyhow::Result<FindReport> {
    let routers = resolve_routers(client, &options.scope).await?;
    let leaves = TreeWalker::new(client)
        .walk(&WalkScope::Routers(routers.clone()))
        .await?;

    let records: Vec<InterfaceRecord> = leaves
        .iter()
        .filter(|leaf| leaf.neighborhoods.iter().any(|n| n == &options.neighborhood))
        .map(|leaf| InterfaceRecord::from(&leaf.path))
        .collect();

    let written_to = match &options.output {
        Some(path) => {
            export::write_records(path, &records)
                .with_context(|| format!("failed to write {}", path.display()))?;
            Some(path.clone())
        }
        None => None,
    };

    Ok(FindReport {
        routers_scanned: routers.len(),
        interfaces_scanned: leaves.len(),
        records,
        written_to,
    })
}
