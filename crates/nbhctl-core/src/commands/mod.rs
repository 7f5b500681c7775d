//! High-level commands for conductor operations.
//!
//! One module per operator workflow, each with an options struct and a
//! report struct. These are the entry points called by the CLI; they stay
//! prompt-free — anything interactive (source selection, confirmation) is
//! supplied by the caller as values or callbacks.

pub mod apply;
pub mod clone;
pub mod discover;
pub mod find;
pub mod set;
pub mod targets;

pub use apply::{ApplyOptions, ApplyReport};
pub use clone::{CloneOptions, CloneReport, SpokeSelection};
pub use discover::{DiscoverOptions, DiscoverReport, NeighborhoodEntry};
pub use find::{FindOptions, FindReport};
pub use set::{SetOptions, SetReport};
pub use targets::{TargetsOptions, TargetsReport};

use anyhow::Context;

use crate::api::ConductorClient;

/// Which routers a discovery-style command covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanScope {
    /// Every router in the authority.
    Fleet,
    /// A single router by name.
    Router(String),
    /// All routers whose name starts with the prefix.
    Prefix(String),
}

/// Resolve a scope to concrete router names, in backend order.
pub(crate) async fn resolve_routers(
    client: &ConductorClient,
    scope: &ScanScope,
) -> anyhow::Result<Vec<String>> {
    match scope {
        ScanScope::Router(name) => Ok(vec![name.clone()]),
        ScanScope::Fleet => client.routers().await.context("failed to list routers"),
        ScanScope::Prefix(prefix) => {
            let routers = client.routers().await.context("failed to list routers")?;
            Ok(routers
                .into_iter()
                .filter(|name| name.starts_with(prefix.as_str()))
                .collect())
        }
    }
}
