//! Depth-first traversal of the four-level resource tree.

use tracing::debug;

use crate::api::ConductorClient;
use crate::error::Result;
use crate::types::{ResourcePath, TreeLeaf};

/// Which routers a walk covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkScope {
    /// A single router by name.
    Router(String),
    /// An explicit ordered list of routers (e.g. prefix-filtered upstream).
    Routers(Vec<String>),
}

impl WalkScope {
    pub fn router_names(&self) -> &[String] {
        match self {
            WalkScope::Router(name) => std::slice::from_ref(name),
            WalkScope::Routers(names) => names,
        }
    }
}

/// Read-only walker over router → node → device-interface → network-interface.
///
/// Every call re-fetches from the live backend; nothing is cached. Children
/// are visited in the order the backend returns them. A failed fetch at any
/// level aborts the whole walk — the traversal has no side effects, so the
/// caller can simply retry it wholesale.
pub struct TreeWalker<'a> {
    client: &'a ConductorClient,
}

impl<'a> TreeWalker<'a> {
    pub fn new(client: &'a ConductorClient) -> Self {
        Self { client }
    }

    /// Walk the scope and return one leaf per network-interface, including
    /// the neighborhood names present there.
    pub async fn walk(&self, scope: &WalkScope) -> Result<Vec<TreeLeaf>> {
        let mut leaves = Vec::new();
        for router in scope.router_names() {
            self.walk_router(router, &mut leaves).await?;
        }
        debug!(leaves = leaves.len(), "walk complete");
        Ok(leaves)
    }

    async fn walk_router(&self, router: &str, leaves: &mut Vec<TreeLeaf>) -> Result<()> {
        debug!(router, "walking router");
        for node in self.client.nodes(router).await? {
            for device in self.client.device_interfaces(router, &node).await? {
                for interface in self
                    .client
                    .network_interfaces(router, &node, &device)
                    .await?
                {
                    let path =
                        ResourcePath::new(router, node.as_str(), device.as_str(), interface);
                    let neighborhoods = self.client.neighborhoods(&path).await?;
                    leaves.push(TreeLeaf {
                        path,
                        neighborhoods,
                    });
                }
            }
        }
        Ok(())
    }
}
