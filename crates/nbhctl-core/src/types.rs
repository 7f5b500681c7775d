//! Shared core types for the resource tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of one network-interface in the four-level configuration tree.
///
/// Immutable once constructed; every component is a backend-assigned name
/// (the tree has no numeric identifiers).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePath {
    pub router: String,
    pub node: String,
    pub device_interface: String,
    pub network_interface: String,
}

impl ResourcePath {
    pub fn new(
        router: impl Into<String>,
        node: impl Into<String>,
        device_interface: impl Into<String>,
        network_interface: impl Into<String>,
    ) -> Self {
        Self {
            router: router.into(),
            node: node.into(),
            device_interface: device_interface.into(),
            network_interface: network_interface.into(),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.router, self.node, self.device_interface, self.network_interface
        )
    }
}

/// One traversal result: a network-interface and the neighborhood names
/// attached to it, in backend order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLeaf {
    pub path: ResourcePath,
    pub neighborhoods: Vec<String>,
}
