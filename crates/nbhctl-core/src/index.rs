//! Name → location index built from walker output.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::types::{ResourcePath, TreeLeaf};

/// Mapping of neighborhood name to every path that carries it.
///
/// Rebuilt from scratch on every discovery run, never updated incrementally.
/// All owning paths are kept per name; a duplicate name on the *same* router
/// is logged as a warning, since within one hub a name is expected to be
/// unique. Cross-router duplicates are ordinary fleet topology.
#[derive(Debug, Default)]
pub struct NeighborhoodIndex {
    entries: BTreeMap<String, Vec<ResourcePath>>,
}

impl NeighborhoodIndex {
    pub fn build(leaves: &[TreeLeaf]) -> Self {
        let mut entries: BTreeMap<String, Vec<ResourcePath>> = BTreeMap::new();
        for leaf in leaves {
            for name in &leaf.neighborhoods {
                let paths = entries.entry(name.clone()).or_default();
                if paths.iter().any(|p| p.router == leaf.path.router) {
                    warn!(
                        name = %name,
                        router = %leaf.path.router,
                        "neighborhood name appears on multiple interfaces of one router"
                    );
                }
                paths.push(leaf.path.clone());
            }
        }
        debug!(names = entries.len(), "index built");
        Self { entries }
    }

    /// All neighborhood names, lexicographically sorted, for stable display.
    pub fn names_sorted(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Every path carrying `name`; empty when absent — absence is not an error.
    pub fn lookup(&self, name: &str) -> &[ResourcePath] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Router names carrying `name`, in first-seen order, deduplicated.
    pub fn routers_with(&self, name: &str) -> Vec<String> {
        let mut routers: Vec<String> = Vec::new();
        for path in self.lookup(name) {
            if !routers.contains(&path.router) {
                routers.push(path.router.clone());
            }
        }
        routers
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
