//! The router target-list checkpoint file.
//!
//! A flat UTF-8 file, one router name per line, written by discovery and
//! hand-edited by the operator before propagation. This file is the only
//! durable artifact between runs.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, TargetListError};

pub struct TargetListStore;

impl TargetListStore {
    /// Read router names in file order. Whitespace is trimmed and blank
    /// lines dropped; duplicates are kept as written.
    pub fn load(path: &Path) -> Result<Vec<String>> {
        if !path.exists() {
            return Err(TargetListError::NotFound(path.to_path_buf()).into());
        }
        let content = fs::read_to_string(path)?;
        let names: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            return Err(TargetListError::Empty(path.to_path_buf()).into());
        }
        debug!(count = names.len(), path = %path.display(), "loaded target list");
        Ok(names)
    }

    /// Overwrite `path` with one name per line, in the given order.
    pub fn save(path: &Path, names: &[String]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut content = names.join("\n");
        content.push('\n');
        fs::write(path, content)?;
        debug!(count = names.len(), path = %path.display(), "saved target list");
        Ok(())
    }
}
