//! Tabular export and re-import of interface locations.
//!
//! Matching interfaces are written as CSV (fixed four-column header) or a
//! JSON array of objects with the same fields, chosen by file extension.
//! The same records can be read back to drive a per-record apply.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ResourcePath;

const CSV_HEADER: &str = "router,node,device_interface,network_interface";

/// Serialized form of a [`ResourcePath`] for export files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    pub router: String,
    pub node: String,
    pub device_interface: String,
    pub network_interface: String,
}

impl From<&ResourcePath> for InterfaceRecord {
    fn from(path: &ResourcePath) -> Self {
        Self {
            router: path.router.clone(),
            node: path.node.clone(),
            device_interface: path.device_interface.clone(),
            network_interface: path.network_interface.clone(),
        }
    }
}

impl InterfaceRecord {
    pub fn to_path(&self) -> ResourcePath {
        ResourcePath::new(
            self.router.as_str(),
            self.node.as_str(),
            self.device_interface.as_str(),
            self.network_interface.as_str(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick a format from the file extension; anything but `.json` is CSV,
    /// matching the original tooling's behavior.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Write records to `path` in the extension-selected format.
pub fn write_records(path: &Path, records: &[InterfaceRecord]) -> Result<()> {
    let content = match ExportFormat::from_path(path) {
        ExportFormat::Json => {
            let mut body = serde_json::to_string_pretty(records)?;
            body.push('\n');
            body
        }
        ExportFormat::Csv => to_csv(records)?,
    };
    fs::write(path, content)?;
    Ok(())
}

/// Read records back from `path` in the extension-selected format.
pub fn read_records(path: &Path) -> Result<Vec<InterfaceRecord>> {
    let content = fs::read_to_string(path)?;
    match ExportFormat::from_path(path) {
        ExportFormat::Json => Ok(serde_json::from_str(&content)?),
        ExportFormat::Csv => from_csv(&content),
    }
}

fn to_csv(records: &[InterfaceRecord]) -> Result<String> {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        // Tree names are config identifiers; a comma would corrupt the row.
        for field in [
            &record.router,
            &record.node,
            &record.device_interface,
            &record.network_interface,
        ] {
            if field.contains(',') {
                return Err(Error::Export(format!(
                    "name contains a comma, not representable as CSV: {field}"
                )));
            }
        }
        out.push_str(&format!(
            "{},{},{},{}\n",
            record.router, record.node, record.device_interface, record.network_interface
        ));
    }
    Ok(out)
}

fn from_csv(content: &str) -> Result<Vec<InterfaceRecord>> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());
    match lines.next() {
        Some(header) if header.trim() == CSV_HEADER => {}
        other => {
            return Err(Error::Export(format!(
                "expected header '{CSV_HEADER}', found {:?}",
                other.unwrap_or_default()
            )));
        }
    }
    let mut records = Vec::new();
    for line in lines {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != 4 {
            return Err(Error::Export(format!("malformed row: {line}")));
        }
        records.push(InterfaceRecord {
            router: fields[0].to_string(),
            node: fields[1].to_string(),
            device_interface: fields[2].to_string(),
            network_interface: fields[3].to_string(),
        });
    }
    Ok(records)
}
