//! Set command: apply a neighborhood to every record of an interface export.
//!
//! The records file (CSV or JSON, as written by `find`) names the exact
//! interfaces to touch, so no filtering or confirmation applies; per-record
//! failures are isolated into the report like any other fan-out.

use std::path::PathBuf;

use anyhow::Context;

use crate::api::ConductorClient;
use crate::export;
use crate::propagate::{FanoutReport, PropagationEngine};
use crate::types::ResourcePath;

#[derive(Debug, Clone)]
pub struct SetOptions {
    pub name: String,
    pub input: PathBuf,
}

#[derive(Debug)]
pub struct SetReport {
    pub fanout: FanoutReport,
}

pub async fn run(client: &ConductorClient, options: &SetOptions) -> anyhow::Result<SetReport> {
    let records = export::read_records(&options.input)
        .with_context(|| format!("failed to read {}", options.input.display()))?;
    let targets: Vec<ResourcePath> = records.iter().map(|r| r.to_path()).collect();

    let mut engine = PropagationEngine::new(client);
    let fanout = engine.fan_out(&targets, &options.name, |_| true).await;
    Ok(SetReport { fanout })
}
