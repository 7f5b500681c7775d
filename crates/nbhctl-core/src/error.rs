//! Error taxonomy for conductor operations.
//!
//! Fatal errors abort the current top-level operation and carry the stage or
//! partial path where they occurred. Per-target failures during fan-out are
//! never surfaced here; they are captured as `Failed` outcomes in the report.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The conductor endpoint could not be parsed or the transport could not
    /// be constructed.
    #[error("invalid conductor endpoint: {0}")]
    Endpoint(String),

    /// Login rejected or no token returned. Nothing in the tree was touched.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A GET along the resource tree failed. `path` is the deepest prefix
    /// reached before the failure (e.g. `hub1/node0/lan0`).
    #[error("fetch failed at {path}: {detail}")]
    Fetch { path: String, detail: String },

    /// The clone request against the hub was rejected.
    #[error("clone of '{existing}' to '{new_name}' at {path} failed: {detail}")]
    Clone {
        path: String,
        existing: String,
        new_name: String,
        detail: String,
    },

    /// The cloned neighborhood was not present after the settle wait.
    #[error("verification failed: '{name}' not present at {path}")]
    VerificationFailed { path: String, name: String },

    /// An add request against a single target failed. During fan-out this is
    /// captured into the outcome report instead of being propagated.
    #[error("failed to add '{name}' at {path}: {detail}")]
    Apply {
        path: String,
        name: String,
        detail: String,
    },

    #[error(transparent)]
    TargetList(#[from] TargetListError),

    /// A tabular interface export could not be read or written.
    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Checkpoint-file failures, fatal to the invocation that needed the list.
#[derive(Error, Debug)]
pub enum TargetListError {
    #[error("target list not found: {0}")]
    NotFound(PathBuf),

    #[error("target list is empty: {0}")]
    Empty(PathBuf),
}
