//! Clone → verify → confirm → fan-out propagation workflow.
//!
//! The engine walks an explicit state machine:
//!
//! ```text
//! Idle → Cloning → Verifying → AwaitingConfirmation → FanningOut → Done
//!           │          │               │
//!           └──────────┴───────────────┴────────────→ Aborted
//! ```
//!
//! Clone and verification failures abort before any target is touched. Once
//! fan-out starts it always runs to completion over all filtered targets, so
//! a partial-failure batch still yields a complete report.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::api::ConductorClient;
use crate::error::{Error, Result};
use crate::types::ResourcePath;

/// Default backend-consistency wait between clone and verification.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Cloning,
    Verifying,
    AwaitingConfirmation,
    FanningOut,
    Done,
    Aborted,
}

/// Result of one fan-out target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Added,
    Skipped,
    Failed,
}

#[derive(Debug, Clone)]
pub struct PropagationOutcome {
    pub path: ResourcePath,
    pub verdict: Verdict,
    pub detail: Option<String>,
}

/// Append-only record of a fan-out run, one outcome per attempted target,
/// in filtered-target order. Aggregate counts are always derived from the
/// outcomes, never tracked separately.
#[derive(Debug, Default)]
pub struct FanoutReport {
    outcomes: Vec<PropagationOutcome>,
}

impl FanoutReport {
    pub fn outcomes(&self) -> &[PropagationOutcome] {
        &self.outcomes
    }

    pub fn added(&self) -> usize {
        self.count(Verdict::Added)
    }

    pub fn skipped(&self) -> usize {
        self.count(Verdict::Skipped)
    }

    pub fn failed(&self) -> usize {
        self.count(Verdict::Failed)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, verdict: Verdict) -> usize {
        self.outcomes.iter().filter(|o| o.verdict == verdict).count()
    }

    fn push(&mut self, outcome: PropagationOutcome) {
        self.outcomes.push(outcome);
    }
}

/// Case-insensitive substring predicate over network-interface names, the
/// operator-facing default filter (e.g. `wan`).
pub fn name_contains(substring: &str) -> impl Fn(&str) -> bool {
    let needle = substring.to_lowercase();
    move |name: &str| name.to_lowercase().contains(&needle)
}

/// Drives the clone-verify-confirm-fanout workflow against one conductor.
pub struct PropagationEngine<'a> {
    client: &'a ConductorClient,
    settle: Duration,
    state: EngineState,
}

impl<'a> PropagationEngine<'a> {
    pub fn new(client: &'a ConductorClient) -> Self {
        Self {
            client,
            settle: DEFAULT_SETTLE,
            state: EngineState::Idle,
        }
    }

    /// Override the settle wait (tests use zero).
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Clone `existing` to `new_name` on the source path's neighborhood
    /// collection. Failure aborts the workflow; no fan-out is attempted.
    pub async fn clone_neighborhood(
        &mut self,
        source: &ResourcePath,
        existing: &str,
        new_name: &str,
    ) -> Result<()> {
        self.state = EngineState::Cloning;
        match self
            .client
            .clone_neighborhood(source, existing, new_name)
            .await
        {
            Ok(()) => {
                self.state = EngineState::Verifying;
                Ok(())
            }
            Err(e) => {
                self.state = EngineState::Aborted;
                Err(e)
            }
        }
    }

    /// Wait for the backend to settle, then check that `new_name` is present
    /// at the source. The wait is a consistency assumption, not a guarantee;
    /// an overloaded backend may need longer, in which case this aborts and
    /// the workflow must be re-run.
    pub async fn verify(&mut self, source: &ResourcePath, new_name: &str) -> Result<()> {
        debug!(settle_secs = self.settle.as_secs_f64(), "waiting for backend to settle");
        tokio::time::sleep(self.settle).await;
        let names = match self.client.neighborhoods(source).await {
            Ok(names) => names,
            Err(e) => {
                self.state = EngineState::Aborted;
                return Err(e);
            }
        };
        if names.iter().any(|n| n == new_name) {
            info!(new_name, "clone verified on source");
            self.state = EngineState::AwaitingConfirmation;
            Ok(())
        } else {
            self.state = EngineState::Aborted;
            Err(Error::VerificationFailed {
                path: source.to_string(),
                name: new_name.to_string(),
            })
        }
    }

    /// The single external gate before mutation fan-out. Refusal aborts with
    /// no further side effects.
    pub fn confirm(&mut self, accepted: bool) -> bool {
        if accepted {
            self.state = EngineState::FanningOut;
        } else {
            info!("fan-out declined, no targets touched");
            self.state = EngineState::Aborted;
        }
        accepted
    }

    /// Apply `name` to every target whose network-interface name satisfies
    /// `predicate`, sequentially and in input order.
    ///
    /// A target that already carries `name` is recorded as `Skipped`; a
    /// failed target is recorded as `Failed` with the captured detail and
    /// never stops processing of the remaining targets. An empty filtered
    /// set completes immediately with an empty report.
    pub async fn fan_out<P>(
        &mut self,
        targets: &[ResourcePath],
        name: &str,
        predicate: P,
    ) -> FanoutReport
    where
        P: Fn(&str) -> bool,
    {
        self.state = EngineState::FanningOut;
        let filtered: Vec<&ResourcePath> = targets
            .iter()
            .filter(|p| predicate(&p.network_interface))
            .collect();
        info!(
            candidates = targets.len(),
            filtered = filtered.len(),
            name,
            "fanning out"
        );
        let mut report = FanoutReport::default();
        for path in filtered {
            report.push(self.apply_one(path, name).await);
        }
        self.state = EngineState::Done;
        info!(
            added = report.added(),
            skipped = report.skipped(),
            failed = report.failed(),
            "fan-out complete"
        );
        report
    }

    async fn apply_one(&self, path: &ResourcePath, name: &str) -> PropagationOutcome {
        match self.try_apply(path, name).await {
            Ok(verdict) => PropagationOutcome {
                path: path.clone(),
                verdict,
                detail: None,
            },
            Err(e) => {
                warn!(%path, error = %e, "target failed, continuing");
                PropagationOutcome {
                    path: path.clone(),
                    verdict: Verdict::Failed,
                    detail: Some(e.to_string()),
                }
            }
        }
    }

    async fn try_apply(&self, path: &ResourcePath, name: &str) -> Result<Verdict> {
        let existing = self.client.neighborhoods(path).await?;
        if existing.iter().any(|n| n == name) {
            debug!(%path, name, "already present, skipping");
            return Ok(Verdict::Skipped);
        }
        self.client.add_neighborhood(path, name).await?;
        Ok(Verdict::Added)
    }
}
