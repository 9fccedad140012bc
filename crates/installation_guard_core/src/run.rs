//! The driver: processes owners one after another and collects their status.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{error, info, Instrument};

use crate::classifier::{classify, Repo};
use crate::config::SyncMode;
use crate::context::OwnerContext;
use crate::reconciler::reconcile;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Final status of one owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerStatus {
    Success,
    Failure,
    Skipped,
}

impl OwnerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for OwnerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of every owner processed by a run, keyed by login.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    statuses: BTreeMap<String, OwnerStatus>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an owner's status, replacing any earlier one.
    pub fn record(&mut self, login: impl Into<String>, status: OwnerStatus) {
        self.statuses.insert(login.into(), status);
    }

    pub fn status(&self, login: &str) -> Option<OwnerStatus> {
        self.statuses.get(login).copied()
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Returns true if any owner ended in [`OwnerStatus::Failure`].
    ///
    /// Skipped owners do not count as failures.
    pub fn has_failure(&self) -> bool {
        self.statuses.values().any(|s| *s == OwnerStatus::Failure)
    }

    /// `login: status` lines, sorted by login.
    pub fn summary_lines(&self) -> Vec<String> {
        self.statuses
            .iter()
            .map(|(login, status)| format!("{}: {}", login, status))
            .collect()
    }

    pub fn log_summary(&self) {
        info!("Summary");
        info!("------------------------------");
        for line in self.summary_lines() {
            info!("{}", line);
        }
    }
}

/// Processes a single owner: classify, then reconcile.
///
/// Errors never escape; they are logged and reported as
/// [`OwnerStatus::Failure`].
pub async fn run_owner(context: &OwnerContext, mode: SyncMode) -> OwnerStatus {
    async {
        if context.skip() {
            info!("Skipping {} as requested...", context.login());
            return OwnerStatus::Skipped;
        }

        info!(install_id = context.install_id(), mode = %mode, "Processing {}", context.login());

        let classification = match classify(context, mode).await {
            Ok(classification) => classification,
            Err(e) => {
                error!(error = %e, "Failed to list repositories of {}", context.login());
                return OwnerStatus::Failure;
            }
        };

        let add_repos: &[Repo] = if mode.adds_repositories() {
            classification.non_sensitive.as_slice()
        } else {
            &[]
        };
        let report = reconcile(add_repos, &classification.sensitive, context).await;

        if report.is_success() {
            OwnerStatus::Success
        } else {
            error!(
                failed = report.failed,
                repositories = ?report.failed_repos,
                "Some installation changes for {} failed",
                context.login()
            );
            OwnerStatus::Failure
        }
    }
    .instrument(context.span().clone())
    .await
}

/// Processes every owner strictly in order, one at a time.
pub async fn run(contexts: &[OwnerContext], mode: SyncMode) -> RunResult {
    let mut result = RunResult::new();
    for context in contexts {
        let status = run_owner(context, mode).await;
        result.record(context.login(), status);
    }
    result
}
