//! Applying a classification to an owner's installation.
//!
//! Calls are issued one at a time: all additions first, then all removals.
//! A failed call is logged and counted but never stops the batch, so one
//! repository the classic tokens cannot administer does not leave every other
//! repository untouched.

use tracing::{error, info};

use crate::classifier::Repo;
use crate::context::OwnerContext;

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;

/// Outcome of reconciling one owner's installation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Repositories successfully added to the installation.
    pub added: usize,

    /// Repositories successfully removed from the installation.
    pub removed: usize,

    /// Calls that failed.
    pub failed: usize,

    /// Full names of the repositories whose call failed.
    pub failed_repos: Vec<String>,
}

impl ReconcileReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if every attempted call succeeded.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Number of calls attempted.
    pub fn attempted(&self) -> usize {
        self.added + self.removed + self.failed
    }
}

#[derive(Clone, Copy)]
enum Change {
    Add,
    Remove,
}

/// Adds `add_repos` to and removes `remove_repos` from the owner's installation.
///
/// Does nothing, and logs nothing, when both lists are empty.
pub async fn reconcile(
    add_repos: &[Repo],
    remove_repos: &[Repo],
    context: &OwnerContext,
) -> ReconcileReport {
    let mut report = ReconcileReport::new();
    if add_repos.is_empty() && remove_repos.is_empty() {
        return report;
    }

    info!("Applying adjustments...");
    info!("");

    for repo in add_repos {
        apply(Change::Add, repo, context, &mut report).await;
    }
    for repo in remove_repos {
        apply(Change::Remove, repo, context, &mut report).await;
    }

    info!("");
    info!(
        attempted = report.attempted(),
        added = report.added,
        removed = report.removed,
        failed = report.failed,
        "Adjustments complete"
    );
    report
}

async fn apply(change: Change, repo: &Repo, context: &OwnerContext, report: &mut ReconcileReport) {
    let installation = context.installation();
    let result = match change {
        Change::Add => {
            installation
                .add_repository_to_installation(context.install_id(), repo.id)
                .await
        }
        Change::Remove => {
            installation
                .remove_repository_from_installation(context.install_id(), repo.id)
                .await
        }
    };

    match (change, result) {
        (Change::Add, Ok(status)) => {
            info!("+ {} (status: {})", repo.full_name, status);
            report.added += 1;
        }
        (Change::Remove, Ok(status)) => {
            info!("- {} (status: {})", repo.full_name, status);
            report.removed += 1;
        }
        (change, Err(e)) => {
            let verb = match change {
                Change::Add => "add",
                Change::Remove => "remove",
            };
            error!(
                repository_id = repo.id,
                error = %e,
                "Failed to {} {} (id: {})",
                verb,
                repo.full_name,
                repo.id
            );
            report.failed += 1;
            report.failed_repos.push(repo.full_name.clone());
        }
    }
}
