//! Prune session - select and delete orphaned branches
//!
//! Drives the prune workflow: reconcile, let the operator pick branches,
//! confirm, move off the doomed branches, delete. Deletions run one at a time
//! since they mutate the shared working tree.

use crate::error::{Error, Result};
use crate::reconcile::{ReconcileOptions, Reconciliation, reconcile};
use crate::repo::GitRepo;
use crate::types::{BranchRef, OrphanSet};
use crate::workflow::{PhaseController, PruneEvent, PruneFlow, PrunePhase};
use chrono::{DateTime, FixedOffset};
use std::time::Duration;
use tracing::{info, warn};

/// Placeholder for a field whose lookup failed
pub const UNKNOWN: &str = "N/A";

/// What has to happen before the selected branches can be deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchPlan {
    /// Already on the default branch
    Stay,
    /// Need to check out `target` first
    Switch {
        /// Branch checked out before deleting
        target: String,
        /// Whether uncommitted work must be stashed first
        dirty: bool,
    },
}

/// Outcome of the deletion step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    /// Branches that were deleted
    pub deleted: Vec<String>,
    /// Branches that could not be deleted, with the reason
    pub failed: Vec<(String, String)>,
}

/// One run of the prune flow
#[derive(Debug)]
pub struct PruneSession {
    repo: GitRepo,
    options: ReconcileOptions,
    controller: PhaseController<PruneFlow>,
    reconciliation: Option<Reconciliation>,
    selected: Vec<String>,
    report: DeletionReport,
}

impl PruneSession {
    /// Create a session in the `loading` phase
    pub fn new(repo: GitRepo, options: ReconcileOptions, exit_delay: Duration) -> Self {
        Self {
            repo,
            options,
            controller: PhaseController::new(PruneFlow::new(exit_delay)),
            reconciliation: None,
            selected: Vec::new(),
            report: DeletionReport::default(),
        }
    }

    /// Current phase
    pub const fn phase(&self) -> PrunePhase {
        self.controller.phase()
    }

    /// Latest status line
    pub fn log(&self) -> &str {
        self.controller.status()
    }

    /// Orphaned branches found by the last load
    pub fn orphans(&self) -> Option<&OrphanSet> {
        self.reconciliation.as_ref().map(|r| &r.orphans)
    }

    /// Default branch resolved during the last load
    pub fn default_branch(&self) -> Option<&str> {
        self.reconciliation
            .as_ref()
            .map(|r| r.default_branch.as_str())
    }

    /// Branches currently selected for deletion
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// Result of the deletion step
    pub const fn report(&self) -> &DeletionReport {
        &self.report
    }

    /// The underlying controller
    pub const fn controller(&self) -> &PhaseController<PruneFlow> {
        &self.controller
    }

    fn expect_phase(&self, expected: PrunePhase, name: &'static str) -> Result<()> {
        if self.phase() == expected {
            Ok(())
        } else {
            Err(Error::InvalidPhase {
                expected: name,
                actual: self.phase().to_string(),
            })
        }
    }

    /// Reconcile branches
    ///
    /// A failed listing moves the session to `error`; an empty result moves it
    /// to `idle`.
    pub async fn load(&mut self) -> Result<()> {
        self.expect_phase(PrunePhase::Loading, "loading")?;
        self.controller.report("Fetching git branches...");

        match reconcile(&self.repo, &self.options).await {
            Ok(reconciliation) => {
                let count = reconciliation.orphans.len();
                if count == 0 {
                    self.controller
                        .report("👍 No local branches found that are not present upstream.");
                } else {
                    self.controller
                        .report(format!("Found {count} orphaned branch(es)."));
                }
                self.reconciliation = Some(reconciliation);
                self.controller.advance(PruneEvent::Loaded { count });
            }
            Err(e) => {
                warn!(error = %e, "reconciliation failed");
                self.controller
                    .report(format!("Error fetching orphaned branches: {e}"));
                self.controller.advance(PruneEvent::Failed);
            }
        }
        Ok(())
    }

    /// Submit the operator's selection
    ///
    /// Names that are not orphaned are dropped. An empty selection ends the
    /// flow in `idle` without deleting anything.
    pub fn select<I, S>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expect_phase(PrunePhase::Selection, "selection")?;
        let orphans = self.orphans();
        let mut selected: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::into) {
            let deletable = orphans
                .and_then(|set| set.get(&name))
                .is_some_and(|branch| branch.tracking.is_orphaned());
            if !deletable {
                warn!(branch = %name, "ignoring selection of a branch that is not orphaned");
                continue;
            }
            if !selected.contains(&name) {
                selected.push(name);
            }
        }

        if selected.is_empty() {
            self.controller.report("No branches selected for deletion.");
        } else {
            self.controller.report(format!(
                "Branches to delete: {}",
                selected.join(", ")
            ));
        }
        let count = selected.len();
        self.selected = selected;
        self.controller.advance(PruneEvent::Selected { count });
        Ok(())
    }

    /// Go back to selection without deleting
    pub fn decline(&mut self) -> Result<()> {
        self.expect_phase(PrunePhase::Confirm, "confirm")?;
        self.controller.report("Deletion cancelled.");
        self.controller.advance(PruneEvent::Declined);
        Ok(())
    }

    /// Cancel the flow; only honored while waiting on the operator
    pub fn cancel(&mut self) {
        self.controller.advance(PruneEvent::Cancel);
    }

    /// Work out whether the working tree has to move before deleting
    ///
    /// Switching is needed when the current branch is not the default branch,
    /// which also covers the current branch being one of the selection.
    pub async fn switch_plan(&self) -> Result<SwitchPlan> {
        self.expect_phase(PrunePhase::Confirm, "confirm")?;
        let target = self
            .default_branch()
            .unwrap_or(&self.options.fallback_default_branch)
            .to_string();

        let current = self.repo.current_branch().await?;
        if current == target {
            return Ok(SwitchPlan::Stay);
        }
        let dirty = self.repo.has_uncommitted_changes().await?;
        Ok(SwitchPlan::Switch { target, dirty })
    }

    /// Confirm and delete the selected branches
    ///
    /// `stash_message` is used when `plan` requires stashing; `None` stashes
    /// without a message. A failure to move off the selected branches ends the
    /// flow in `error` before anything is deleted. Individual deletion failures
    /// are recorded and the remaining branches are still deleted.
    pub async fn confirm(&mut self, plan: &SwitchPlan, stash_message: Option<&str>) -> Result<()> {
        self.expect_phase(PrunePhase::Confirm, "confirm")?;
        self.controller.advance(PruneEvent::Confirmed);

        if let SwitchPlan::Switch { target, dirty } = plan {
            self.controller
                .report(format!("Switching to {target} branch..."));
            if let Err(e) = self.switch_to(target, *dirty, stash_message).await {
                warn!(error = %e, %target, "could not switch branches before deleting");
                self.controller
                    .report(format!("Error switching to {target}: {e}"));
                self.controller.advance(PruneEvent::Failed);
                return Ok(());
            }
        }

        self.controller.report("Removing local branches...");
        let mut report = DeletionReport::default();
        for branch in &self.selected {
            match self.repo.delete_branch(branch).await {
                Ok(()) => {
                    info!(%branch, "deleted branch");
                    report.deleted.push(branch.clone());
                }
                Err(e) => {
                    warn!(%branch, error = %e, "failed to delete branch");
                    report.failed.push((branch.clone(), e.to_string()));
                }
            }
        }

        self.controller.report(if report.failed.is_empty() {
            format!("Deleted {} branch(es).", report.deleted.len())
        } else {
            format!(
                "Deleted {} branch(es), {} failed.",
                report.deleted.len(),
                report.failed.len()
            )
        });
        self.report = report;
        self.controller.advance(PruneEvent::Removed);
        Ok(())
    }

    async fn switch_to(
        &self,
        target: &str,
        dirty: bool,
        stash_message: Option<&str>,
    ) -> Result<()> {
        if dirty {
            self.repo.stash(stash_message).await?;
        }
        self.repo.checkout(target).await
    }

    /// Wait for the auto-exit of a terminal phase
    pub async fn wait_for_exit(&self) -> bool {
        self.controller.wait_for_exit().await
    }
}

/// Format a commit time as `M/D/YY h:mm AM`
///
/// Uses the committer's own UTC offset.
pub fn format_commit_time(time: &DateTime<FixedOffset>) -> String {
    time.format("%-m/%-d/%y %-I:%M %p").to_string()
}

/// Plain-text selection label for a branch
pub fn branch_label(branch: &BranchRef) -> String {
    let date = branch
        .last_commit
        .as_ref()
        .map_or_else(|| UNKNOWN.to_string(), format_commit_time);
    let (ahead, behind) = branch.divergence.map_or_else(
        || (UNKNOWN.to_string(), UNKNOWN.to_string()),
        |d| (d.ahead.to_string(), d.behind.to_string()),
    );
    format!(
        "{} (last commit: {date} | diff: ↑{ahead} ↓{behind})",
        branch.name
    )
}
