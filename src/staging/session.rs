//! Merge session - drives the merge workflow against a repository

use crate::error::{Error, Result};
use crate::platform::PullRequestSource;
use crate::repo::GitRepo;
use crate::staging::DependencyFilter;
use crate::types::{PrFilter, PullRequest};
use crate::workflow::{MergeEvent, MergeFlow, MergePhase, PhaseController};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Stash message used when setup has to put work aside
const SETUP_STASH_MESSAGE: &str = "git-groom: before merging dependency updates";

/// Options for a merge session
#[derive(Debug, Clone)]
pub struct StagingOptions {
    /// Integration branch the PRs are merged into
    pub staging_branch: String,
    /// Only list PRs targeting this base branch
    pub pr_base: Option<String>,
    /// Delay before a terminal phase auto-exits
    pub exit_delay: Duration,
}

impl Default for StagingOptions {
    fn default() -> Self {
        Self {
            staging_branch: "staging".to_string(),
            pr_base: Some("main".to_string()),
            exit_delay: Duration::from_millis(1500),
        }
    }
}

/// One run of the merge flow
///
/// Owns the loaded PR list and the phase controller for its lifetime; drop it
/// when the flow is dismissed.
pub struct MergeSession {
    repo: GitRepo,
    source: Arc<dyn PullRequestSource>,
    filter: DependencyFilter,
    options: StagingOptions,
    items: Vec<PullRequest>,
    merged: Vec<u64>,
    skipped: Vec<u64>,
    controller: PhaseController<MergeFlow>,
}

impl MergeSession {
    /// Create a session in the `init` phase
    pub fn new(
        repo: GitRepo,
        source: Arc<dyn PullRequestSource>,
        filter: DependencyFilter,
        options: StagingOptions,
    ) -> Self {
        let controller = PhaseController::new(MergeFlow::new(options.exit_delay));
        Self {
            repo,
            source,
            filter,
            options,
            items: Vec::new(),
            merged: Vec::new(),
            skipped: Vec::new(),
            controller,
        }
    }

    /// Current phase
    pub const fn phase(&self) -> MergePhase {
        self.controller.phase()
    }

    /// Index of the PR being worked on
    pub const fn cursor(&self) -> usize {
        self.controller.cursor()
    }

    /// Latest status line
    pub fn log(&self) -> &str {
        self.controller.status()
    }

    /// PRs loaded for this session, in source order
    pub fn items(&self) -> &[PullRequest] {
        &self.items
    }

    /// The PR at the cursor, if any remain
    pub fn current_item(&self) -> Option<&PullRequest> {
        self.items.get(self.cursor())
    }

    /// Numbers of PRs merged so far
    pub fn merged(&self) -> &[u64] {
        &self.merged
    }

    /// Numbers of PRs skipped so far
    pub fn skipped(&self) -> &[u64] {
        &self.skipped
    }

    /// Integration branch name
    pub fn staging_branch(&self) -> &str {
        &self.options.staging_branch
    }

    /// The underlying controller
    pub const fn controller(&self) -> &PhaseController<MergeFlow> {
        &self.controller
    }

    fn expect_phase(&self, expected: MergePhase, name: &'static str) -> Result<()> {
        if self.phase() == expected {
            Ok(())
        } else {
            Err(Error::InvalidPhase {
                expected: name,
                actual: self.phase().to_string(),
            })
        }
    }

    fn current(&self) -> Result<PullRequest> {
        self.current_item()
            .cloned()
            .ok_or_else(|| Error::Internal(format!("no PR at position {}", self.cursor())))
    }

    /// Run setup and loading until the session needs operator input
    ///
    /// Ends in `confirm`, `done` (nothing to merge) or `error`.
    pub async fn start(&mut self) -> Result<()> {
        self.setup().await?;
        if self.phase() == MergePhase::Loading {
            self.load().await?;
        }
        Ok(())
    }

    /// Put uncommitted work aside, check out and update the integration branch
    ///
    /// Any failure moves the session to `error`; there is no retry.
    pub async fn setup(&mut self) -> Result<()> {
        self.expect_phase(MergePhase::Init, "init")?;
        self.controller.advance(MergeEvent::Start);

        let branch = self.options.staging_branch.clone();
        self.controller
            .report(format!("🔁 Checking out {branch} branch..."));

        match self.prepare_branch(&branch).await {
            Ok(()) => self.controller.advance(MergeEvent::SetupSucceeded),
            Err(e) => {
                warn!(error = %e, %branch, "setup failed");
                self.controller.report(format!("Error during setup: {e}"));
                self.controller.advance(MergeEvent::Failed);
            }
        }
        Ok(())
    }

    async fn prepare_branch(&self, branch: &str) -> Result<()> {
        if self.repo.has_uncommitted_changes().await? {
            info!("stashing uncommitted changes before setup");
            self.repo.stash(Some(SETUP_STASH_MESSAGE)).await?;
        }
        self.repo.checkout(branch).await?;
        self.repo.pull().await
    }

    /// Fetch open PRs and keep the dependency updates
    pub async fn load(&mut self) -> Result<()> {
        self.expect_phase(MergePhase::Loading, "loading")?;
        self.controller.report("📡 Fetching open PRs...");

        let filter = PrFilter {
            base: self.options.pr_base.clone(),
        };
        match self.source.list_pull_requests(&filter).await {
            Ok(prs) => {
                let total = prs.len();
                self.items = self.filter.apply(prs);
                info!(total, matched = self.items.len(), "loaded dependency update PRs");
                if self.items.is_empty() {
                    self.controller
                        .report("🚫 No matching dependency update PRs found.");
                }
                self.controller.advance(MergeEvent::Loaded {
                    count: self.items.len(),
                });
            }
            Err(e) => {
                warn!(error = %e, "failed to list PRs");
                self.controller.report(format!("Error fetching PRs: {e}"));
                self.controller.advance(MergeEvent::Failed);
            }
        }
        Ok(())
    }

    /// Merge the PR at the cursor into the integration branch
    ///
    /// On failure the session enters `conflict` and leaves the merge in the
    /// working tree; it is never aborted automatically.
    pub async fn merge_current_item(&mut self) -> Result<()> {
        self.expect_phase(MergePhase::Confirm, "confirm")?;
        let pr = self.current()?;
        self.controller.advance(MergeEvent::Accept);

        self.controller
            .report(format!("📥 Fetching branch {}...", pr.head_ref));
        let result = match self.repo.fetch_branch(&pr.head_ref).await {
            Ok(()) => {
                self.controller.report(format!(
                    "🔀 Merging {} into {}...",
                    pr.head_ref, self.options.staging_branch
                ));
                self.repo.merge_no_ff(&pr.head_ref).await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.controller.report(format!(
                    "✅ Merged {} into {}.",
                    pr.head_ref, self.options.staging_branch
                ));
                self.merged.push(pr.number);
                self.controller.advance(MergeEvent::Merged);
            }
            Err(e) => {
                let conflict = Error::MergeConflict {
                    number: pr.number,
                    branch: pr.head_ref.clone(),
                };
                warn!(error = %e, "{conflict}");
                self.controller.report(format!(
                    "❌ {conflict}. Resolve the conflicts manually, then continue."
                ));
                self.controller.advance(MergeEvent::MergeFailed);
            }
        }
        Ok(())
    }

    /// Skip the PR at the cursor
    pub fn skip(&mut self) -> Result<()> {
        self.expect_phase(MergePhase::Confirm, "confirm")?;
        let pr = self.current()?;
        self.controller
            .report(format!("⏭️  Skipped PR #{} ({}).", pr.number, pr.head_ref));
        self.skipped.push(pr.number);
        self.controller.advance(MergeEvent::Skip);
        Ok(())
    }

    /// Finalize the conflicted merge after manual resolution
    ///
    /// Stays in `conflict` when git still reports unresolved paths.
    pub async fn resume(&mut self) -> Result<()> {
        self.expect_phase(MergePhase::Conflict, "conflict")?;
        let pr = self.current()?;
        self.controller.report(format!(
            "Attempting to continue merge for {}...",
            pr.head_ref
        ));

        match self.repo.merge_continue().await {
            Ok(()) => {
                self.controller
                    .report(format!("✅ Resolved merge for {}.", pr.head_ref));
                self.merged.push(pr.number);
                self.controller.advance(MergeEvent::Resumed);
            }
            Err(e) => {
                warn!(error = %e, branch = %pr.head_ref, "merge continuation failed");
                self.controller.report(format!(
                    "Merge continuation failed for {}. Make sure conflicts are resolved, then continue again.",
                    pr.head_ref
                ));
                self.controller.advance(MergeEvent::ResumeFailed);
            }
        }
        Ok(())
    }

    /// Answer the push step; `push = false` keeps the merges local
    ///
    /// A failed push is reported in the log; the session still finishes.
    pub async fn finish(&mut self, push: bool) -> Result<()> {
        self.expect_phase(MergePhase::PushConfirmation, "push-confirmation")?;
        let branch = self.options.staging_branch.clone();

        if push {
            self.controller.report(format!("🚀 Pushing {branch}..."));
            match self.repo.push(&branch).await {
                Ok(()) => self.controller.report(format!(
                    "{branch} pushed to {}.",
                    self.repo.remote()
                )),
                Err(e) => {
                    warn!(error = %e, %branch, "push failed");
                    self.controller
                        .report(format!("Error pushing {branch}: {e}"));
                }
            }
        } else {
            self.controller
                .report(format!("💾 Skipped push. {branch} is updated locally."));
        }

        self.controller.advance(MergeEvent::PushResolved);
        Ok(())
    }

    /// Cancel the session; only honored while waiting on the operator
    ///
    /// A merge that already ran stays applied.
    pub fn cancel(&mut self) {
        self.controller.advance(MergeEvent::Cancel);
    }

    /// Wait for the auto-exit of a terminal phase
    pub async fn wait_for_exit(&self) -> bool {
        self.controller.wait_for_exit().await
    }
}
