//! Git repository access through the command gateway
//!
//! [`GitRepo`] maps each git operation the tool needs onto one command line
//! and parses the result. It holds no state besides the gateway and the
//! remote name, so it is cheap to clone into concurrent lookups.

pub mod parse;

use crate::error::{Error, Result};
use crate::gateway::{CommandGateway, CommandLine, CommandOutput};
use crate::types::{Divergence, GitRemote, RepoInfo};
use chrono::{DateTime, FixedOffset};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Git operations for one working tree
#[derive(Clone)]
pub struct GitRepo {
    gateway: Arc<dyn CommandGateway>,
    remote: String,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("remote", &self.remote)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Create a repo handle that talks to `remote`
    pub fn new(gateway: Arc<dyn CommandGateway>, remote: impl Into<String>) -> Self {
        Self {
            gateway,
            remote: remote.into(),
        }
    }

    /// Remote name used for fetch, push and prefix stripping
    pub fn remote(&self) -> &str {
        &self.remote
    }

    async fn git<I, S>(&self, args: I) -> Result<CommandOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.gateway.run(&CommandLine::git(args)).await
    }

    // =========================================================================
    // Repository discovery
    // =========================================================================

    /// Top-level directory of the working tree
    ///
    /// Any failure here means there is no repository to operate on.
    pub async fn toplevel(&self) -> Result<PathBuf> {
        match self.git(["rev-parse", "--show-toplevel"]).await {
            Ok(out) => Ok(PathBuf::from(out.stdout.trim())),
            Err(Error::CommandFailed { stderr, .. }) => Err(Error::NotARepository(stderr)),
            Err(e) => Err(e),
        }
    }

    /// Configured remotes
    pub async fn remotes(&self) -> Result<Vec<GitRemote>> {
        let out = self.git(["remote", "-v"]).await?;
        Ok(parse::parse_remotes(&out.stdout))
    }

    /// Repository root and remotes; fails with `NotARepository` outside a repo
    pub async fn info(&self) -> Result<RepoInfo> {
        let root = self.toplevel().await?;
        let remotes = self.remotes().await?;
        Ok(RepoInfo { root, remotes })
    }

    // =========================================================================
    // Branch listings
    // =========================================================================

    /// Fetch with pruning so stale remote-tracking refs disappear first
    pub async fn fetch_prune(&self) -> Result<()> {
        self.git(["fetch", "--prune", self.remote.as_str()]).await?;
        Ok(())
    }

    /// Local branch names
    pub async fn local_branches(&self) -> Result<Vec<String>> {
        let out = self.git(["branch", "--format=%(refname:short)"]).await?;
        Ok(parse::parse_branch_names(&out.stdout))
    }

    /// Remote branch names with the remote prefix stripped
    pub async fn remote_branches(&self) -> Result<Vec<String>> {
        let out = self
            .git(["branch", "-r", "--format=%(refname:short)"])
            .await?;
        Ok(parse::parse_remote_branch_names(&out.stdout, &self.remote))
    }

    /// Raw `git branch -vv` listing
    pub async fn verbose_branches(&self) -> Result<String> {
        Ok(self.git(["branch", "-vv"]).await?.stdout)
    }

    /// Resolve the remote's default branch
    ///
    /// Reads the remote HEAD symbolic ref. Never fails: when the pointer is
    /// missing or unreadable, logs a warning and returns `fallback`.
    pub async fn default_branch(&self, fallback: &str) -> String {
        let head_ref = format!("refs/remotes/{}/HEAD", self.remote);
        match self.git(["symbolic-ref", head_ref.as_str()]).await {
            Ok(out) => {
                if let Some(name) = parse::parse_remote_head(&out.stdout, &self.remote) {
                    debug!(default_branch = %name, "resolved remote default branch");
                    return name;
                }
                warn!(
                    output = %out.stdout.trim(),
                    fallback,
                    "unexpected remote HEAD target, using fallback default branch"
                );
            }
            Err(e) => {
                warn!(
                    error = %e,
                    fallback,
                    "could not resolve remote default branch, using fallback"
                );
            }
        }
        fallback.to_string()
    }

    // =========================================================================
    // Per-branch lookups (read-only)
    // =========================================================================

    /// Committer date of the tip of `branch`
    pub async fn last_commit_time(&self, branch: &str) -> Result<DateTime<FixedOffset>> {
        let out = self
            .git(["log", "-1", "--format=%cI", branch, "--"])
            .await?;
        parse::parse_commit_time(&out.stdout).ok_or_else(|| Error::CommandFailed {
            command: format!("git log -1 --format=%cI {branch}"),
            stderr: format!("unparseable commit date: {}", out.stdout.trim()),
        })
    }

    /// Ahead/behind counts of `branch` against `reference`
    pub async fn divergence(&self, branch: &str, reference: &str) -> Result<Divergence> {
        let range = format!("{branch}...{reference}");
        let out = self
            .git(["rev-list", "--left-right", "--count", range.as_str()])
            .await?;
        parse::parse_divergence(&out.stdout).ok_or_else(|| Error::CommandFailed {
            command: format!("git rev-list --left-right --count {range}"),
            stderr: format!("unparseable counts: {}", out.stdout.trim()),
        })
    }

    // =========================================================================
    // Working tree state
    // =========================================================================

    /// Name of the checked-out branch (`HEAD` when detached)
    pub async fn current_branch(&self) -> Result<String> {
        let out = self.git(["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(out.stdout.trim().to_string())
    }

    /// Whether the working tree or index has uncommitted changes
    pub async fn has_uncommitted_changes(&self) -> Result<bool> {
        let out = self.git(["status", "--porcelain"]).await?;
        Ok(parse::is_dirty(&out.stdout))
    }

    /// Stash uncommitted work, optionally with a message
    pub async fn stash(&self, message: Option<&str>) -> Result<()> {
        match message {
            Some(msg) if !msg.trim().is_empty() => {
                self.git(["stash", "push", "-m", msg.trim()]).await?;
            }
            _ => {
                self.git(["stash", "push"]).await?;
            }
        }
        Ok(())
    }

    /// Check out a local branch
    pub async fn checkout(&self, branch: &str) -> Result<()> {
        self.git(["checkout", branch]).await?;
        Ok(())
    }

    /// Bring the current branch up to date with its upstream
    ///
    /// Merges rather than fast-forwards, so local commits that were never
    /// pushed survive an upstream that moved on.
    pub async fn pull(&self) -> Result<()> {
        self.git(["pull", "--no-rebase", "--no-edit"]).await?;
        Ok(())
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Force-delete a local branch
    pub async fn delete_branch(&self, branch: &str) -> Result<()> {
        self.git(["branch", "-D", branch]).await?;
        Ok(())
    }

    /// Fetch a single branch from the remote
    pub async fn fetch_branch(&self, branch: &str) -> Result<()> {
        self.git(["fetch", self.remote.as_str(), branch]).await?;
        Ok(())
    }

    /// Merge `<remote>/<branch>` into the current branch with a merge commit
    pub async fn merge_no_ff(&self, branch: &str) -> Result<()> {
        let source = format!("{}/{branch}", self.remote);
        self.git(["merge", "--no-ff", "--no-edit", source.as_str()])
            .await?;
        Ok(())
    }

    /// Finalize an in-progress merge without opening an editor
    pub async fn merge_continue(&self) -> Result<()> {
        let cmd = CommandLine::git(["merge", "--continue"]).env("GIT_EDITOR", "true");
        self.gateway.run(&cmd).await?;
        Ok(())
    }

    /// Push a local branch to the remote
    pub async fn push(&self, branch: &str) -> Result<()> {
        self.git(["push", self.remote.as_str(), branch]).await?;
        Ok(())
    }
}
