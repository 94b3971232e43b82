//! Branch reconciliation engine
//!
//! Two-phase pattern:
//! 1. Detect - fetch with prune, list branches, combine signals (structural,
//!    any failure aborts)
//! 2. Enrich - per-branch commit time and divergence (supplementary, each
//!    failure degrades that field to unknown)

mod signals;

pub use signals::{missing_on_remote, orphan_candidates};

use crate::error::Result;
use crate::repo::GitRepo;
use crate::types::{BranchRef, OrphanSet};
use futures::StreamExt;
use tracing::{debug, info, warn};

/// Default number of branches inspected concurrently
pub const DEFAULT_LOOKUP_CONCURRENCY: usize = 8;

/// Options for a reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Default branch name used when the remote HEAD cannot be resolved
    pub fallback_default_branch: String,
    /// Upper bound on concurrent per-branch lookups
    pub lookup_concurrency: usize,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            fallback_default_branch: "main".to_string(),
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

/// Result of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Orphaned branches with their metadata
    pub orphans: OrphanSet,
    /// Remote default branch the divergence was measured against
    pub default_branch: String,
}

/// Compute the set of orphaned local branches
///
/// An empty set is a valid result meaning there is nothing to prune.
pub async fn compute_orphaned_branches(
    repo: &GitRepo,
    options: &ReconcileOptions,
) -> Result<OrphanSet> {
    Ok(reconcile(repo, options).await?.orphans)
}

/// Compute orphaned branches and report the default branch that was used
pub async fn reconcile(repo: &GitRepo, options: &ReconcileOptions) -> Result<Reconciliation> {
    repo.fetch_prune().await?;

    let local = repo.local_branches().await?;
    let remote = repo.remote_branches().await?;
    let verbose = repo.verbose_branches().await?;
    let gone = crate::repo::parse::parse_gone_branches(&verbose);

    let candidates = orphan_candidates(&local, &remote, &gone);
    debug!(
        local = local.len(),
        remote = remote.len(),
        gone = gone.len(),
        candidates = candidates.len(),
        "combined orphan signals"
    );

    let default_branch = repo
        .default_branch(&options.fallback_default_branch)
        .await;

    if candidates.is_empty() {
        info!("no orphaned branches");
        return Ok(Reconciliation {
            orphans: candidates,
            default_branch,
        });
    }

    let reference = format!("{}/{default_branch}", repo.remote());
    let orphans = enrich(repo, candidates, &reference, options.lookup_concurrency).await;
    info!(count = orphans.len(), %default_branch, "reconciled orphaned branches");

    Ok(Reconciliation {
        orphans,
        default_branch,
    })
}

/// Fill in commit time and divergence for every candidate
///
/// Lookups are read-only, so they run concurrently. Results are keyed by
/// branch name, making the output independent of completion order.
async fn enrich(
    repo: &GitRepo,
    candidates: OrphanSet,
    reference: &str,
    concurrency: usize,
) -> OrphanSet {
    futures::stream::iter(candidates)
        .map(|branch| inspect_branch(repo, branch, reference))
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect()
}

async fn inspect_branch(repo: &GitRepo, mut branch: BranchRef, reference: &str) -> BranchRef {
    let (time, divergence) = tokio::join!(
        repo.last_commit_time(&branch.name),
        repo.divergence(&branch.name, reference)
    );

    match time {
        Ok(t) => branch.last_commit = Some(t),
        Err(e) => warn!(branch = %branch.name, error = %e, "could not read last commit date"),
    }
    match divergence {
        Ok(d) => branch.divergence = Some(d),
        Err(e) => warn!(
            branch = %branch.name,
            %reference,
            error = %e,
            "could not compute divergence"
        ),
    }

    branch
}
