//! Core types for git-groom

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How a local branch relates to its upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackingState {
    /// Has an upstream and the upstream still exists
    TrackedPresent,
    /// Had an upstream that has since been deleted
    TrackedGone,
    /// No remote branch of the same name
    Untracked,
}

impl TrackingState {
    /// Whether a branch in this state belongs in the orphan set
    pub const fn is_orphaned(self) -> bool {
        matches!(self, Self::TrackedGone | Self::Untracked)
    }
}

impl std::fmt::Display for TrackingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TrackedPresent => write!(f, "tracked"),
            Self::TrackedGone => write!(f, "gone"),
            Self::Untracked => write!(f, "untracked"),
        }
    }
}

/// Commit-count divergence between a branch and a reference branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    /// Commits on the branch that are not on the reference
    pub ahead: u32,
    /// Commits on the reference that are not on the branch
    pub behind: u32,
}

/// A local branch with the metadata gathered during reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    /// Branch name (unique among local branches)
    pub name: String,
    /// Committer date of the tip commit (`None` when the lookup failed)
    pub last_commit: Option<DateTime<FixedOffset>>,
    /// Divergence against the default branch (`None` when the lookup failed)
    pub divergence: Option<Divergence>,
    /// Upstream relationship
    pub tracking: TrackingState,
}

impl BranchRef {
    /// Create a branch ref with no metadata resolved yet
    pub fn new(name: impl Into<String>, tracking: TrackingState) -> Self {
        Self {
            name: name.into(),
            last_commit: None,
            divergence: None,
            tracking,
        }
    }
}

/// Deduplicated set of orphaned branches, keyed by name
///
/// Always derived fresh by the reconciliation engine. Iteration order is by
/// name, which callers may rely on for display but not for semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanSet {
    branches: BTreeMap<String, BranchRef>,
}

impl OrphanSet {
    /// Empty orphan set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a branch; an existing entry with the same name is replaced
    pub fn insert(&mut self, branch: BranchRef) {
        self.branches.insert(branch.name.clone(), branch);
    }

    /// Number of orphaned branches
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Whether there is nothing to prune
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }

    /// Membership by branch name
    pub fn contains(&self, name: &str) -> bool {
        self.branches.contains_key(name)
    }

    /// Look up a branch by name
    pub fn get(&self, name: &str) -> Option<&BranchRef> {
        self.branches.get(name)
    }

    /// Iterate branches in name order
    pub fn iter(&self) -> impl Iterator<Item = &BranchRef> {
        self.branches.values()
    }

    /// Branch names in name order
    pub fn names(&self) -> Vec<&str> {
        self.branches.keys().map(String::as_str).collect()
    }
}

impl FromIterator<BranchRef> for OrphanSet {
    fn from_iter<I: IntoIterator<Item = BranchRef>>(iter: I) -> Self {
        let mut set = Self::new();
        for branch in iter {
            set.insert(branch);
        }
        set
    }
}

impl IntoIterator for OrphanSet {
    type Item = BranchRef;
    type IntoIter = std::collections::btree_map::IntoValues<String, BranchRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.branches.into_values()
    }
}

/// A pull request as returned by a PR source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Head branch name
    #[serde(rename = "headRefName")]
    pub head_ref: String,
    /// Web URL for the PR
    #[serde(default)]
    pub url: Option<String>,
}

/// Filter passed to a PR source; only open PRs are ever listed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrFilter {
    /// Only PRs targeting this base branch
    pub base: Option<String>,
}

/// A git remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Fetch URL
    pub url: String,
}

/// Repository location and upstreams, shown before destructive flows
#[derive(Debug, Clone)]
pub struct RepoInfo {
    /// Top-level directory of the working tree
    pub root: PathBuf,
    /// Configured remotes
    pub remotes: Vec<GitRemote>,
}

/// GitHub repository coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com)
    pub host: Option<String>,
}
