//! Configuration
//!
//! Every field has a default, so an absent or partial config file is valid.

mod storage;

pub use storage::{config_path, load_config, load_config_from};

use crate::error::Result;
use crate::reconcile::{DEFAULT_LOOKUP_CONCURRENCY, ReconcileOptions};
use crate::staging::{
    DEFAULT_BRANCH_PREFIX, DEFAULT_TITLE_PATTERN, DependencyFilter, StagingOptions,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Which implementation lists pull requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrSourceKind {
    /// The `gh` CLI
    #[default]
    Gh,
    /// The GitHub REST API
    GithubApi,
}

/// git-groom configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Remote used for fetch, push and prefix stripping
    pub remote: String,
    /// Default branch assumed when the remote HEAD cannot be resolved
    pub fallback_default_branch: String,
    /// Integration branch for dependency updates
    pub staging_branch: String,
    /// Base branch PRs are listed for
    pub pr_base: String,
    /// PR listing implementation
    pub pr_source: PrSourceKind,
    /// Title regex identifying dependency-update PRs
    pub dependency_title_pattern: String,
    /// Head branch prefix identifying dependency-update PRs
    pub dependency_branch_prefix: String,
    /// Auto-exit delay after the prune flow finishes, in milliseconds
    pub exit_delay_ms: u64,
    /// Auto-exit delay after the merge flow finishes, in milliseconds
    pub merge_exit_delay_ms: u64,
    /// Concurrent per-branch lookups during reconciliation
    pub lookup_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            fallback_default_branch: "main".to_string(),
            staging_branch: "staging".to_string(),
            pr_base: "main".to_string(),
            pr_source: PrSourceKind::Gh,
            dependency_title_pattern: DEFAULT_TITLE_PATTERN.to_string(),
            dependency_branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
            exit_delay_ms: 1000,
            merge_exit_delay_ms: 1500,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
        }
    }
}

impl Config {
    /// Options for the reconciliation engine
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            fallback_default_branch: self.fallback_default_branch.clone(),
            lookup_concurrency: self.lookup_concurrency,
        }
    }

    /// Options for the merge session
    pub fn staging_options(&self) -> StagingOptions {
        StagingOptions {
            staging_branch: self.staging_branch.clone(),
            pr_base: (!self.pr_base.is_empty()).then(|| self.pr_base.clone()),
            exit_delay: Duration::from_millis(self.merge_exit_delay_ms),
        }
    }

    /// Auto-exit delay for the prune flow
    pub const fn prune_exit_delay(&self) -> Duration {
        Duration::from_millis(self.exit_delay_ms)
    }

    /// Compile the dependency-update filter
    pub fn dependency_filter(&self) -> Result<DependencyFilter> {
        DependencyFilter::new(
            &self.dependency_title_pattern,
            self.dependency_branch_prefix.as_str(),
        )
    }
}
