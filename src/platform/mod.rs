//! Pull request sources
//!
//! The merge flow only needs a list of PRs. Two sources are provided: the
//! `gh` CLI (default, uses whatever login `gh` already has) and the GitHub
//! REST API through octocrab.

mod detection;
mod gh;
mod github;

pub use detection::parse_repo_info;
pub use gh::GhCliSource;
pub use github::GitHubPrSource;

use crate::auth::get_github_auth;
use crate::config::{Config, PrSourceKind};
use crate::error::{Error, Result};
use crate::repo::GitRepo;
use crate::types::{PrFilter, PullRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Lists pull requests as structured data
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// List PRs matching `filter`, in the platform's order
    async fn list_pull_requests(&self, filter: &PrFilter) -> Result<Vec<PullRequest>>;
}

/// Build the PR source selected in `config`
pub async fn create_pr_source(
    config: &Config,
    repo: &GitRepo,
    gateway: Arc<dyn crate::gateway::CommandGateway>,
) -> Result<Arc<dyn PullRequestSource>> {
    match config.pr_source {
        PrSourceKind::Gh => Ok(Arc::new(GhCliSource::new(gateway))),
        PrSourceKind::GithubApi => {
            let remotes = repo.remotes().await?;
            let remote = remotes
                .iter()
                .find(|r| r.name == config.remote)
                .ok_or_else(|| {
                    Error::PrSource(format!("remote '{}' is not configured", config.remote))
                })?;
            let info = parse_repo_info(&remote.url)?;
            let auth = get_github_auth(gateway.as_ref()).await?;
            let service = GitHubPrSource::connect(&auth.token, info)?;
            Ok(Arc::new(service))
        }
    }
}
