//! GitHub REST PR source

use crate::error::{Error, Result};
use crate::platform::PullRequestSource;
use crate::types::{PlatformConfig, PrFilter, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

/// Page size for PR listings (GitHub's maximum)
const PAGE_SIZE: u8 = 100;

/// Lists PRs through the GitHub REST API
///
/// Selected with `pr_source = "github-api"`; needs a token from [`crate::auth`].
pub struct GitHubPrSource {
    client: Octocrab,
    target: PlatformConfig,
}

impl GitHubPrSource {
    /// Connect to the repository described by `target`
    ///
    /// Enterprise hosts are reached through their `/api/v3` endpoint.
    pub fn connect(token: &str, target: PlatformConfig) -> Result<Self> {
        let api_error = |e: octocrab::Error| Error::GitHubApi(e.to_string());
        let builder = Octocrab::builder().personal_token(token.to_owned());
        let builder = match target.host.as_deref() {
            Some(host) => builder
                .base_uri(format!("https://{host}/api/v3"))
                .map_err(api_error)?,
            None => builder,
        };

        Ok(Self {
            client: builder.build().map_err(api_error)?,
            target,
        })
    }

    /// Repository this source lists PRs for
    pub const fn target(&self) -> &PlatformConfig {
        &self.target
    }
}

fn to_pull_request(pr: octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        head_ref: pr.head.ref_field,
        url: pr.html_url.map(String::from),
    }
}

#[async_trait]
impl PullRequestSource for GitHubPrSource {
    async fn list_pull_requests(&self, filter: &PrFilter) -> Result<Vec<PullRequest>> {
        debug!(
            owner = %self.target.owner,
            repo = %self.target.repo,
            base = ?filter.base,
            "listing open PRs"
        );

        let handler = self.client.pulls(&self.target.owner, &self.target.repo);
        let mut request = handler
            .list()
            .state(octocrab::params::State::Open)
            .per_page(PAGE_SIZE);
        if let Some(base) = filter.base.as_deref() {
            request = request.base(base);
        }
        let page = request.send().await?;

        let result: Vec<PullRequest> = page.into_iter().map(to_pull_request).collect();

        debug!(count = result.len(), "listed PRs");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_enterprise_host() {
        let target = PlatformConfig {
            owner: "team".to_string(),
            repo: "tool".to_string(),
            host: Some("ghe.example.com".to_string()),
        };
        let source = GitHubPrSource::connect("token", target.clone()).unwrap();
        assert_eq!(source.target(), &target);
    }
}
