//! PR source backed by the `gh` CLI

use crate::error::{Error, Result};
use crate::gateway::{CommandGateway, CommandLine};
use crate::platform::PullRequestSource;
use crate::types::{PrFilter, PullRequest};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// JSON fields requested from `gh pr list`
const PR_FIELDS: &str = "number,title,headRefName,url";

/// Maximum number of PRs requested in one listing
const PR_LIMIT: &str = "100";

/// Lists PRs with `gh pr list --json`
pub struct GhCliSource {
    gateway: Arc<dyn CommandGateway>,
}

impl GhCliSource {
    /// Create a source that runs `gh` through `gateway`
    pub fn new(gateway: Arc<dyn CommandGateway>) -> Self {
        Self { gateway }
    }

    /// Command line for a listing
    pub fn list_command(filter: &PrFilter) -> CommandLine {
        let mut cmd = CommandLine::new("gh").args(["pr", "list"]);
        if let Some(ref base) = filter.base {
            cmd = cmd.args(["--base", base.as_str()]);
        }
        cmd.args(["--state", "open"])
            .args(["--json", PR_FIELDS, "--limit", PR_LIMIT])
            .env("GH_PROMPT_DISABLED", "1")
    }
}

/// Decode `gh pr list --json` output
pub fn parse_pr_list(stdout: &str) -> Result<Vec<PullRequest>> {
    serde_json::from_str(stdout).map_err(|e| Error::PrSource(format!("invalid gh output: {e}")))
}

#[async_trait]
impl PullRequestSource for GhCliSource {
    async fn list_pull_requests(&self, filter: &PrFilter) -> Result<Vec<PullRequest>> {
        let out = self.gateway.run(&Self::list_command(filter)).await?;
        let prs = parse_pr_list(&out.stdout)?;
        debug!(count = prs.len(), "listed PRs via gh");
        Ok(prs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_command() {
        let filter = PrFilter {
            base: Some("main".to_string()),
        };
        assert_eq!(
            GhCliSource::list_command(&filter).to_string(),
            "gh pr list --base main --state open --json number,title,headRefName,url --limit 100"
        );
    }

    #[test]
    fn test_list_command_without_base() {
        let cmd = GhCliSource::list_command(&PrFilter::default());
        assert!(!cmd.args.contains(&"--base".to_string()));
    }

    #[test]
    fn test_parse_pr_list() {
        let json = r#"[
            {"number": 12, "title": "Bump serde (deps)", "headRefName": "dependabot/cargo/serde", "url": "https://github.com/acme/w/pull/12"},
            {"number": 13, "title": "Fix", "headRefName": "fix"}
        ]"#;
        let prs = parse_pr_list(json).unwrap();
        assert_eq!(prs.len(), 2);
        assert_eq!(prs[0].head_ref, "dependabot/cargo/serde");
        assert_eq!(prs[1].url, None);
    }

    #[test]
    fn test_parse_garbage_is_pr_source_error() {
        assert!(matches!(
            parse_pr_list("not json"),
            Err(Error::PrSource(_))
        ));
    }
}
