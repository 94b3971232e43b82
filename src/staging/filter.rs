//! Dependency-update PR matching

use crate::error::{Error, Result};
use crate::types::PullRequest;
use regex::Regex;

/// Default title pattern: a parenthesized `deps` or `deps-dev` category
pub const DEFAULT_TITLE_PATTERN: &str = r"(?i)\(deps(-dev)?\)";

/// Default head branch prefix used by dependency bots
pub const DEFAULT_BRANCH_PREFIX: &str = "dependabot/";

/// Matches PRs opened by a dependency-update bot
///
/// A PR matches when its title matches the pattern or its head branch starts
/// with the prefix.
#[derive(Debug, Clone)]
pub struct DependencyFilter {
    title: Regex,
    branch_prefix: String,
}

impl DependencyFilter {
    /// Build a filter from a title regex and a branch prefix
    pub fn new(title_pattern: &str, branch_prefix: impl Into<String>) -> Result<Self> {
        let title = Regex::new(title_pattern).map_err(|e| {
            Error::Config(format!("invalid dependency title pattern {title_pattern:?}: {e}"))
        })?;
        Ok(Self {
            title,
            branch_prefix: branch_prefix.into(),
        })
    }

    /// Whether `pr` is a dependency update
    pub fn matches(&self, pr: &PullRequest) -> bool {
        self.title.is_match(&pr.title)
            || (!self.branch_prefix.is_empty() && pr.head_ref.starts_with(&self.branch_prefix))
    }

    /// Keep matching PRs, preserving source order
    pub fn apply(&self, prs: Vec<PullRequest>) -> Vec<PullRequest> {
        prs.into_iter().filter(|pr| self.matches(pr)).collect()
    }
}

impl Default for DependencyFilter {
    fn default() -> Self {
        Self {
            title: Regex::new(DEFAULT_TITLE_PATTERN).expect("default title pattern is valid"),
            branch_prefix: DEFAULT_BRANCH_PREFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr(number: u64, title: &str, head: &str) -> PullRequest {
        PullRequest {
            number,
            title: title.to_string(),
            head_ref: head.to_string(),
            url: None,
        }
    }

    #[test]
    fn test_title_marker_case_insensitive() {
        let filter = DependencyFilter::default();
        assert!(filter.matches(&pr(1, "chore(deps): bump serde", "renovate/serde")));
        assert!(filter.matches(&pr(2, "build(DEPS-DEV): bump jest", "x")));
        assert!(!filter.matches(&pr(3, "deps: bump serde", "x")));
    }

    #[test]
    fn test_branch_prefix() {
        let filter = DependencyFilter::default();
        assert!(filter.matches(&pr(1, "Bump lodash", "dependabot/npm_and_yarn/lodash")));
        assert!(!filter.matches(&pr(2, "Bump lodash", "feature/dependabot/lodash")));
    }

    #[test]
    fn test_empty_prefix_matches_nothing_by_branch() {
        let filter = DependencyFilter::new(DEFAULT_TITLE_PATTERN, "").unwrap();
        assert!(!filter.matches(&pr(1, "fix bug", "anything")));
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let err = DependencyFilter::new("(deps", "dependabot/").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_apply_preserves_order() {
        let filter = DependencyFilter::default();
        let kept = filter.apply(vec![
            pr(7, "bump b (deps)", "x"),
            pr(3, "docs", "docs"),
            pr(5, "bump a", "dependabot/cargo/a"),
        ]);
        let numbers: Vec<u64> = kept.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![7, 5]);
    }
}
