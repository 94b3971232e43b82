//! Parsers for git's text output
//!
//! Pure functions only. Every parser tolerates trailing newlines, blank lines
//! and CRLF line endings.

use crate::types::{Divergence, GitRemote};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::sync::LazyLock;

/// Tracking annotation of a branch whose upstream was deleted.
///
/// Matches the bare `[gone]` form as well as `[origin/feat: gone]`.
static GONE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(?:[^\]]*: )?gone\]").expect("gone marker regex is valid")
});

/// Split `git branch --format=%(refname:short)` output into names.
///
/// Pseudo-entries such as `(HEAD detached at 34114dc)` or
/// `(no branch, rebasing feat)` are not branches and are dropped.
pub fn parse_branch_names(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('('))
        .map(String::from)
        .collect()
}

/// Parse remote branch names and strip the `<remote>/` prefix.
///
/// The symbolic `HEAD` entry (printed as `origin/HEAD` or bare `origin`
/// depending on the git version) is not a branch and is dropped.
pub fn parse_remote_branch_names(stdout: &str, remote: &str) -> Vec<String> {
    let prefix = format!("{remote}/");
    parse_branch_names(stdout)
        .into_iter()
        .filter(|name| name != remote)
        .map(|name| match name.strip_prefix(&prefix) {
            Some(stripped) => stripped.to_string(),
            None => name,
        })
        .filter(|name| name != "HEAD")
        .collect()
}

/// Extract branches whose upstream is gone from `git branch -vv` output.
///
/// The branch name is the first whitespace-delimited token, after skipping
/// the current-branch (`*`) or other-worktree (`+`) marker.
pub fn parse_gone_branches(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| GONE_MARKER.is_match(line))
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            match tokens.next()? {
                "*" | "+" => tokens.next(),
                first => Some(first),
            }
        })
        .filter(|name| !name.starts_with('('))
        .map(String::from)
        .collect()
}

/// Parse `git rev-list --left-right --count a...b` output.
pub fn parse_divergence(stdout: &str) -> Option<Divergence> {
    let mut parts = stdout.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Divergence { ahead, behind })
}

/// Parse a strict ISO-8601 committer date (`git log --format=%cI`).
pub fn parse_commit_time(stdout: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(stdout.trim()).ok()
}

/// Parse `git symbolic-ref refs/remotes/<remote>/HEAD` into a branch name.
pub fn parse_remote_head(stdout: &str, remote: &str) -> Option<String> {
    let target = stdout.trim();
    let name = target
        .strip_prefix("refs/remotes/")
        .unwrap_or(target)
        .strip_prefix(&format!("{remote}/"))?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Parse `git remote -v`, keeping one entry per remote (the fetch URL).
pub fn parse_remotes(stdout: &str) -> Vec<GitRemote> {
    let mut remotes: Vec<GitRemote> = Vec::new();
    for line in stdout.lines() {
        let mut parts = line.split_whitespace();
        let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
            continue;
        };
        if parts.next() == Some("(push)") || remotes.iter().any(|r| r.name == name) {
            continue;
        }
        remotes.push(GitRemote {
            name: name.to_string(),
            url: url.to_string(),
        });
    }
    remotes
}

/// Whether `git status --porcelain` reports any change.
pub fn is_dirty(stdout: &str) -> bool {
    !stdout.trim().is_empty()
}
