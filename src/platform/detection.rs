//! Repository coordinates from a remote URL

use crate::error::{Error, Result};
use crate::types::PlatformConfig;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// scp-like ssh form: `git@host:owner/repo.git`
static SCP_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[^@/]+@)?([^:/]+):([^/]+)/([^/]+?)(?:\.git)?/?$")
        .expect("scp-like remote regex is valid")
});

/// Parse owner, repo and (non-github.com) host from a remote URL
///
/// Supports `https://`, `ssh://` and scp-like `git@host:owner/repo` forms.
pub fn parse_repo_info(remote_url: &str) -> Result<PlatformConfig> {
    let remote_url = remote_url.trim();

    let (host, owner, repo) = if let Ok(url) = Url::parse(remote_url) {
        let host = url
            .host_str()
            .ok_or_else(|| unsupported(remote_url))?
            .to_string();
        let mut segments = url
            .path_segments()
            .ok_or_else(|| unsupported(remote_url))?
            .filter(|s| !s.is_empty());
        let (Some(owner), Some(repo), None) = (segments.next(), segments.next(), segments.next())
        else {
            return Err(unsupported(remote_url));
        };
        (host, owner.to_string(), repo.to_string())
    } else if let Some(caps) = SCP_LIKE.captures(remote_url) {
        (caps[1].to_string(), caps[2].to_string(), caps[3].to_string())
    } else {
        return Err(unsupported(remote_url));
    };

    let repo = repo.strip_suffix(".git").unwrap_or(&repo).to_string();
    let host = (host != "github.com").then_some(host);

    Ok(PlatformConfig { owner, repo, host })
}

fn unsupported(remote_url: &str) -> Error {
    Error::PrSource(format!("cannot determine GitHub repository from remote URL: {remote_url}"))
}
