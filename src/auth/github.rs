//! GitHub token discovery

use super::AuthSource;
use crate::error::{Error, Result};
use crate::gateway::{CommandGateway, CommandLine};
use tracing::debug;

/// Environment variables checked for a token, in order
const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// A GitHub token and where it came from
#[derive(Clone)]
pub struct GitHubAuthConfig {
    /// API token
    pub token: String,
    /// Where the token was found
    pub source: AuthSource,
}

impl std::fmt::Debug for GitHubAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubAuthConfig")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Pick the first non-empty token from `lookup` over the known variables
pub fn token_from_env<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    TOKEN_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

/// Find a GitHub token: environment first, then `gh auth token`
pub async fn get_github_auth(gateway: &dyn CommandGateway) -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env(|var| std::env::var(var).ok()) {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
        });
    }

    let out = gateway
        .run(&CommandLine::new("gh").args(["auth", "token"]))
        .await
        .map_err(|e| {
            Error::Auth(format!(
                "no GITHUB_TOKEN/GH_TOKEN set and `gh auth token` failed: {e}"
            ))
        })?;

    let token = out.stdout.trim().to_string();
    if token.is_empty() {
        return Err(Error::Auth("`gh auth token` returned no token".to_string()));
    }

    debug!("using GitHub token from gh CLI");
    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
    })
}
