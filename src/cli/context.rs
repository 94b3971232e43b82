//! Shared command context for CLI flows

use git_groom::config::{Config, load_config};
use git_groom::error::Result;
use git_groom::gateway::{CommandGateway, SystemGateway};
use git_groom::repo::GitRepo;
use std::path::Path;
use std::sync::Arc;

/// Setup shared by the prune and deps flows
///
/// Creating it touches nothing in the repository; the repository check
/// happens when a flow starts.
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Gateway all external commands go through
    pub gateway: Arc<dyn CommandGateway>,
    /// Git operations on the working tree
    pub repo: GitRepo,
}

impl CommandContext {
    /// Load config and wire the gateway for `path`
    pub fn new(path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config = load_config(config_path)?;
        let gateway: Arc<dyn CommandGateway> = Arc::new(SystemGateway::in_dir(path));
        let repo = GitRepo::new(Arc::clone(&gateway), config.remote.clone());
        Ok(Self {
            config,
            gateway,
            repo,
        })
    }
}
