//! Error types for git-groom

use thiserror::Error;

/// Errors that can occur in git-groom operations
#[derive(Error, Debug)]
pub enum Error {
    /// The working directory is not inside a git repository
    #[error("not a git repository: {0}")]
    NotARepository(String),

    /// An external command exited with a non-zero status
    #[error("command failed: {command}: {stderr}")]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// Captured standard error
        stderr: String,
    },

    /// An external command could not be started at all
    #[error("failed to run {command}: {source}")]
    CommandSpawn {
        /// The command line that was attempted
        command: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// A merge stopped with conflicts that need manual resolution
    #[error("merge conflict in PR #{number} ({branch})")]
    MergeConflict {
        /// PR number
        number: u64,
        /// Head branch of the PR
        branch: String,
    },

    /// Listing pull requests failed
    #[error("PR source error: {0}")]
    PrSource(String),

    /// GitHub REST API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// No credentials available for the platform
    #[error("authentication error: {0}")]
    Auth(String),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(String),

    /// A session operation was invoked in a phase that does not accept it
    #[error("invalid phase: expected {expected}, found {actual}")]
    InvalidPhase {
        /// Phase the operation requires
        expected: &'static str,
        /// Phase the session was in
        actual: String,
    },

    /// Internal error (prompts, terminal)
    #[error("{0}")]
    Internal(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        Self::GitHubApi(err.to_string())
    }
}

/// Result type alias for git-groom operations
pub type Result<T> = std::result::Result<T, Error>;
