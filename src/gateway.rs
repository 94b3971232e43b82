//! Command gateway
//!
//! Every external program (git, gh) is invoked through [`CommandGateway`], so
//! the engine and the workflows can run against a scripted fake in tests.

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// A command to run, as discrete argv elements (never a shell string)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandLine {
    /// Program name
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
}

impl CommandLine {
    /// Create a command line for `program` with no arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Shorthand for a `git` invocation
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new("git").args(args)
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandOutput {
    /// Output with the given stdout and empty stderr
    pub fn stdout(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }
}

/// Executes external commands
///
/// A non-zero exit must be reported as [`Error::CommandFailed`].
#[async_trait]
pub trait CommandGateway: Send + Sync {
    /// Run a command to completion and capture its output
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput>;
}

/// Gateway backed by real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemGateway {
    cwd: Option<PathBuf>,
}

impl SystemGateway {
    /// Run commands in the current process directory
    pub const fn new() -> Self {
        Self { cwd: None }
    }

    /// Run commands in `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
        }
    }
}

#[async_trait]
impl CommandGateway for SystemGateway {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        debug!(%command, "running command");

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).kill_on_drop(true);
        for (key, value) in &command.env {
            cmd.env(key, value);
        }
        if let Some(ref dir) = self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| Error::CommandSpawn {
            command: command.to_string(),
            source,
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            debug!(
                %command,
                code = output.status.code().unwrap_or(-1),
                stderr = %stderr.trim(),
                "command failed"
            );
            return Err(Error::CommandFailed {
                command: command.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
