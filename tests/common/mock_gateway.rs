//! Scripted command gateway and PR source for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use git_groom::error::{Error, Result};
use git_groom::gateway::{CommandGateway, CommandLine, CommandOutput};
use git_groom::platform::PullRequestSource;
use git_groom::types::{PrFilter, PullRequest};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// One scripted reply
#[derive(Debug, Clone)]
enum Reply {
    Success(String),
    Failure(String),
}

/// Command gateway that answers from a script
///
/// Replies are keyed by the command's display form, e.g.
/// `git branch -vv`. Several replies for the same command are served in
/// order and the last one repeats. Unscripted commands succeed with empty
/// output.
///
/// Features:
/// - Call tracking for verification
/// - Per-command output
/// - Error injection for failure path testing
#[derive(Default)]
pub struct MockGateway {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(command.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Make `command` succeed with `stdout`
    pub fn respond(&self, command: &str, stdout: &str) {
        self.push(command, Reply::Success(stdout.to_string()));
    }

    /// Make `command` exit non-zero with `stderr`
    pub fn fail(&self, command: &str, stderr: &str) {
        self.push(command, Reply::Failure(stderr.to_string()));
    }

    // === Call tracking ===

    /// Every command run so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Commands run so far that start with `prefix`
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// Whether `command` was run
    pub fn was_called(&self, command: &str) -> bool {
        self.calls().iter().any(|c| c == command)
    }

    fn next_reply(&self, key: &str) -> Option<Reply> {
        let mut replies = self.replies.lock().unwrap();
        let queue = replies.get_mut(key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl CommandGateway for MockGateway {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        let key = command.to_string();
        self.calls.lock().unwrap().push(key.clone());

        match self.next_reply(&key) {
            None => Ok(CommandOutput::default()),
            Some(Reply::Success(stdout)) => Ok(CommandOutput::stdout(stdout)),
            Some(Reply::Failure(stderr)) => Err(Error::CommandFailed {
                command: key,
                stderr,
            }),
        }
    }
}

/// PR source returning a fixed listing
#[derive(Default)]
pub struct MockPrSource {
    prs: Mutex<Vec<PullRequest>>,
    error: Mutex<Option<String>>,
    calls: Mutex<Vec<PrFilter>>,
}

impl MockPrSource {
    pub fn with_prs(prs: Vec<PullRequest>) -> Self {
        Self {
            prs: Mutex::new(prs),
            ..Self::default()
        }
    }

    /// Make `list_pull_requests` return an error
    pub fn fail(&self, msg: &str) {
        *self.error.lock().unwrap() = Some(msg.to_string());
    }

    /// Filters passed to `list_pull_requests`
    pub fn calls(&self) -> Vec<PrFilter> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PullRequestSource for MockPrSource {
    async fn list_pull_requests(&self, filter: &PrFilter) -> Result<Vec<PullRequest>> {
        self.calls.lock().unwrap().push(filter.clone());
        if let Some(msg) = self.error.lock().unwrap().clone() {
            return Err(Error::PrSource(msg));
        }
        Ok(self.prs.lock().unwrap().clone())
    }
}
