//! Shared test helpers

#![allow(dead_code)]

mod mock_gateway;

pub use mock_gateway::{MockGateway, MockPrSource};

use git_groom::gateway::CommandGateway;
use git_groom::repo::GitRepo;
use git_groom::types::PullRequest;
use std::sync::Arc;

/// A repo on remote `origin` driven by `gateway`
pub fn repo_with(gateway: &Arc<MockGateway>) -> GitRepo {
    let gateway: Arc<dyn CommandGateway> = Arc::clone(gateway) as Arc<dyn CommandGateway>;
    GitRepo::new(gateway, "origin")
}

/// Script the three branch listings the reconciliation engine reads
pub fn script_branches(gateway: &MockGateway, local: &[&str], remote: &[&str], verbose: &str) {
    gateway.respond("git branch --format=%(refname:short)", &lines(local));
    let remote: Vec<String> = remote.iter().map(|b| format!("origin/{b}")).collect();
    let remote: Vec<&str> = remote.iter().map(String::as_str).collect();
    gateway.respond("git branch -r --format=%(refname:short)", &lines(&remote));
    gateway.respond("git branch -vv", verbose);
}

/// Point `origin/HEAD` at `branch`
pub fn script_default_branch(gateway: &MockGateway, branch: &str) {
    gateway.respond(
        "git symbolic-ref refs/remotes/origin/HEAD",
        &format!("refs/remotes/origin/{branch}\n"),
    );
}

fn lines(items: &[&str]) -> String {
    items.iter().map(|i| format!("{i}\n")).collect()
}

/// Build a PR for tests
pub fn make_pr(number: u64, title: &str, head_ref: &str) -> PullRequest {
    PullRequest {
        number,
        title: title.to_string(),
        head_ref: head_ref.to_string(),
        url: Some(format!("https://github.com/acme/widgets/pull/{number}")),
    }
}
