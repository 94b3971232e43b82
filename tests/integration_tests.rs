//! Integration tests for git-groom

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

mod common;

use assert_cmd::Command;
use common::{MockGateway, MockPrSource, make_pr, repo_with, script_branches};
use git_groom::prune::{PruneSession, SwitchPlan};
use git_groom::reconcile::ReconcileOptions;
use git_groom::staging::{DependencyFilter, MergeSession, StagingOptions};
use git_groom::workflow::{MergePhase, PrunePhase};
use predicates::prelude::*;
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("groom").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Interactive repository maintenance"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("groom").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_prune_help() {
    let mut cmd = Command::cargo_bin("groom").unwrap();
    cmd.args(["prune", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("no longer exist on the remote"));
}

#[test]
fn test_deps_help() {
    let mut cmd = Command::cargo_bin("groom").unwrap();
    cmd.args(["deps", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("staging branch"));
}

#[test]
fn test_missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let mut cmd = Command::cargo_bin("groom").unwrap();
    cmd.arg("prune")
        .arg("--path")
        .arg(dir.path())
        .arg("--config")
        .arg(&missing);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

// =============================================================================
// Prune flow
// =============================================================================

fn prune_session(gateway: &Arc<MockGateway>) -> PruneSession {
    PruneSession::new(
        repo_with(gateway),
        ReconcileOptions::default(),
        Duration::ZERO,
    )
}

#[tokio::test]
async fn test_prune_empty_selection_deletes_nothing() {
    let gateway = Arc::new(MockGateway::new());
    script_branches(&gateway, &["main", "a", "b", "c"], &["main"], "");
    let mut session = prune_session(&gateway);

    session.load().await.unwrap();
    assert_eq!(session.phase(), PrunePhase::Selection);
    assert_eq!(session.orphans().unwrap().len(), 3);

    session.select(Vec::<String>::new()).unwrap();

    assert_eq!(session.phase(), PrunePhase::Idle);
    assert_eq!(session.log(), "No branches selected for deletion.");
    assert!(gateway.calls_starting_with("git branch -D").is_empty());
}

#[tokio::test]
async fn test_prune_nothing_orphaned_goes_idle() {
    let gateway = Arc::new(MockGateway::new());
    script_branches(&gateway, &["main"], &["main"], "");
    let mut session = prune_session(&gateway);

    session.load().await.unwrap();

    assert_eq!(session.phase(), PrunePhase::Idle);
    assert!(session.log().contains("No local branches found"));
}

#[tokio::test]
async fn test_prune_switches_and_stashes_before_deleting() {
    let gateway = Arc::new(MockGateway::new());
    script_branches(&gateway, &["main", "feat-a", "feat-b"], &["main"], "");
    gateway.respond("git rev-parse --abbrev-ref HEAD", "feat-a\n");
    gateway.respond("git status --porcelain", " M src/lib.rs\n");
    gateway.fail("git branch -D feat-b", "error: branch 'feat-b' is locked");
    let mut session = prune_session(&gateway);

    session.load().await.unwrap();
    session.select(["feat-a", "feat-b", "feat-a", "main"]).unwrap();
    assert_eq!(session.selected(), ["feat-a", "feat-b"]);

    let plan = session.switch_plan().await.unwrap();
    assert_eq!(
        plan,
        SwitchPlan::Switch {
            target: "main".to_string(),
            dirty: true
        }
    );

    session.confirm(&plan, Some("wip")).await.unwrap();

    assert_eq!(session.phase(), PrunePhase::Done);
    assert_eq!(session.report().deleted, vec!["feat-a".to_string()]);
    assert_eq!(session.report().failed.len(), 1);

    let mutations: Vec<String> = gateway
        .calls()
        .into_iter()
        .filter(|c| {
            c.starts_with("git stash") || c.starts_with("git checkout") || c.contains(" -D ")
        })
        .collect();
    assert_eq!(
        mutations,
        vec![
            "git stash push -m wip",
            "git checkout main",
            "git branch -D feat-a",
            "git branch -D feat-b",
        ]
    );
}

#[tokio::test]
async fn test_prune_failed_switch_deletes_nothing() {
    let gateway = Arc::new(MockGateway::new());
    script_branches(&gateway, &["main", "feat-a"], &["main"], "");
    gateway.respond("git rev-parse --abbrev-ref HEAD", "feat-a\n");
    gateway.fail("git checkout main", "error: Your local changes would be overwritten");
    let mut session = prune_session(&gateway);

    session.load().await.unwrap();
    session.select(["feat-a"]).unwrap();
    let plan = session.switch_plan().await.unwrap();
    session.confirm(&plan, None).await.unwrap();

    assert_eq!(session.phase(), PrunePhase::Error);
    assert!(gateway.calls_starting_with("git branch -D").is_empty());
}

#[tokio::test]
async fn test_prune_decline_returns_to_selection() {
    let gateway = Arc::new(MockGateway::new());
    script_branches(&gateway, &["main", "feat-a"], &["main"], "");
    let mut session = prune_session(&gateway);

    session.load().await.unwrap();
    session.select(["feat-a"]).unwrap();
    session.decline().unwrap();

    assert_eq!(session.phase(), PrunePhase::Selection);
}

// =============================================================================
// Merge flow
// =============================================================================

fn merge_session(gateway: &Arc<MockGateway>, source: Arc<MockPrSource>) -> MergeSession {
    MergeSession::new(
        repo_with(gateway),
        source,
        DependencyFilter::default(),
        StagingOptions {
            exit_delay: Duration::ZERO,
            ..StagingOptions::default()
        },
    )
}

#[tokio::test]
async fn test_merge_conflict_and_resume() {
    let gateway = Arc::new(MockGateway::new());
    gateway.fail(
        "git merge --no-ff --no-edit origin/dependabot/npm/b",
        "CONFLICT (content): Merge conflict in package.json",
    );
    gateway.fail(
        "git merge --continue",
        "error: Committing is not possible because you have unmerged files.",
    );
    gateway.respond("git merge --continue", "");
    let source = Arc::new(MockPrSource::with_prs(vec![
        make_pr(1, "bump a (deps)", "dependabot/npm/a"),
        make_pr(7, "fix bug", "fix-bug"),
        make_pr(2, "bump b (deps)", "dependabot/npm/b"),
    ]));
    let mut session = merge_session(&gateway, Arc::clone(&source));

    session.start().await.unwrap();
    assert_eq!(session.phase(), MergePhase::Confirm);
    assert_eq!(session.items().len(), 2);
    assert_eq!(source.calls()[0].base.as_deref(), Some("main"));

    session.merge_current_item().await.unwrap();
    assert_eq!(session.phase(), MergePhase::Confirm);
    assert_eq!(session.cursor(), 1);

    session.merge_current_item().await.unwrap();
    assert_eq!(session.phase(), MergePhase::Conflict);
    assert_eq!(session.cursor(), 1);

    session.resume().await.unwrap();
    assert_eq!(session.phase(), MergePhase::Conflict);
    assert_eq!(session.cursor(), 1);

    session.resume().await.unwrap();
    assert_eq!(session.phase(), MergePhase::PushConfirmation);
    assert_eq!(session.cursor(), 2);
    assert_eq!(session.merged(), [1, 2]);

    session.finish(false).await.unwrap();
    assert_eq!(session.phase(), MergePhase::Done);
    assert!(gateway.calls_starting_with("git push").is_empty());
    assert!(gateway.calls_starting_with("git merge --abort").is_empty());
}

#[tokio::test]
async fn test_merge_setup_stashes_and_updates_staging() {
    let gateway = Arc::new(MockGateway::new());
    gateway.respond("git status --porcelain", "?? notes.txt\n");
    let source = Arc::new(MockPrSource::with_prs(vec![make_pr(
        3,
        "bump c (deps-dev)",
        "dependabot/cargo/c",
    )]));
    let mut session = merge_session(&gateway, source);

    session.start().await.unwrap();

    assert_eq!(
        gateway.calls()[..4],
        [
            "git status --porcelain",
            "git stash push -m \"git-groom: before merging dependency updates\"",
            "git checkout staging",
            "git pull --no-rebase --no-edit",
        ]
    );
    assert_eq!(session.phase(), MergePhase::Confirm);
}

#[tokio::test]
async fn test_merge_setup_failure_is_error() {
    let gateway = Arc::new(MockGateway::new());
    gateway.fail("git checkout staging", "error: pathspec 'staging' did not match");
    let source = Arc::new(MockPrSource::with_prs(vec![make_pr(
        1,
        "bump a (deps)",
        "dependabot/npm/a",
    )]));
    let mut session = merge_session(&gateway, Arc::clone(&source));

    session.start().await.unwrap();

    assert_eq!(session.phase(), MergePhase::Error);
    assert!(session.log().contains("Error during setup"));
    assert!(source.calls().is_empty());
    assert!(session.controller().exit_deadline().is_some());
}

#[tokio::test]
async fn test_merge_setup_merges_diverged_staging() {
    // Local staging carries unpushed merges from an earlier run; upstream moved on.
    let gateway = Arc::new(MockGateway::new());
    gateway.fail(
        "git pull --ff-only",
        "fatal: Not possible to fast-forward, aborting.",
    );
    gateway.respond(
        "git pull --no-rebase --no-edit",
        "Merge made by the 'ort' strategy.\n",
    );
    let source = Arc::new(MockPrSource::with_prs(vec![make_pr(
        1,
        "bump a (deps)",
        "dependabot/npm/a",
    )]));
    let mut session = merge_session(&gateway, source);

    session.start().await.unwrap();

    assert_eq!(session.phase(), MergePhase::Confirm);
    assert!(gateway.was_called("git pull --no-rebase --no-edit"));
    assert!(!gateway.was_called("git pull --ff-only"));
}

#[tokio::test]
async fn test_merge_setup_pull_failure_reports_cause() {
    let gateway = Arc::new(MockGateway::new());
    gateway.fail(
        "git pull --no-rebase --no-edit",
        "CONFLICT (content): Merge conflict in Cargo.lock",
    );
    let source = Arc::new(MockPrSource::default());
    let mut session = merge_session(&gateway, Arc::clone(&source));

    session.start().await.unwrap();

    assert_eq!(session.phase(), MergePhase::Error);
    assert!(session.log().contains("Merge conflict in Cargo.lock"));
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_merge_no_matching_prs_is_done() {
    let gateway = Arc::new(MockGateway::new());
    let source = Arc::new(MockPrSource::with_prs(vec![make_pr(9, "fix bug", "fix")]));
    let mut session = merge_session(&gateway, source);

    session.start().await.unwrap();

    assert_eq!(session.phase(), MergePhase::Done);
    assert!(session.log().contains("No matching dependency update PRs found"));
}

#[tokio::test]
async fn test_merge_push_failure_still_finishes() {
    let gateway = Arc::new(MockGateway::new());
    gateway.fail("git push origin staging", "error: failed to push some refs");
    let source = Arc::new(MockPrSource::with_prs(vec![make_pr(
        1,
        "bump a (deps)",
        "dependabot/npm/a",
    )]));
    let mut session = merge_session(&gateway, source);

    session.start().await.unwrap();
    session.skip().unwrap();
    assert_eq!(session.phase(), MergePhase::PushConfirmation);

    session.finish(true).await.unwrap();

    assert_eq!(session.phase(), MergePhase::Done);
    assert!(session.log().contains("Error pushing staging"));
    assert_eq!(session.skipped(), [1]);
}

#[tokio::test]
async fn test_merge_cancel_keeps_applied_merges() {
    let gateway = Arc::new(MockGateway::new());
    let source = Arc::new(MockPrSource::with_prs(vec![
        make_pr(1, "bump a (deps)", "dependabot/npm/a"),
        make_pr(2, "bump b (deps)", "dependabot/npm/b"),
    ]));
    let mut session = merge_session(&gateway, source);

    session.start().await.unwrap();
    session.merge_current_item().await.unwrap();
    session.cancel();

    assert_eq!(session.phase(), MergePhase::Cancelled);
    assert_eq!(session.merged(), [1]);
    assert!(session.resume().await.is_err());
}

#[tokio::test]
async fn test_merge_list_failure_is_error() {
    let gateway = Arc::new(MockGateway::new());
    let source = Arc::new(MockPrSource::default());
    source.fail("gh: not logged in");
    let mut session = merge_session(&gateway, source);

    session.start().await.unwrap();

    assert_eq!(session.phase(), MergePhase::Error);
}
