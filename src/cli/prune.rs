//! Prune command - delete local branches that no longer exist upstream

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use crate::cli::{FlowEnd, print_repo_info, prompt_error, spinner};
use anstream::println;
use dialoguer::{Confirm, Input, MultiSelect};
use git_groom::error::Result;
use git_groom::prune::{PruneSession, SwitchPlan, branch_label};
use git_groom::workflow::{PruneFlow, PrunePhase};

/// Run the prune flow
///
/// Fails before touching anything if the path is not a git repository.
pub async fn run_prune(ctx: &CommandContext) -> Result<FlowEnd> {
    let info = ctx.repo.info().await?;
    print_repo_info(&info);

    let mut session = PruneSession::new(
        ctx.repo.clone(),
        ctx.config.reconcile_options(),
        ctx.config.prune_exit_delay(),
    );

    let progress = spinner("Fetching git branches...");
    session.load().await?;
    progress.finish_and_clear();

    while !session.controller().is_finished() {
        match session.phase() {
            PrunePhase::Selection => select_branches(&mut session)?,
            PrunePhase::Confirm => confirm_deletion(&mut session).await?,
            // Loading and removing complete inside the session calls above.
            PrunePhase::Loading
            | PrunePhase::Removing
            | PrunePhase::Done
            | PrunePhase::Idle
            | PrunePhase::Error
            | PrunePhase::Cancelled => break,
        }
    }

    render_outcome(&session);
    session.wait_for_exit().await;

    Ok(match session.phase() {
        phase if PruneFlow::returns_to_menu(phase) => FlowEnd::Menu,
        PrunePhase::Error => FlowEnd::Failed,
        _ => FlowEnd::Exit,
    })
}

fn select_branches(session: &mut PruneSession) -> Result<()> {
    let (names, labels): (Vec<String>, Vec<String>) = session
        .orphans()
        .map(|set| {
            set.iter()
                .map(|b| (b.name.clone(), label_with_style(&branch_label(b), &b.name)))
                .unzip()
        })
        .unwrap_or_default();

    println!(
        "{}",
        "Orphaned branches (local branches not present upstream or never pushed):".emphasis()
    );
    println!("{}", "Space to toggle, Enter to submit, Esc to go back.".muted());

    let picked = MultiSelect::new()
        .with_prompt("Select branches to delete")
        .items(&labels)
        .interact_opt()
        .map_err(prompt_error)?;

    match picked {
        None => session.cancel(),
        Some(indices) => {
            session.select(indices.into_iter().map(|i| names[i].clone()))?;
        }
    }
    Ok(())
}

/// Dim the metadata part of a label, keeping the branch name plain
fn label_with_style(label: &str, name: &str) -> String {
    label.strip_prefix(name).map_or_else(
        || label.to_string(),
        |rest| format!("{name}{}", rest.muted()),
    )
}

async fn confirm_deletion(session: &mut PruneSession) -> Result<()> {
    let selected = session.selected();
    let noun = if selected.len() > 1 { "branches" } else { "branch" };
    println!("⚠️  Local {noun} will be removed:");
    for branch in selected {
        println!("  - {}", branch.accent());
    }

    let answer = Confirm::new()
        .with_prompt("Are you sure you want to proceed?")
        .default(false)
        .interact_opt()
        .map_err(prompt_error)?;

    match answer {
        None => session.cancel(),
        Some(false) => session.decline()?,
        Some(true) => {
            let plan = session.switch_plan().await?;
            let stash_message = match plan {
                SwitchPlan::Switch { dirty: true, .. } => Some(
                    Input::<String>::new()
                        .with_prompt("You have uncommitted changes. Add a stash message")
                        .allow_empty(true)
                        .interact_text()
                        .map_err(prompt_error)?,
                ),
                _ => None,
            };

            let progress = spinner("Removing local branches...");
            let stash_message = stash_message.as_deref().filter(|m| !m.trim().is_empty());
            session.confirm(&plan, stash_message).await?;
            progress.finish_and_clear();
        }
    }
    Ok(())
}

fn render_outcome(session: &PruneSession) {
    match session.phase() {
        PrunePhase::Done => {
            let report = session.report();
            if !report.deleted.is_empty() {
                println!("{} Deleted branches:", check());
                for branch in &report.deleted {
                    println!("  - {}", branch.accent());
                }
            }
            if !report.failed.is_empty() {
                println!("{}", "Could not delete:".warn());
                for (branch, reason) in &report.failed {
                    println!("  - {} {}", branch.warn(), reason.muted());
                }
            }
            println!("{}", "Exiting...".muted());
        }
        PrunePhase::Idle => println!("{}", session.log().warn()),
        PrunePhase::Error => {
            println!("{}", session.log().error());
            println!("{}", "Exiting...".muted());
        }
        _ => {}
    }
}
