//! Deps command - merge dependency-update PRs into the staging branch

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use crate::cli::{FlowEnd, print_repo_info, prompt_error, spinner};
use anstream::println;
use dialoguer::{Confirm, Select};
use git_groom::error::Result;
use git_groom::platform::create_pr_source;
use git_groom::staging::MergeSession;
use git_groom::types::PullRequest;
use git_groom::workflow::MergePhase;
use std::sync::Arc;
use supports_hyperlinks::Stream;

/// Run the dependency merge flow
#[allow(clippy::future_not_send)]
pub async fn run_deps(ctx: &CommandContext) -> Result<FlowEnd> {
    let info = ctx.repo.info().await?;
    print_repo_info(&info);

    let source = create_pr_source(&ctx.config, &ctx.repo, Arc::clone(&ctx.gateway)).await?;
    let filter = ctx.config.dependency_filter()?;
    let mut session = MergeSession::new(
        ctx.repo.clone(),
        source,
        filter,
        ctx.config.staging_options(),
    );

    let progress = spinner(format!(
        "Preparing {} and fetching open PRs...",
        session.staging_branch()
    ));
    session.start().await?;
    progress.finish_and_clear();

    if session.phase() == MergePhase::Confirm {
        println!(
            "Found {} dependency update PR(s).",
            session.items().len().accent()
        );
    }

    while !session.controller().is_finished() {
        match session.phase() {
            MergePhase::Confirm => confirm_item(&mut session).await?,
            MergePhase::Conflict => resolve_conflict(&mut session).await?,
            MergePhase::PushConfirmation => confirm_push(&mut session).await?,
            // Remaining phases are passed through inside the session calls.
            MergePhase::Init
            | MergePhase::Setup
            | MergePhase::Loading
            | MergePhase::Merging
            | MergePhase::Done
            | MergePhase::Error
            | MergePhase::Cancelled => break,
        }
    }

    render_outcome(&session);
    session.wait_for_exit().await;

    Ok(match session.phase() {
        MergePhase::Error => FlowEnd::Failed,
        MergePhase::Cancelled => FlowEnd::Menu,
        _ => FlowEnd::Exit,
    })
}

/// PR reference, hyperlinked when the terminal supports it
fn pr_reference(pr: &PullRequest) -> String {
    let text = format!("PR #{}", pr.number);
    match pr.url.as_deref() {
        Some(url) if supports_hyperlinks::on(Stream::Stdout) => {
            terminal_link::Link::new(&text, url).to_string()
        }
        _ => text,
    }
}

async fn confirm_item(session: &mut MergeSession) -> Result<()> {
    let Some(pr) = session.current_item().cloned() else {
        session.cancel();
        return Ok(());
    };

    println!();
    println!(
        "[{}/{}] {}: {} {}",
        session.cursor() + 1,
        session.items().len(),
        pr_reference(&pr).accent(),
        pr.title.emphasis(),
        format!("(branch: {})", pr.head_ref).muted()
    );

    let choice = Select::new()
        .with_prompt(format!("Merge into {}?", session.staging_branch()))
        .items(&["Yes", "No"][..])
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;

    match choice {
        None => session.cancel(),
        Some(0) => {
            let progress = spinner(format!("Merging {}...", pr.head_ref));
            session.merge_current_item().await?;
            progress.finish_and_clear();
            if session.phase() != MergePhase::Conflict {
                println!("{} {}", check(), session.log());
            }
        }
        Some(_) => {
            session.skip()?;
            println!("{}", session.log().muted());
        }
    }
    Ok(())
}

async fn resolve_conflict(session: &mut MergeSession) -> Result<()> {
    println!("{}", session.log().error());
    println!(
        "{}",
        "Resolve the merge conflicts manually in another terminal, then continue.".muted()
    );

    let answer = Confirm::new()
        .with_prompt("Conflicts resolved? Continue the merge")
        .default(true)
        .interact_opt()
        .map_err(prompt_error)?;

    match answer {
        None => session.cancel(),
        // Not yet; ask again.
        Some(false) => {}
        Some(true) => {
            session.resume().await?;
            if session.phase() == MergePhase::Conflict {
                println!("{}", session.log().warn());
            } else {
                println!("{} {}", check(), session.log());
            }
        }
    }
    Ok(())
}

async fn confirm_push(session: &mut MergeSession) -> Result<()> {
    println!();
    println!(
        "{} merged, {} skipped.",
        session.merged().len().success(),
        session.skipped().len().muted()
    );

    let choice = Select::new()
        .with_prompt(format!("Push {} to the remote?", session.staging_branch()))
        .items(&["Yes", "No"][..])
        .default(0)
        .interact_opt()
        .map_err(prompt_error)?;

    match choice {
        None => session.cancel(),
        Some(index) => {
            let progress = spinner("Finishing...");
            session.finish(index == 0).await?;
            progress.finish_and_clear();
        }
    }
    Ok(())
}

fn render_outcome(session: &MergeSession) {
    match session.phase() {
        MergePhase::Done => {
            println!("{}", session.log());
            println!("{}", "Exiting...".muted());
        }
        MergePhase::Error => {
            println!("{}", session.log().error());
            println!("{}", "Exiting...".muted());
        }
        MergePhase::Cancelled => println!("{}", "Cancelled.".muted()),
        _ => {}
    }
}
