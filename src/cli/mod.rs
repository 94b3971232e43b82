//! Interactive front end
//!
//! Prompts, spinners and rendering only; all decisions are made by the
//! sessions in the library.

pub mod context;
pub mod deps;
pub mod prune;
pub mod style;

use git_groom::error::Error;
use git_groom::types::RepoInfo;
use indicatif::ProgressBar;
use std::time::Duration;
use style::{Stylize, spinner_style};

/// How a flow ended, from the menu's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowEnd {
    /// Show the menu again
    Menu,
    /// Exit the process successfully
    Exit,
    /// Exit the process with a failure status
    Failed,
}

/// Start a spinner with `message`
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Convert a prompt failure into a library error
pub fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Internal(format!("Failed to read input: {e}"))
}

/// Print where the flow is about to operate
pub fn print_repo_info(info: &RepoInfo) {
    anstream::println!(
        "{} {}",
        "Local repository:".emphasis(),
        info.root.display().accent()
    );
    if info.remotes.is_empty() {
        anstream::println!("{}", "No upstream repository configured.".muted());
    } else {
        anstream::println!("{}", "Upstream repository:".emphasis());
        for remote in &info.remotes {
            anstream::println!("  {} {}", remote.name, remote.url.muted());
        }
    }
    anstream::println!();
}
