//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Check mark used in completion messages
pub const CHECK: &str = "✓";

/// Semantic colors for CLI output; no-ops when stdout has no color support
pub trait Stylize: Display + Sized {
    /// De-emphasized hints
    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    /// Headings and labels
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    /// Names of branches and PRs
    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    /// Successful outcomes
    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    /// Recoverable problems
    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }

    /// Failures
    fn error(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.red())
            .to_string()
    }
}

impl<T: Display> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success()
}

/// Spinner style shared by all long-running steps
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
}
