//! Merge orchestrator for dependency-update PRs
//!
//! Walks filtered PRs one at a time into an integration branch. Merges are
//! strictly sequential; a conflicted merge is left in the working tree for the
//! operator to resolve and is then finalized on resume.

mod filter;
mod session;

pub use filter::{DEFAULT_BRANCH_PREFIX, DEFAULT_TITLE_PATTERN, DependencyFilter};
pub use session::{MergeSession, StagingOptions};
