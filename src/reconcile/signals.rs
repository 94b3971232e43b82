//! Orphan detection signals - pure functions
//!
//! Two independently unreliable signals are combined:
//! - name comparison: local branches with no remote branch of the same name
//! - gone detection: branches whose tracked upstream was deleted
//!
//! Neither alone is complete. A force-deleted upstream can leave tracking
//! metadata behind while the name comparison still misses it under some
//! configurations, and branches that never had an upstream are never marked
//! gone. The orphan set is their union, deduplicated by name.

use crate::types::{BranchRef, OrphanSet, TrackingState};
use std::collections::HashSet;

/// Local branches absent from the (already prefix-stripped) remote list
pub fn missing_on_remote<'a>(local: &'a [String], remote: &[String]) -> Vec<&'a str> {
    let remote: HashSet<&str> = remote.iter().map(String::as_str).collect();
    local
        .iter()
        .map(String::as_str)
        .filter(|name| !remote.contains(name))
        .collect()
}

/// Union both signals into an orphan set without metadata
///
/// A branch flagged gone is recorded as [`TrackingState::TrackedGone`] even
/// when the name comparison also flags it; everything else is
/// [`TrackingState::Untracked`]. Gone names that are not local branches are
/// ignored, so the result is always a subset of `local`.
pub fn orphan_candidates(local: &[String], remote: &[String], gone: &[String]) -> OrphanSet {
    let local_set: HashSet<&str> = local.iter().map(String::as_str).collect();
    let gone_set: HashSet<&str> = gone
        .iter()
        .map(String::as_str)
        .filter(|name| local_set.contains(name))
        .collect();

    let from_names = missing_on_remote(local, remote)
        .into_iter()
        .filter(|name| !gone_set.contains(name))
        .map(|name| BranchRef::new(name, TrackingState::Untracked));

    let from_gone = gone_set
        .iter()
        .map(|&name| BranchRef::new(name, TrackingState::TrackedGone));

    from_names.chain(from_gone).collect()
}
