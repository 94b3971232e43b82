//! Transition table for selecting and deleting orphaned branches

use super::{Transition, Workflow};
use std::time::Duration;

/// Phases of the prune flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrunePhase {
    /// Reconciling branches
    Loading,
    /// Operator picks branches
    Selection,
    /// Operator confirms the deletion
    Confirm,
    /// Deleting
    Removing,
    /// Deletion finished
    Done,
    /// Nothing to do; back to the menu
    Idle,
    /// Reconciliation failed
    Error,
    /// Operator cancelled
    Cancelled,
}

impl std::fmt::Display for PrunePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Loading => "loading",
            Self::Selection => "selection",
            Self::Confirm => "confirm",
            Self::Removing => "removing",
            Self::Done => "done",
            Self::Idle => "idle",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Inputs and completions of the prune flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PruneEvent {
    /// Reconciliation finished with `count` candidates
    Loaded {
        /// Number of orphaned branches
        count: usize,
    },
    /// Operator submitted a selection of `count` branches
    Selected {
        /// Number of branches selected
        count: usize,
    },
    /// Operator confirmed deletion
    Confirmed,
    /// Operator declined deletion
    Declined,
    /// Deletions finished
    Removed,
    /// Reconciliation or preparation failed
    Failed,
    /// Operator cancelled
    Cancel,
}

/// Prune flow table
#[derive(Debug, Clone)]
pub struct PruneFlow {
    exit_delay: Duration,
}

impl PruneFlow {
    /// Create the table with the given exit delay for `done` and `error`
    pub const fn new(exit_delay: Duration) -> Self {
        Self { exit_delay }
    }

    /// Whether `phase` hands control back to the menu rather than exiting
    pub const fn returns_to_menu(phase: PrunePhase) -> bool {
        matches!(phase, PrunePhase::Idle | PrunePhase::Cancelled)
    }
}

impl Workflow for PruneFlow {
    type Phase = PrunePhase;
    type Event = PruneEvent;

    fn initial(&self) -> PrunePhase {
        PrunePhase::Loading
    }

    fn is_terminal(&self, phase: PrunePhase) -> bool {
        matches!(
            phase,
            PrunePhase::Done | PrunePhase::Idle | PrunePhase::Error | PrunePhase::Cancelled
        )
    }

    fn exit_delay(&self, phase: PrunePhase) -> Duration {
        if Self::returns_to_menu(phase) {
            Duration::ZERO
        } else {
            self.exit_delay
        }
    }

    fn transition(
        &mut self,
        phase: PrunePhase,
        _cursor: usize,
        event: &PruneEvent,
    ) -> Option<Transition<PrunePhase>> {
        use PruneEvent as E;
        use PrunePhase as P;

        let to = match (phase, event) {
            (P::Loading, E::Loaded { count: 0 }) | (P::Selection, E::Selected { count: 0 }) => {
                P::Idle
            }
            (P::Loading, E::Loaded { .. }) | (P::Confirm, E::Declined) => P::Selection,
            (P::Selection, E::Selected { .. }) => P::Confirm,
            (P::Confirm, E::Confirmed) => P::Removing,
            (P::Removing, E::Removed) => P::Done,
            (P::Loading | P::Confirm | P::Removing, E::Failed) => P::Error,
            // Only at prompts; loading and removing have git running.
            (P::Selection | P::Confirm, E::Cancel) => P::Cancelled,
            _ => return None,
        };
        Some(Transition::stay(to))
    }
}
