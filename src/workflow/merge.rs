//! Transition table for merging a list of PRs into an integration branch

use super::{Transition, Workflow};
use std::time::Duration;

/// Phases of the merge flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergePhase {
    /// Created, nothing run yet
    Init,
    /// Stashing work and syncing the integration branch
    Setup,
    /// Fetching and filtering PRs
    Loading,
    /// Asking whether to merge the current PR
    Confirm,
    /// A merge is in flight
    Merging,
    /// Waiting for manual conflict resolution
    Conflict,
    /// Asking whether to push the integration branch
    PushConfirmation,
    /// Finished
    Done,
    /// Setup or loading failed
    Error,
    /// Operator cancelled
    Cancelled,
}

impl std::fmt::Display for MergePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Setup => "setup",
            Self::Loading => "loading",
            Self::Confirm => "confirm",
            Self::Merging => "merging",
            Self::Conflict => "conflict",
            Self::PushConfirmation => "push-confirmation",
            Self::Done => "done",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Inputs and completions of the merge flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeEvent {
    /// Begin setup
    Start,
    /// Integration branch is checked out and up to date
    SetupSucceeded,
    /// PR list loaded; `count` items remain after filtering
    Loaded {
        /// Number of PRs to walk through
        count: usize,
    },
    /// Operator accepted merging the current PR
    Accept,
    /// Operator skipped the current PR
    Skip,
    /// Merge of the current PR completed
    Merged,
    /// Merge of the current PR stopped on conflicts
    MergeFailed,
    /// In-progress merge was finalized after manual resolution
    Resumed,
    /// Finalizing still reports unresolved conflicts
    ResumeFailed,
    /// Push step answered (pushed, declined, or push failed)
    PushResolved,
    /// Setup or loading failed
    Failed,
    /// Operator cancelled
    Cancel,
}

/// Merge flow table and its parameters
#[derive(Debug, Clone)]
pub struct MergeFlow {
    total: usize,
    exit_delay: Duration,
}

impl MergeFlow {
    /// Create the table with the given terminal-phase exit delay
    pub const fn new(exit_delay: Duration) -> Self {
        Self {
            total: 0,
            exit_delay,
        }
    }

    /// Where to go once the item at `cursor` is resolved
    fn after_item(&self, cursor: usize) -> Transition<MergePhase> {
        if cursor + 1 < self.total {
            Transition::resolve(MergePhase::Confirm)
        } else {
            Transition::resolve(MergePhase::PushConfirmation)
        }
    }
}

impl Workflow for MergeFlow {
    type Phase = MergePhase;
    type Event = MergeEvent;

    fn initial(&self) -> MergePhase {
        MergePhase::Init
    }

    fn is_terminal(&self, phase: MergePhase) -> bool {
        matches!(
            phase,
            MergePhase::Done | MergePhase::Error | MergePhase::Cancelled
        )
    }

    fn exit_delay(&self, _phase: MergePhase) -> Duration {
        self.exit_delay
    }

    fn transition(
        &mut self,
        phase: MergePhase,
        cursor: usize,
        event: &MergeEvent,
    ) -> Option<Transition<MergePhase>> {
        use MergeEvent as E;
        use MergePhase as P;

        let next = match (phase, event) {
            (P::Init, E::Start) => Transition::stay(P::Setup),
            (P::Setup, E::SetupSucceeded) => Transition::stay(P::Loading),
            (P::Setup | P::Loading, E::Failed) => Transition::stay(P::Error),
            (P::Loading, E::Loaded { count }) => {
                self.total = *count;
                if *count == 0 {
                    Transition::stay(P::Done)
                } else {
                    Transition::stay(P::Confirm)
                }
            }
            (P::Confirm, E::Accept) => Transition::stay(P::Merging),
            (P::Confirm, E::Skip) | (P::Merging, E::Merged) | (P::Conflict, E::Resumed) => {
                self.after_item(cursor)
            }
            (P::Merging, E::MergeFailed) => Transition::stay(P::Conflict),
            (P::Conflict, E::ResumeFailed) => Transition::stay(P::Conflict),
            (P::PushConfirmation, E::PushResolved) => Transition::stay(P::Done),
            // Setup, loading and merging have git running; cancel waits for them.
            (P::Init | P::Confirm | P::Conflict | P::PushConfirmation, E::Cancel) => {
                Transition::stay(P::Cancelled)
            }
            _ => return None,
        };
        Some(next)
    }
}
