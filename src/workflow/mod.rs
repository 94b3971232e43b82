//! Workflow phase controller
//!
//! A linear interactive process is described by a [`Workflow`]: a phase type,
//! an event type and a transition table. [`PhaseController`] owns the current
//! phase and the item cursor and is the only thing that mutates them, through
//! [`PhaseController::advance`]. Side effects (running git, prompting) live in
//! the callers, which feed completion events back in.
//!
//! Terminal phases schedule a deferred exit so the operator can read the final
//! status line. The deadline is cleared if any other phase is entered first.

mod merge;
mod prune;

pub use merge::{MergeEvent, MergeFlow, MergePhase};
pub use prune::{PruneEvent, PruneFlow, PrunePhase};

use std::fmt::{Debug, Display};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Outcome of a transition table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<P> {
    /// Phase to enter
    pub to: P,
    /// Whether the transition resolves the current item
    pub advance_cursor: bool,
}

impl<P> Transition<P> {
    /// Move to `to` without touching the cursor
    pub const fn stay(to: P) -> Self {
        Self {
            to,
            advance_cursor: false,
        }
    }

    /// Move to `to` and advance the cursor by one
    pub const fn resolve(to: P) -> Self {
        Self {
            to,
            advance_cursor: true,
        }
    }
}

/// A linear, checkpointed interactive process
pub trait Workflow {
    /// Phase type
    type Phase: Copy + Eq + Debug + Display;
    /// Input and completion events
    type Event: Debug;

    /// Phase the flow starts in
    fn initial(&self) -> Self::Phase;

    /// Whether no further transitions leave `phase`
    fn is_terminal(&self, phase: Self::Phase) -> bool;

    /// Delay before a terminal phase auto-exits
    fn exit_delay(&self, phase: Self::Phase) -> Duration;

    /// Transition table
    ///
    /// Returns `None` when `event` is not accepted in `phase`. Only invoked for
    /// non-terminal phases. Cancel belongs in the table too: phases that have
    /// an external command in flight must not accept it.
    fn transition(
        &mut self,
        phase: Self::Phase,
        cursor: usize,
        event: &Self::Event,
    ) -> Option<Transition<Self::Phase>>;
}

/// Single-threaded state machine driving a [`Workflow`]
#[derive(Debug)]
pub struct PhaseController<W: Workflow> {
    workflow: W,
    phase: W::Phase,
    cursor: usize,
    status: String,
    exit_at: Option<Instant>,
}

impl<W: Workflow> PhaseController<W> {
    /// Start a controller in the workflow's initial phase
    pub fn new(workflow: W) -> Self {
        let phase = workflow.initial();
        Self {
            workflow,
            phase,
            cursor: 0,
            status: String::new(),
            exit_at: None,
        }
    }

    /// Current phase
    pub const fn phase(&self) -> W::Phase {
        self.phase
    }

    /// Index of the item being worked on
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Latest status line
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Overwrite the status line
    pub fn report(&mut self, status: impl Into<String>) {
        self.status = status.into();
        debug!(status = %self.status, "status");
    }

    /// Whether the flow has reached a terminal phase
    pub fn is_finished(&self) -> bool {
        self.workflow.is_terminal(self.phase)
    }

    /// When the pending auto-exit fires, if one is scheduled
    pub const fn exit_deadline(&self) -> Option<Instant> {
        self.exit_at
    }

    /// Feed an event into the state machine
    ///
    /// Events not accepted in the current phase are ignored. Terminal phases
    /// accept nothing, including cancel.
    pub fn advance(&mut self, event: W::Event) {
        if self.workflow.is_terminal(self.phase) {
            debug!(phase = %self.phase, ?event, "ignoring event in terminal phase");
            return;
        }

        let Some(transition) = self.workflow.transition(self.phase, self.cursor, &event) else {
            debug!(phase = %self.phase, ?event, "event not accepted in phase");
            return;
        };

        let from = self.phase;
        if transition.advance_cursor {
            self.cursor += 1;
        }
        self.enter(transition.to);
        info!(%from, to = %self.phase, cursor = self.cursor, "phase transition");
    }

    fn enter(&mut self, phase: W::Phase) {
        self.phase = phase;
        self.exit_at = self
            .workflow
            .is_terminal(phase)
            .then(|| Instant::now() + self.workflow.exit_delay(phase));
    }

    /// Wait for the scheduled auto-exit
    ///
    /// Returns `false` immediately when nothing is scheduled.
    pub async fn wait_for_exit(&self) -> bool {
        match self.exit_at {
            Some(at) => {
                tokio::time::sleep_until(at).await;
                true
            }
            None => false,
        }
    }
}
