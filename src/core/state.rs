//! # Run lifecycle.
//!
//! ```text
//! Idle ──get_results()──► Draining ──┬──► Quiescent   (nothing pending, no slot occupied)
//!                                    └──► TimedOut    (deadline elapsed first)
//! ```
//!
//! `Quiescent` and `TimedOut` are terminal: an executor models exactly one run.

use std::fmt;

/// Lifecycle state of the executor's single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Items may be enqueued; nothing executes yet.
    Idle,
    /// Slots are being filled and refilled.
    Draining,
    /// No pending items and no occupied slots.
    Quiescent,
    /// The run budget elapsed before quiescence.
    TimedOut,
}

impl RunState {
    /// True for `Quiescent` and `TimedOut`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Quiescent | RunState::TimedOut)
    }

    #[inline]
    pub fn is_quiescent(self) -> bool {
        matches!(self, RunState::Quiescent)
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Draining => "draining",
            RunState::Quiescent => "quiescent",
            RunState::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
