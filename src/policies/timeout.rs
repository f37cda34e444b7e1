//! # What to do with in-flight handlers when a run times out.
//!
//! - [`TimeoutPolicy::Detach`] handlers keep running until they finish on their own.
//!   Their outcomes are discarded and no further items are started.
//! - [`TimeoutPolicy::Cancel`] the run's cancellation token is cancelled. Handlers
//!   observing [`HandlerContext::cancelled`](crate::HandlerContext::cancelled) can
//!   clean up; in any case the handler future is dropped at its next suspension point.

/// Policy for handlers still in flight when the run budget elapses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// Leave abandoned handlers running (default).
    #[default]
    Detach,
    /// Cancel abandoned handlers through the run token.
    Cancel,
}
