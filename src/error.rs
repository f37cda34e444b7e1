//! Error types used by the workvisor executor and its handlers.
//!
//! This module defines two main error enums:
//!
//! - [`ExecutorError`]: errors raised by the executor itself (admission, run lifecycle).
//! - [`HandlerError`]: errors raised by individual handler invocations.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::core::RunState;

/// # Errors produced by the executor.
///
/// `QueueFull` is local to the `enqueue` call that triggered it and leaves the
/// pending buffer untouched. `Timeout` is the only error that terminates a
/// [`get_results`](crate::Executor::get_results) call once the run is started.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// Admission rejected: the pending buffer already holds `capacity` items.
    #[error("queue is full (capacity {capacity}); cannot accept item")]
    QueueFull {
        /// Configured `queue_size`.
        capacity: usize,
    },

    /// The run did not become quiescent within its budget.
    #[error("run did not finish within {timeout:?}")]
    Timeout {
        /// Effective (clamped) run timeout.
        timeout: Duration,
    },

    /// `get_results` was called on an executor whose run already started.
    #[error("run already started (state: {state})")]
    NotIdle {
        /// State observed when the call was rejected.
        state: RunState,
    },

    /// Item submitted after the run reached a terminal state.
    #[error("executor is closed (state: {state}); item can never run")]
    Closed {
        /// Terminal state of the run.
        state: RunState,
    },

    /// Configuration rejected at build time.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        /// Offending field name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl ExecutorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use workvisor::ExecutorError;
    ///
    /// let err = ExecutorError::QueueFull { capacity: 3 };
    /// assert_eq!(err.as_label(), "queue_full");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ExecutorError::QueueFull { .. } => "queue_full",
            ExecutorError::Timeout { .. } => "run_timeout",
            ExecutorError::NotIdle { .. } => "run_not_idle",
            ExecutorError::Closed { .. } => "executor_closed",
            ExecutorError::InvalidConfig { .. } => "invalid_config",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ExecutorError::QueueFull { capacity } => format!("queue full: capacity={capacity}"),
            ExecutorError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            ExecutorError::NotIdle { state } => format!("not idle: state={state}"),
            ExecutorError::Closed { state } => format!("closed: state={state}"),
            ExecutorError::InvalidConfig { field, reason } => format!("{field}: {reason}"),
        }
    }
}

/// # Errors produced by a handler invocation.
///
/// A failed handler never stops the scheduler: its slot is released and the
/// failure is recorded as a failed [`Completion`](crate::Completion).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler was dropped because the run was cancelled.
    #[error("handler cancelled")]
    Canceled,

    /// Handler panicked; the panic was caught at the slot boundary.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Canceled => "handler_canceled",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Canceled => "run cancelled".to_string(),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}
