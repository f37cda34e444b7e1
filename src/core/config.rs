//! # Executor configuration.
//!
//! Provides [`Config`] centralized settings for one executor run.
//!
//! ## Ceilings and clamps
//! - `queue_timeout` above [`MAX_QUEUE_TIMEOUT`] is clamped to it (not an error)
//! - `bus_capacity = 0` is clamped to 1 by the event bus
//! - `queue_size = 0` or `max_workers = 0` is rejected by [`Config::validate`]

use std::time::Duration;

use crate::error::ExecutorError;
use crate::policies::{ResultOrder, TimeoutPolicy};

/// Largest accepted run timeout: `i32::MAX` milliseconds (~24.8 days).
pub const MAX_QUEUE_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

/// Configuration for one executor.
///
/// ## Field semantics
/// - `queue_size`: Max items pending simultaneously (not a limit on items ever submitted)
/// - `queue_timeout`: Wall-clock budget for one `get_results()` run
/// - `max_workers`: Concurrency ceiling (occupied slots)
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `on_timeout`: Fate of in-flight handlers when the budget elapses
/// - `result_order`: Order of the returned result log
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum number of items waiting for a slot at any instant.
    ///
    /// `enqueue` beyond this fails with `ExecutorError::QueueFull`.
    pub queue_size: usize,

    /// Wall-clock budget for the run started by `get_results()`.
    ///
    /// Clamped to [`MAX_QUEUE_TIMEOUT`].
    pub queue_timeout: Duration,

    /// Maximum number of handlers executing concurrently.
    pub max_workers: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages skip older items.
    pub bus_capacity: usize,

    /// What to do with in-flight handlers on timeout.
    pub on_timeout: TimeoutPolicy,

    /// Order of entries in the returned results.
    pub result_order: ResultOrder,
}

impl Config {
    /// Configuration with the three core knobs set and defaults elsewhere.
    pub fn new(queue_size: usize, queue_timeout: Duration, max_workers: usize) -> Self {
        Self {
            queue_size,
            queue_timeout,
            max_workers,
            ..Self::default()
        }
    }

    /// Returns a copy with a different timeout policy.
    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.on_timeout = policy;
        self
    }

    /// Returns a copy with a different result order.
    pub fn with_result_order(mut self, order: ResultOrder) -> Self {
        self.result_order = order;
        self
    }

    /// Returns the run timeout clamped to [`MAX_QUEUE_TIMEOUT`].
    #[inline]
    pub fn queue_timeout_clamped(&self) -> Duration {
        self.queue_timeout.min(MAX_QUEUE_TIMEOUT)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks that sizes are positive.
    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.queue_size == 0 {
            return Err(ExecutorError::InvalidConfig {
                field: "queue_size",
                reason: "must be positive",
            });
        }
        if self.max_workers == 0 {
            return Err(ExecutorError::InvalidConfig {
                field: "max_workers",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `queue_size = 1024`
    /// - `queue_timeout = 60s`
    /// - `max_workers = 4`
    /// - `bus_capacity = 1024`
    /// - `on_timeout = TimeoutPolicy::Detach`
    /// - `result_order = ResultOrder::Completion`
    fn default() -> Self {
        Self {
            queue_size: 1024,
            queue_timeout: Duration::from_secs(60),
            max_workers: 4,
            bus_capacity: 1024,
            on_timeout: TimeoutPolicy::default(),
            result_order: ResultOrder::default(),
        }
    }
}
