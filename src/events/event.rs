//! # Runtime events emitted by the executor.
//!
//! Three families of [`EventKind`]:
//! - **admission**: an item was accepted into, or turned away from, the pending buffer;
//! - **slot**: a handler started, completed, failed, or settled after the run ended;
//! - **run**: the run started, went quiescent, or ran out of time.
//!
//! An [`Event`] also records when it happened, which item it concerns, why
//! it failed, how long the handler took and how loaded the executor was.
//!
//! ## Ordering
//! `seq` comes from one process-wide counter. Receivers that merge several
//! streams sort on it to recover emission order.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use workvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ItemFailed)
//!     .with_item(3)
//!     .with_reason("bad input")
//!     .with_elapsed(Duration::from_millis(120));
//!
//! assert_eq!(ev.kind, EventKind::ItemFailed);
//! assert_eq!(ev.item, Some(3));
//! assert_eq!(ev.reason.as_deref(), Some("bad input"));
//! assert_eq!(ev.elapsed_ms, Some(120));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Source of `Event::seq`, shared by every executor in the process.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission ===
    /// Item admitted into the pending buffer.
    ///
    /// Sets: `item`, `active`, `pending`
    ItemEnqueued,

    /// Item rejected because the pending buffer is full or the run is over.
    ///
    /// Sets: `reason`, `active`, `pending`
    ItemRejected,

    // === Slots ===
    /// Item popped from the buffer and handed to a handler.
    ///
    /// Sets: `item`, `handler`, `active`, `pending`
    ItemStarted,

    /// Handler returned a value.
    ///
    /// Sets: `item`, `handler`, `elapsed_ms`
    ItemCompleted,

    /// Handler returned an error, panicked, or was cancelled.
    ///
    /// Sets: `item`, `handler`, `reason`, `elapsed_ms`
    ItemFailed,

    /// Handler settled after the run reached a terminal state; outcome discarded.
    ///
    /// Sets: `item`, `active`, `pending`
    ItemDiscarded,

    // === Run ===
    /// `get_results()` started the run.
    ///
    /// Sets: `timeout_ms`, `pending`
    RunStarted,

    /// Nothing pending and no slot occupied.
    ///
    /// Sets: `active`, `pending`
    RunQuiescent,

    /// Run budget elapsed before quiescence, or the `get_results` future was
    /// dropped first (`reason` is set in that case).
    ///
    /// Sets: `timeout_ms`, `active`, `pending`, optionally `reason`
    RunTimedOut,
}

/// One executor event. Which optional fields are filled depends on [`EventKind`].
#[derive(Clone, Debug)]
pub struct Event {
    /// Emission order across the whole process.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Admission sequence number of the item, if applicable.
    pub item: Option<u64>,
    /// Name of the handler that ran the item (slot events).
    pub handler: Option<Arc<str>>,
    /// Human-readable reason (errors, rejection details).
    pub reason: Option<Arc<str>>,
    /// Handler latency in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Run timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Occupied slots when the event was emitted.
    pub active: Option<u32>,
    /// Pending items when the event was emitted.
    pub pending: Option<u32>,
}

impl Event {
    /// Stamps a bare event of `kind` with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            item: None,
            handler: None,
            reason: None,
            elapsed_ms: None,
            timeout_ms: None,
            active: None,
            pending: None,
        }
    }

    /// Attaches an item sequence number.
    #[inline]
    pub fn with_item(mut self, seq: u64) -> Self {
        self.item = Some(seq);
        self
    }

    /// Attaches the handler name.
    #[inline]
    pub fn with_handler(mut self, name: impl Into<Arc<str>>) -> Self {
        self.handler = Some(name.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches handler latency (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(compact_ms(d));
        self
    }

    /// Attaches the run timeout (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(compact_ms(d));
        self
    }

    /// Attaches current load: occupied slots and pending items.
    #[inline]
    pub fn with_load(mut self, active: usize, pending: usize) -> Self {
        self.active = Some(compact_count(active));
        self.pending = Some(compact_count(pending));
        self
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self.kind, EventKind::ItemFailed | EventKind::RunTimedOut)
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

fn compact_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
