//! # Worker slots.
//!
//! At most `max_workers` items are in flight. A slot is occupied from the
//! moment its item leaves the pending queue until the outcome is recorded.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

/// Snapshot of one occupied worker slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunningTask {
    /// Admission sequence number of the item being handled.
    pub seq: u64,
    /// When the slot was occupied.
    pub started_at: Instant,
}

impl RunningTask {
    /// Time spent in the slot so far.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Occupied worker slots keyed by item sequence number.
pub(crate) struct SlotTable {
    max_workers: usize,
    running: BTreeMap<u64, Instant>,
}

impl SlotTable {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            running: BTreeMap::new(),
        }
    }

    /// Marks `seq` as in flight. Caller must check [`has_free`](Self::has_free) first.
    pub fn occupy(&mut self, seq: u64) {
        debug_assert!(self.has_free(), "slot table overfilled");
        self.running.insert(seq, Instant::now());
    }

    /// Frees the slot held by `seq`, returning how long it was occupied.
    pub fn release(&mut self, seq: u64) -> Option<Duration> {
        self.running.remove(&seq).map(|at| at.elapsed())
    }

    #[inline]
    pub fn has_free(&self) -> bool {
        self.running.len() < self.max_workers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.running.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// In-flight slots ordered by sequence number.
    pub fn snapshot(&self) -> Vec<RunningTask> {
        self.running
            .iter()
            .map(|(&seq, &started_at)| RunningTask { seq, started_at })
            .collect()
    }
}
