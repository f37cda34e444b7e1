//! # Bounded admission buffer
//!
//! [`PendingQueue`] holds items that were admitted but not yet handed to a slot.
//!
//! ## Invariants
//! - `len() <= capacity()` at all times.
//! - Items enter at the back and leave from the front (FIFO), including items
//!   enqueued by running handlers.
//! - A rejected push leaves the buffer unchanged.

use std::collections::VecDeque;

use crate::error::ExecutorError;

/// FIFO of admitted items tagged with their admission sequence number.
pub(crate) struct PendingQueue<T> {
    capacity: usize,
    items: VecDeque<(u64, T)>,
}

impl<T> PendingQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            items: VecDeque::new(),
        }
    }

    /// Admits `item` if there is room, otherwise returns `QueueFull`.
    pub fn try_admit(&mut self, seq: u64, item: T) -> Result<(), ExecutorError> {
        if self.is_full() {
            return Err(ExecutorError::QueueFull {
                capacity: self.capacity,
            });
        }
        self.items.push_back((seq, item));
        Ok(())
    }

    /// Removes the oldest pending item.
    pub fn pop_front(&mut self) -> Option<(u64, T)> {
        self.items.pop_front()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
