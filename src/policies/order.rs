//! # Ordering contract for returned results.
//!
//! The result log is appended in **completion order**. With variable handler
//! latency, and with items enqueued by handlers racing pre-existing ones for
//! free slots, completion order does not generally match submission order.
//!
//! - [`ResultOrder::Completion`] returns the log as appended (default).
//! - [`ResultOrder::Submission`] sorts entries by admission sequence number.

use crate::core::Completion;

/// Order in which [`RunResults`](crate::RunResults) entries are returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResultOrder {
    /// Order in which handlers settled.
    #[default]
    Completion,
    /// Order in which items were admitted.
    Submission,
}

impl ResultOrder {
    /// Arranges `entries` (given in completion order) according to this policy.
    pub(crate) fn arrange<R>(self, entries: &mut [Completion<R>]) {
        if let ResultOrder::Submission = self {
            entries.sort_by_key(|c| c.seq);
        }
    }
}
