//! # Result log entries returned by a quiescent run.

use crate::error::HandlerError;

/// Outcome of one admitted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion<R> {
    /// Admission sequence number of the item.
    pub seq: u64,
    /// Handler output, or why it produced none.
    pub outcome: Result<R, HandlerError>,
}

impl<R> Completion<R> {
    pub fn new(seq: u64, outcome: Result<R, HandlerError>) -> Self {
        Self { seq, outcome }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Borrowed output for successful items.
    pub fn value(&self) -> Option<&R> {
        self.outcome.as_ref().ok()
    }

    /// Borrowed error for failed items.
    pub fn error(&self) -> Option<&HandlerError> {
        self.outcome.as_ref().err()
    }
}

/// Every outcome of a run, one entry per admitted item.
///
/// Failed handlers are kept as explicit entries, so `len()` always equals the
/// number of items admitted over the run (including items enqueued by handlers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResults<R> {
    entries: Vec<Completion<R>>,
}

impl<R> RunResults<R> {
    pub(crate) fn new(entries: Vec<Completion<R>>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Completion<R>> {
        self.entries.iter()
    }

    /// Successful outputs, in result order.
    pub fn values(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().filter_map(Completion::value)
    }

    /// Failed items as `(seq, error)`, in result order.
    pub fn failures(&self) -> impl Iterator<Item = (u64, &HandlerError)> {
        self.entries
            .iter()
            .filter_map(|c| c.error().map(|e| (c.seq, e)))
    }

    /// Consumes the results, keeping only successful outputs.
    pub fn into_values(self) -> Vec<R> {
        self.entries
            .into_iter()
            .filter_map(|c| c.outcome.ok())
            .collect()
    }

    pub fn into_inner(self) -> Vec<Completion<R>> {
        self.entries
    }
}

impl<R> IntoIterator for RunResults<R> {
    type Item = Completion<R>;
    type IntoIter = std::vec::IntoIter<Completion<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a RunResults<R> {
    type Item = &'a Completion<R>;
    type IntoIter = std::slice::Iter<'a, Completion<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
