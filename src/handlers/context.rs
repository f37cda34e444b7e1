//! # Per-invocation handler context.
//!
//! A handler never sees the executor itself. It receives a [`HandlerContext`]
//! carrying exactly two capabilities:
//! - **admission** through an [`Enqueue`] implementation (self-feeding queues);
//! - **cancellation** through a child of the run's [`CancellationToken`].
//!
//! Handlers can be exercised in isolation by building a context over a fake
//! [`Enqueue`]:
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use tokio_util::sync::CancellationToken;
//! use workvisor::{Enqueue, ExecutorError, HandlerContext};
//!
//! #[derive(Default)]
//! struct Collect(Mutex<Vec<String>>);
//!
//! impl Enqueue<String> for Collect {
//!     fn enqueue(&self, item: String) -> Result<(), ExecutorError> {
//!         self.0.lock().unwrap().push(item);
//!         Ok(())
//!     }
//! }
//!
//! let sink = Arc::new(Collect::default());
//! let enqueuer: Arc<dyn Enqueue<String>> = sink.clone();
//! let ctx = HandlerContext::new(0, enqueuer, CancellationToken::new());
//! ctx.enqueue("follow-up".to_string()).unwrap();
//! assert_eq!(*sink.0.lock().unwrap(), vec!["follow-up".to_string()]);
//! ```

use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::ExecutorError;

/// Admission capability: submit an item to the same bounded queue.
///
/// Implemented by the executor; must be safe to call from inside a running handler.
pub trait Enqueue<T>: Send + Sync {
    /// Admits `item` or fails with `QueueFull` / `Closed`.
    fn enqueue(&self, item: T) -> Result<(), ExecutorError>;
}

/// Capabilities handed to one handler invocation.
pub struct HandlerContext<T> {
    seq: u64,
    enqueuer: Arc<dyn Enqueue<T>>,
    token: CancellationToken,
}

impl<T> HandlerContext<T> {
    /// Builds a context for the item with admission sequence `seq`.
    pub fn new(seq: u64, enqueuer: Arc<dyn Enqueue<T>>, token: CancellationToken) -> Self {
        Self {
            seq,
            enqueuer,
            token,
        }
    }

    /// Admission sequence number of the item being handled.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Enqueues a follow-up item under the executor's admission rules.
    pub fn enqueue(&self, item: T) -> Result<(), ExecutorError> {
        self.enqueuer.enqueue(item)
    }

    /// Returns a shareable admission handle (e.g. for helper tasks).
    pub fn enqueuer(&self) -> Arc<dyn Enqueue<T>> {
        Arc::clone(&self.enqueuer)
    }

    #[inline]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the run is cancelled (`TimeoutPolicy::Cancel` only).
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

impl<T> Clone for HandlerContext<T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            enqueuer: Arc::clone(&self.enqueuer),
            token: self.token.clone(),
        }
    }
}

impl<T> fmt::Debug for HandlerContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("seq", &self.seq)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}
