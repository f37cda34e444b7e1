//! # Subscribe: react to executor events
//!
//! `Subscribe` is the extension point for plugging custom event handlers into
//! the executor. Each subscriber is driven by a dedicated worker task fed by a
//! bounded queue owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they never block slot tasks
//!   nor other subscribers.
//! - Each subscriber declares its queue capacity via [`Subscribe::queue_capacity`].
//!   On overflow, events for that subscriber are **dropped** (warn).
//!
//! ## Example
//! ```rust
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use workvisor::{Event, EventKind, Subscribe};
//!
//! #[derive(Default)]
//! struct FailureCounter(AtomicUsize);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ItemFailed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "failure-counter" }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// An observer of executor events.
///
/// `on_event` runs on the subscriber's own worker task, never on a slot task;
/// blocking calls still stall that worker and grow its lane.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Reacts to one event.
    async fn on_event(&self, event: &Event);

    /// Name used in warnings and by `SubscriberSet::dropped`.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Bound of this subscriber's lane.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
