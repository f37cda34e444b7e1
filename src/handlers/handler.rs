//! # Handler trait.
//!
//! A [`Handler`] turns one item into one result. It is supplied once at
//! construction and invoked once per admitted item, possibly concurrently with
//! itself (up to `max_workers` invocations at a time).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;

use super::HandlerContext;

/// Shared handler reference used by the executor.
pub type HandlerRef<T, R> = Arc<dyn Handler<T, R>>;

/// # Asynchronous unit of work.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use workvisor::{Handler, HandlerContext, HandlerError};
///
/// struct Complete;
///
/// #[async_trait]
/// impl Handler<String, String> for Complete {
///     async fn handle(&self, item: String, _ctx: HandlerContext<String>) -> Result<String, HandlerError> {
///         Ok(format!("Completed task:  {item}"))
///     }
/// }
/// ```
#[async_trait]
pub trait Handler<T, R>: Send + Sync + 'static {
    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Handles one item.
    ///
    /// `ctx` may be used to enqueue follow-up items and to observe run cancellation.
    async fn handle(&self, item: T, ctx: HandlerContext<T>) -> Result<R, HandlerError>;
}
