//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(T, HandlerContext<T>) -> Fut`, producing
//! a fresh future per item. Shared state across invocations must be explicit
//! (`Arc<...>` captured by the closure).
//!
//! ## Example
//! ```rust
//! use workvisor::{HandlerContext, HandlerError, HandlerFn, HandlerRef};
//!
//! let h: HandlerRef<String, String> = HandlerFn::arc(
//!     "complete",
//!     |item: String, _ctx: HandlerContext<String>| async move {
//!         Ok::<_, HandlerError>(format!("Completed task:  {item}"))
//!     },
//! );
//! assert_eq!(h.name(), "complete");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;

use super::{Handler, HandlerContext};

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](super::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<T, R, F, Fut> Handler<T, R> for HandlerFn<F>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T, HandlerContext<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, item: T, ctx: HandlerContext<T>) -> Result<R, HandlerError> {
        (self.f)(item, ctx).await
    }
}
