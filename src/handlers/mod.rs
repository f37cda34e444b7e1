//! # Handler abstractions.
//!
//! This module provides the handler-related types:
//! - [`Handler`] - trait for the unit of work applied to every admitted item
//! - [`HandlerFn`] - closure-backed handler implementation
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler<T, R>>`)
//! - [`HandlerContext`] - per-invocation capabilities: re-feeding and cancellation
//! - [`Enqueue`] - the admission capability handed to handlers

mod context;
mod handler;
mod handler_fn;

pub use context::{Enqueue, HandlerContext};
pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
