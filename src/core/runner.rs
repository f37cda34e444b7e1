//! # Run a single handler invocation.
//!
//! Executes one item through the [`Handler`], isolating its failure modes and
//! publishing the slot's terminal event to the [`Bus`].
//!
//! ## Event flow
//!
//! ```text
//! Success:       handler.handle() → Ok(r)          → publish ItemCompleted
//! Failure:       handler.handle() → Err(Fail)      → publish ItemFailed
//! Panic:         handler.handle() → unwind caught  → publish ItemFailed (Panicked)
//! Cancellation:  run token cancelled first         → handler future dropped
//!                                                  → publish ItemFailed (Canceled)
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event per invocation.
//! - Never propagates a handler panic into the slot task.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::Instant;

use crate::{
    error::HandlerError,
    events::{Bus, Event, EventKind},
    handlers::{Handler, HandlerContext},
};

/// Executes `handler` on `item` and returns its isolated outcome.
///
/// The handler races the context's cancellation token; a cancelled run wins
/// and the handler future is dropped at its current suspension point.
pub(crate) async fn run_once<T, R>(
    handler: &dyn Handler<T, R>,
    name: &Arc<str>,
    item: T,
    ctx: HandlerContext<T>,
    bus: &Bus,
) -> Result<R, HandlerError>
where
    T: 'static,
    R: 'static,
{
    let seq = ctx.seq();
    let token = ctx.token().clone();
    let started = Instant::now();

    let guarded = AssertUnwindSafe(handler.handle(item, ctx)).catch_unwind();
    let res = tokio::select! {
        biased;
        _ = token.cancelled() => Err(HandlerError::Canceled),
        settled = guarded => match settled {
            Ok(res) => res,
            Err(panic) => Err(HandlerError::Panicked {
                info: panic_message(panic.as_ref()),
            }),
        },
    };

    let elapsed = started.elapsed();
    match &res {
        Ok(_) => bus.publish(
            Event::new(EventKind::ItemCompleted)
                .with_item(seq)
                .with_handler(Arc::clone(name))
                .with_elapsed(elapsed),
        ),
        Err(e) => bus.publish(
            Event::new(EventKind::ItemFailed)
                .with_item(seq)
                .with_handler(Arc::clone(name))
                .with_reason(e.to_string())
                .with_elapsed(elapsed),
        ),
    }
    res
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
