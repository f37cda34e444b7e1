//! Executor events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by admission, slot tasks and the
//! run driver.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Executor::enqueue`, `Executor::get_results`, `runner::run_once`,
//!   slot completion bookkeeping.
//! - **Consumers**: the subscriber listener (fans out to `SubscriberSet`) and
//!   raw receivers from `Executor::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
