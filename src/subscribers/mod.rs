//! # Event subscribers for the executor.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ```text
//! slot task ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                        ├──► LogWriter
//!                                                        └──► custom subscribers
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
