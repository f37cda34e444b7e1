//! Run policies.
//!
//! This module groups the knobs that decide **what happens to abandoned work**
//! when a run times out and **in which order** results are handed back.
//!
//! ## Contents
//! - [`TimeoutPolicy`] detach or cancel in-flight handlers when the run budget elapses
//! - [`ResultOrder`]   completion order (legacy) or admission order
//!
//! ## Quick wiring
//! ```text
//! Config { on_timeout: TimeoutPolicy, result_order: ResultOrder, .. }
//!      └─► core::executor uses:
//!           - on_timeout to decide whether to cancel the run token
//!           - result_order to arrange the result log before returning it
//! ```
//!
//! ## Defaults
//! - `TimeoutPolicy::Detach` (abandoned handlers keep running; their results are discarded).
//! - `ResultOrder::Completion`.

mod order;
mod timeout;

pub use order::ResultOrder;
pub use timeout::TimeoutPolicy;
