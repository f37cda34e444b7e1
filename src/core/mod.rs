//! Executor core: admission, scheduling and run lifecycle.
//!
//! The only public entry point from this module is [`Executor`] (plus its
//! builder, configuration and result types).
//!
//! Internal modules:
//! - [`admission`]: bounded FIFO of admitted items;
//! - [`slot`]: occupied worker slots and their snapshots;
//! - [`runner`]: executes one handler invocation with panic/cancel isolation;
//! - [`executor`]: the monitor, slot filling, quiescence and the timeout race;
//! - [`builder`]: validates config and wires the event bus and subscribers.

mod admission;
mod builder;
mod config;
mod executor;
mod results;
mod runner;
mod slot;
mod state;

pub use builder::ExecutorBuilder;
pub use config::{Config, MAX_QUEUE_TIMEOUT};
pub use executor::Executor;
pub use results::{Completion, RunResults};
pub use slot::RunningTask;
pub use state::RunState;

pub(crate) use runner::panic_message;
