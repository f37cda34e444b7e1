//! # workvisor
//!
//! **Workvisor** is a bounded, fixed-concurrency work-queue executor for Tokio.
//!
//! It accepts a finite backlog of items, runs at most `max_workers` of them
//! concurrently through a single handler, lets handlers enqueue follow-up
//! items while they run (self-feeding queues), and bounds the whole run with
//! a wall-clock timeout.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   enqueue(item)                     ctx.enqueue(extra)
//!        │                                   ▲
//!        ▼                                   │
//! ┌────────────────────────────────────────────────────────────────┐
//! │  Executor (one monitor)                                        │
//! │  - PendingQueue (FIFO, bounded by queue_size)                  │
//! │  - SlotTable    (occupied slots, bounded by max_workers)       │
//! │  - ResultLog    (one Completion per admitted item)             │
//! │  - RunState     (Idle → Draining → Quiescent | TimedOut)       │
//! └──────┬──────────────────┬──────────────────┬───────────────────┘
//!        ▼                  ▼                  ▼
//!   ┌──────────┐       ┌──────────┐       ┌──────────┐
//!   │ slot #1  │       │ slot #2  │       │ slot #N  │
//!   │ run_once │       │ run_once │       │ run_once │
//!   └────┬─────┘       └────┬─────┘       └────┬─────┘
//!        │ ItemStarted / ItemCompleted / ItemFailed │
//!        ▼                  ▼                  ▼
//! ┌────────────────────────────────────────────────────────────────┐
//! │                   Bus (broadcast channel)                      │
//! └───────────────────────────────┬────────────────────────────────┘
//!                                 ▼
//!                          SubscriberSet ──► LogWriter, custom subscribers
//! ```
//!
//! ### Lifecycle
//! ```text
//! get_results():
//!   ├─► Idle → Draining, publish RunStarted
//!   ├─► fill free slots from the front of the pending queue
//!   │
//!   │   each slot completion:
//!   │     ├─► append Completion { seq, outcome } to the result log
//!   │     ├─► release the slot, refill from the pending queue
//!   │     └─► nothing pending, nothing running ─► Quiescent
//!   │
//!   └─► race(Quiescent, queue_timeout)
//!         ├─ Quiescent first ─► Ok(RunResults)
//!         └─ deadline first  ─► TimedOut, Err(ExecutorError::Timeout)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                       |
//! |-------------------|---------------------------------------------------------------|------------------------------------------|
//! | **Executor**      | Bounded admission, slot scheduling, timeout race.             | [`Executor`], [`ExecutorBuilder`]        |
//! | **Handlers**      | Unit of work with re-feeding and cancellation capabilities.   | [`Handler`], [`HandlerFn`], [`Enqueue`]  |
//! | **Policies**      | Fate of abandoned handlers, order of returned results.        | [`TimeoutPolicy`], [`ResultOrder`]       |
//! | **Subscriber API**| Hook into executor events (logging, metrics).                 | [`Subscribe`], [`SubscriberSet`]         |
//! | **Errors**        | Typed errors for admission, runs and handlers.                | [`ExecutorError`], [`HandlerError`]      |
//! | **Configuration** | Centralize executor settings.                                 | [`Config`]                               |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use workvisor::{Config, Executor, HandlerContext, HandlerError, HandlerFn, HandlerRef, ResultOrder};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::new(3, Duration::from_secs(5), 5)
//!         .with_result_order(ResultOrder::Submission);
//!
//!     let handler: HandlerRef<String, String> = HandlerFn::arc("complete", |item: String, _ctx: HandlerContext<String>| async move {
//!         tokio::time::sleep(Duration::from_millis(10)).await;
//!         Ok::<_, HandlerError>(format!("Completed task:  {item}"))
//!     });
//!
//!     let exec = Executor::new(cfg, handler)?;
//!     exec.enqueue("task1".to_string())?;
//!     exec.enqueue("task2".to_string())?;
//!
//!     let results = exec.get_results().await?;
//!     assert_eq!(
//!         results.into_values(),
//!         vec!["Completed task:  task1", "Completed task:  task2"]
//!     );
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod handlers;
mod policies;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{
    Completion, Config, Executor, ExecutorBuilder, MAX_QUEUE_TIMEOUT, RunResults, RunState,
    RunningTask,
};
pub use error::{ExecutorError, HandlerError};
pub use events::{Bus, Event, EventKind};
pub use handlers::{Enqueue, Handler, HandlerContext, HandlerFn, HandlerRef};
pub use policies::{ResultOrder, TimeoutPolicy};
pub use subscribers::{Subscribe, SubscriberSet};

// Built-in subscriber that renders events through `tracing`.
// Enable with: `--features logging` (on by default).
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
