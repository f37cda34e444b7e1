//! # Example: basic_run
//!
//! Runs a small backlog through a fixed-latency handler with the built-in
//! [`LogWriter`] attached.
//!
//! Shows how to:
//! - Build an [`Executor`] with [`Executor::builder`] and a subscriber.
//! - Admit items and observe a [`ExecutorError::QueueFull`] rejection.
//! - Collect every result with [`Executor::get_results`].
//!
//! ## Flow
//! ```text
//! enqueue(task1..task3) ──► PendingQueue
//! enqueue(task4)        ──► ExecutorError::QueueFull
//! get_results()
//!     ├─► Idle → Draining (RunStarted)
//!     ├─► 3 slots: ItemStarted ─► handler ─► ItemCompleted
//!     └─► Quiescent (RunQuiescent) ─► Ok(RunResults)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=workvisor=debug cargo run --example basic_run
//! ```

use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;
use workvisor::{
    Config, Executor, ExecutorError, HandlerContext, HandlerError, HandlerFn, HandlerRef,
    LogWriter, ResultOrder,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("workvisor=info")),
        )
        .init();

    let handler: HandlerRef<String, String> = HandlerFn::arc(
        "complete",
        |item: String, _ctx: HandlerContext<String>| async move {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            Ok::<_, HandlerError>(format!("Completed task:  {item}"))
        },
    );

    let cfg = Config::new(3, Duration::from_secs(5), 5).with_result_order(ResultOrder::Submission);
    let exec = Executor::builder(cfg)
        .with_subscriber(Arc::new(LogWriter))
        .build(handler)?;

    for item in ["task1", "task2", "task3", "task4"] {
        match exec.enqueue(item.to_string()) {
            Ok(()) => {}
            Err(err @ ExecutorError::QueueFull { .. }) => {
                println!("[demo] rejected {item}: {err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    let results = exec.get_results().await?;
    println!("[demo] {:?}", results.into_values());
    Ok(())
}
