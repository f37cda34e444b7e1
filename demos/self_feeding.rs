//! # Example: self_feeding
//!
//! A handler that discovers more work while it runs: each directory-like item
//! enqueues its children through the [`HandlerContext`], and the run only ends
//! once the whole tree has been visited.
//!
//! Also shows a raw event receiver from [`Executor::subscribe`] counting
//! rejections, and [`Executor::tasks_running`] sampled from a side task.
//!
//! ## Run
//! ```bash
//! cargo run --example self_feeding
//! ```

use std::time::Duration;

use workvisor::{
    Config, EventKind, Executor, HandlerContext, HandlerError, HandlerFn, HandlerRef, ResultOrder,
};

/// Depth-limited fan-out: `"a"` spawns `"a/0"` and `"a/1"`, and so on.
const MAX_DEPTH: usize = 3;
const FAN_OUT: usize = 2;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let handler: HandlerRef<String, usize> = HandlerFn::arc(
        "walk",
        |path: String, ctx: HandlerContext<String>| async move {
            let depth = path.matches('/').count();
            tokio::time::sleep(Duration::from_millis(20)).await;
            if depth < MAX_DEPTH {
                for child in 0..FAN_OUT {
                    ctx.enqueue(format!("{path}/{child}"))
                        .map_err(|e| HandlerError::fail(e.as_message()))?;
                }
            }
            Ok::<_, HandlerError>(depth)
        },
    );

    let cfg = Config::new(64, Duration::from_secs(5), 2).with_result_order(ResultOrder::Submission);
    let exec = Executor::new(cfg, handler)?;
    let mut events = exec.subscribe();

    exec.enqueue("root".to_string())?;

    let sampler = {
        let exec = exec.clone();
        tokio::spawn(async move {
            let mut peak = 0;
            while !exec.state().is_terminal() {
                peak = peak.max(exec.tasks_running().len());
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            peak
        })
    };

    let results = exec.get_results().await?;
    let peak = sampler.await?;

    let mut rejected = 0;
    while let Ok(ev) = events.try_recv() {
        if ev.kind == EventKind::ItemRejected {
            rejected += 1;
        }
    }

    println!(
        "[demo] visited={} failed={} rejected={} peak_running={}",
        results.len(),
        results.failures().count(),
        rejected,
        peak
    );
    Ok(())
}
