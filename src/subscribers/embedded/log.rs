//! # LogWriter: events as `tracing` records
//!
//! A minimal subscriber that renders incoming [`Event`]s as structured
//! `tracing` records under the `workvisor` target. Install any `tracing`
//! subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Example output (fmt layer)
//! ```text
//! INFO workvisor: run started timeout_ms=5000 pending=3
//! DEBUG workvisor: item started item=0 handler="complete" active=1 pending=2
//! DEBUG workvisor: item completed item=0 handler="complete" elapsed_ms=1000
//! WARN workvisor: item failed item=1 handler="complete" reason="handler failed: boom" elapsed_ms=3
//! INFO workvisor: run quiescent
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        let handler = e.handler.as_deref().unwrap_or("");
        match e.kind {
            EventKind::RunStarted => {
                tracing::info!(target: "workvisor", timeout_ms = e.timeout_ms, pending = e.pending, "run started");
            }
            EventKind::RunQuiescent => {
                tracing::info!(target: "workvisor", "run quiescent");
            }
            EventKind::RunTimedOut => {
                tracing::warn!(
                    target: "workvisor",
                    reason,
                    timeout_ms = e.timeout_ms,
                    active = e.active,
                    pending = e.pending,
                    "run timed out"
                );
            }
            EventKind::ItemEnqueued => {
                tracing::trace!(target: "workvisor", item = e.item, pending = e.pending, "item enqueued");
            }
            EventKind::ItemRejected => {
                tracing::warn!(target: "workvisor", reason, pending = e.pending, "item rejected");
            }
            EventKind::ItemStarted => {
                tracing::debug!(target: "workvisor", item = e.item, handler, active = e.active, pending = e.pending, "item started");
            }
            EventKind::ItemCompleted => {
                tracing::debug!(target: "workvisor", item = e.item, handler, elapsed_ms = e.elapsed_ms, "item completed");
            }
            EventKind::ItemFailed => {
                tracing::warn!(target: "workvisor", item = e.item, handler, reason, elapsed_ms = e.elapsed_ms, "item failed");
            }
            EventKind::ItemDiscarded => {
                tracing::debug!(target: "workvisor", item = e.item, active = e.active, "item discarded after run ended");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
