//! # Per-subscriber lanes fed from the event bus.
//!
//! Every subscriber gets its own **lane**: a bounded mpsc queue drained by a
//! dedicated worker task. Delivering an event is a `try_send` per lane, so a
//! slow or broken subscriber only ever hurts itself.
//!
//! ```text
//! Bus ─► listener ─► SubscriberSet::emit(&Event)
//!                        │  Arc<Event> shared by all lanes
//!                        ├──► lane "log"     [bounded] ─► worker ─► on_event()
//!                        └──► lane "metrics" [bounded] ─► worker ─► on_event()
//! ```
//!
//! ## Delivery rules
//! - Lanes preserve emit order; nothing orders events across lanes.
//! - A full or closed lane drops the event for that lane only (counted, warned).
//! - A panic in `on_event` is caught; the worker keeps draining its lane.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;

use crate::events::{Bus, Event};

use super::Subscribe;

struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
    worker: JoinHandle<()>,
    dropped: AtomicU64,
}

impl Lane {
    fn open(sub: Arc<dyn Subscribe>) -> Self {
        let name = sub.name();
        let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
        let worker = tokio::spawn(drain(sub, rx));
        Self {
            name,
            tx,
            worker,
            dropped: AtomicU64::new(0),
        }
    }

    fn offer(&self, ev: &Arc<Event>) {
        let cause = match self.tx.try_send(Arc::clone(ev)) {
            Ok(()) => return,
            Err(TrySendError::Full(_)) => "lane full",
            Err(TrySendError::Closed(_)) => "lane closed",
        };
        let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::warn!(subscriber = self.name, cause, total, "event dropped");
    }
}

async fn drain(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>) {
    while let Some(ev) = rx.recv().await {
        let delivered = AssertUnwindSafe(sub.on_event(&ev)).catch_unwind().await;
        if let Err(payload) = delivered {
            tracing::warn!(
                subscriber = sub.name(),
                event = ?ev.kind,
                info = %crate::core::panic_message(payload.as_ref()),
                "subscriber panicked"
            );
        }
    }
}

/// Fan-out over subscribers, one bounded lane and worker task each.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
}

impl SubscriberSet {
    /// Opens one lane per subscriber. Must be called inside a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        Self {
            lanes: subs.into_iter().map(Lane::open).collect(),
        }
    }

    /// Offers `event` to every lane without waiting.
    pub fn emit(&self, event: &Event) {
        let shared = Arc::new(event.clone());
        self.lanes.iter().for_each(|lane| lane.offer(&shared));
    }

    /// Events dropped so far for the subscriber called `name`.
    pub fn dropped(&self, name: &str) -> Option<u64> {
        self.lanes
            .iter()
            .find(|lane| lane.name == name)
            .map(|lane| lane.dropped.load(Ordering::Relaxed))
    }

    /// Forwards every bus event to this set until the bus closes.
    pub(crate) fn listen(self: Arc<Self>, bus: &Bus) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => self.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    /// Closes every lane and waits until each worker has drained it.
    ///
    /// Only for sets you own. The set attached by `ExecutorBuilder` is shared
    /// with the bus listener and lives as long as the executor; inspect it
    /// through `Executor::subscribers`.
    pub async fn shutdown(self) {
        let mut workers = Vec::with_capacity(self.lanes.len());
        for lane in self.lanes {
            drop(lane.tx);
            workers.push(lane.worker);
        }
        for worker in workers {
            let _ = worker.await;
        }
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}
