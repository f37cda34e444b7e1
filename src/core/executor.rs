//! # Executor: bounded admission, slot filling, quiescence and the timeout race.
//!
//! The [`Executor`] owns the pending buffer, the slot table and the result log
//! behind one monitor. Handlers run as tokio tasks; every piece of bookkeeping
//! (admission, pop/push, slot occupy/release, result append, state change) is a
//! single critical section that is never held across an `.await`.
//!
//! ## Scheduling
//! ```text
//! enqueue(item) ──► PendingQueue ──(fill_slots)──► slot task ──► run_once(handler)
//!                        ▲                                            │
//!                        │                                            ▼
//!   ctx.enqueue(extra) ──┘        complete(seq, outcome): append result, release slot,
//!                                 fill_slots again, mark Quiescent if nothing is left
//! ```
//!
//! Every completion is a scheduling point, so items enqueued by handlers are
//! picked up without a polling loop.
//!
//! ## Timeout race
//! ```text
//! get_results():
//!   Idle → Draining, fill_slots
//!   select(watch: state == Quiescent, sleep(queue_timeout))
//!     ├─ quiescent first → take result log (arranged by ResultOrder)
//!     └─ deadline first  → TimedOut, TimeoutPolicy (detach | cancel run token), Err(Timeout)
//! ```
//!
//! ## Dropped `get_results`
//! The run belongs to the `get_results` future that started it. If that future
//! is dropped before the race resolves (outer timeout, losing `select!` branch,
//! aborted task), the run is closed exactly like a deadline miss: the state
//! becomes `TimedOut`, `RunTimedOut` is published with a reason, and the
//! `TimeoutPolicy` is applied. Later calls fail with `NotIdle`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{ExecutorError, HandlerError},
    events::{Bus, Event, EventKind},
    handlers::{Enqueue, HandlerContext, HandlerRef},
    policies::TimeoutPolicy,
    subscribers::SubscriberSet,
};

use super::{
    admission::PendingQueue,
    builder::ExecutorBuilder,
    config::Config,
    results::{Completion, RunResults},
    runner::run_once,
    slot::{RunningTask, SlotTable},
    state::RunState,
};

/// Bounded, fixed-concurrency work-queue executor.
///
/// Cheap to clone: clones share the same run.
pub struct Executor<T, R> {
    shared: Arc<Shared<T, R>>,
}

impl<T, R> Clone for Executor<T, R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// State shared by the executor handle and its slot tasks.
struct Shared<T, R> {
    cfg: Config,
    handler: HandlerRef<T, R>,
    handler_name: Arc<str>,
    bus: Bus,
    subscribers: Option<Arc<SubscriberSet>>,
    run_token: CancellationToken,
    state_tx: watch::Sender<RunState>,
    inner: Mutex<Inner<T, R>>,
}

/// Everything guarded by the monitor.
struct Inner<T, R> {
    state: RunState,
    pending: PendingQueue<T>,
    slots: SlotTable,
    results: Vec<Completion<R>>,
    next_seq: u64,
    runtime: Option<Handle>,
}

impl<T, R> Inner<T, R> {
    fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.slots.is_empty()
    }
}

impl Executor<(), ()> {
    /// Starts building an executor with the given configuration.
    pub fn builder(cfg: Config) -> ExecutorBuilder {
        ExecutorBuilder::new(cfg)
    }
}

impl<T, R> Executor<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    /// Creates an executor without subscribers.
    pub fn new(cfg: Config, handler: HandlerRef<T, R>) -> Result<Self, ExecutorError> {
        ExecutorBuilder::new(cfg).build(handler)
    }

    pub(crate) fn from_parts(
        cfg: Config,
        handler: HandlerRef<T, R>,
        bus: Bus,
        subscribers: Option<Arc<SubscriberSet>>,
    ) -> Self {
        let (state_tx, _) = watch::channel(RunState::Idle);
        let inner = Inner {
            state: RunState::Idle,
            pending: PendingQueue::new(cfg.queue_size),
            slots: SlotTable::new(cfg.max_workers),
            results: Vec::new(),
            next_seq: 0,
            runtime: None,
        };
        let handler_name: Arc<str> = Arc::from(handler.name());
        Self {
            shared: Arc::new(Shared {
                cfg,
                handler,
                handler_name,
                bus,
                subscribers,
                run_token: CancellationToken::new(),
                state_tx,
                inner: Mutex::new(inner),
            }),
        }
    }

    /// Admits `item` into the pending buffer.
    ///
    /// Fails with [`ExecutorError::QueueFull`] when `queue_size` items are already
    /// pending, and with [`ExecutorError::Closed`] once the run is over. While the
    /// run is draining, an admitted item goes straight into a free slot.
    pub fn enqueue(&self, item: T) -> Result<(), ExecutorError> {
        self.shared.enqueue_and_dispatch(item)
    }

    /// Runs every pending item (and every item enqueued along the way) and
    /// returns all outcomes once nothing is pending and no slot is occupied.
    ///
    /// Fails with [`ExecutorError::Timeout`] if the run does not quiesce within
    /// `queue_timeout`; no partial results are returned. An executor runs once:
    /// any further call fails with [`ExecutorError::NotIdle`].
    ///
    /// Dropping the returned future after it has started the run closes the
    /// run as if the deadline had elapsed (see the module docs).
    pub async fn get_results(&self) -> Result<RunResults<R>, ExecutorError> {
        let mut state_rx = self.shared.begin_run()?;
        let timeout = self.shared.cfg.queue_timeout_clamped();
        let mut guard = RunGuard {
            shared: Some(&self.shared),
            timeout,
        };

        // Re-evaluated on every settlement: each completion may have refilled slots.
        let quiesced = time::timeout(timeout, state_rx.wait_for(|s| s.is_quiescent()))
            .await
            .is_ok_and(|res| res.is_ok());
        if !quiesced {
            tracing::debug!(?timeout, "run deadline elapsed before quiescence");
        }
        guard.disarm();
        self.shared.finish_run(timeout)
    }

    /// Snapshot of occupied slots; never longer than `max_workers`.
    pub fn tasks_running(&self) -> Vec<RunningTask> {
        self.shared.lock().slots.snapshot()
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        self.shared.lock().state
    }

    /// Items admitted but not yet started.
    pub fn pending_len(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Occupied slots.
    pub fn active_slots(&self) -> usize {
        self.shared.lock().slots.len()
    }

    /// Receiver for every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.shared.bus.subscribe()
    }

    /// Configuration the executor was built with (unclamped).
    pub fn config(&self) -> &Config {
        &self.shared.cfg
    }

    /// Subscriber lanes attached by [`ExecutorBuilder`], if any.
    ///
    /// Useful for [`SubscriberSet::dropped`]; the set stays attached to the bus
    /// for the executor's lifetime.
    pub fn subscribers(&self) -> Option<&SubscriberSet> {
        self.shared.subscribers.as_deref()
    }
}

impl<T, R> Shared<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn lock(&self) -> MutexGuard<'_, Inner<T, R>> {
        // Critical sections never leave `Inner` half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self, inner: &mut Inner<T, R>, item: T) -> Result<u64, ExecutorError> {
        if inner.state.is_terminal() {
            let err = ExecutorError::Closed { state: inner.state };
            self.publish_rejected(inner, &err);
            return Err(err);
        }
        let seq = inner.next_seq;
        if let Err(err) = inner.pending.try_admit(seq, item) {
            self.publish_rejected(inner, &err);
            return Err(err);
        }
        inner.next_seq += 1;
        self.bus.publish(
            Event::new(EventKind::ItemEnqueued)
                .with_item(seq)
                .with_load(inner.slots.len(), inner.pending.len()),
        );
        Ok(seq)
    }

    fn publish_rejected(&self, inner: &Inner<T, R>, err: &ExecutorError) {
        self.bus.publish(
            Event::new(EventKind::ItemRejected)
                .with_reason(err.to_string())
                .with_load(inner.slots.len(), inner.pending.len()),
        );
    }

    /// Transitions Idle → Draining and fills the initial slots.
    fn begin_run(self: &Arc<Self>) -> Result<watch::Receiver<RunState>, ExecutorError> {
        let state_rx = self.state_tx.subscribe();
        let mut inner = self.lock();
        if inner.state != RunState::Idle {
            return Err(ExecutorError::NotIdle { state: inner.state });
        }

        inner.runtime = Some(Handle::current());
        self.transition(&mut inner, RunState::Draining);
        self.bus.publish(
            Event::new(EventKind::RunStarted)
                .with_timeout(self.cfg.queue_timeout_clamped())
                .with_load(0, inner.pending.len()),
        );

        self.fill_slots(&mut inner);
        if inner.is_drained() {
            self.mark_quiescent(&mut inner);
        }
        Ok(state_rx)
    }

    /// Resolves the timeout race under the monitor.
    ///
    /// A run that quiesced exactly at the deadline still returns its results.
    fn finish_run(&self, timeout: std::time::Duration) -> Result<RunResults<R>, ExecutorError> {
        let mut inner = self.lock();
        if inner.state.is_quiescent() {
            let mut entries = std::mem::take(&mut inner.results);
            self.cfg.result_order.arrange(&mut entries);
            return Ok(RunResults::new(entries));
        }

        self.close_run(&mut inner, timeout, None);
        Err(ExecutorError::Timeout { timeout })
    }

    /// Closes a run whose `get_results` future was dropped mid-race.
    fn abandon_run(&self, timeout: std::time::Duration) {
        let mut inner = self.lock();
        if inner.state.is_terminal() && !inner.results.is_empty() {
            tracing::debug!(
                discarded = inner.results.len(),
                "get_results dropped after quiescence"
            );
            inner.results.clear();
            return;
        }
        if inner.state == RunState::Draining {
            tracing::debug!("get_results dropped before quiescence; closing run");
            self.close_run(&mut inner, timeout, Some("get_results dropped"));
        }
    }

    /// TimedOut transition shared by a missed deadline and an abandoned run.
    fn close_run(
        &self,
        inner: &mut Inner<T, R>,
        timeout: std::time::Duration,
        reason: Option<&'static str>,
    ) {
        self.transition(inner, RunState::TimedOut);
        let mut ev = Event::new(EventKind::RunTimedOut)
            .with_timeout(timeout)
            .with_load(inner.slots.len(), inner.pending.len());
        if let Some(reason) = reason {
            ev = ev.with_reason(reason);
        }
        self.bus.publish(ev);
        inner.results.clear();
        if self.cfg.on_timeout == TimeoutPolicy::Cancel {
            self.run_token.cancel();
        }
    }

    /// Pops pending items into free slots, in FIFO order.
    fn fill_slots(self: &Arc<Self>, inner: &mut Inner<T, R>) {
        while inner.state == RunState::Draining && inner.slots.has_free() {
            let Some((seq, item)) = inner.pending.pop_front() else {
                break;
            };
            self.start_slot(inner, seq, item);
        }
    }

    fn start_slot(self: &Arc<Self>, inner: &mut Inner<T, R>, seq: u64, item: T) {
        inner.slots.occupy(seq);
        self.bus.publish(
            Event::new(EventKind::ItemStarted)
                .with_item(seq)
                .with_handler(Arc::clone(&self.handler_name))
                .with_load(inner.slots.len(), inner.pending.len()),
        );

        let enqueuer: Arc<dyn Enqueue<T>> = Arc::new(SlotEnqueuer(Arc::clone(self)));
        let ctx = HandlerContext::new(seq, enqueuer, self.run_token.child_token());
        let shared = Arc::clone(self);
        let task = async move {
            let outcome = run_once(
                shared.handler.as_ref(),
                &shared.handler_name,
                item,
                ctx,
                &shared.bus,
            )
            .await;
            shared.complete(seq, outcome);
        };

        // The monitor is held here, so `complete` cannot observe the slot before it is occupied.
        match &inner.runtime {
            Some(rt) => {
                rt.spawn(task);
            }
            None => {
                tokio::spawn(task);
            }
        }
    }

    /// Completion continuation of one slot.
    fn complete(self: &Arc<Self>, seq: u64, outcome: Result<R, HandlerError>) {
        let mut inner = self.lock();
        inner.slots.release(seq);

        if inner.state != RunState::Draining {
            self.bus.publish(
                Event::new(EventKind::ItemDiscarded)
                    .with_item(seq)
                    .with_load(inner.slots.len(), inner.pending.len()),
            );
            return;
        }

        inner.results.push(Completion::new(seq, outcome));
        self.fill_slots(&mut inner);
        if inner.is_drained() {
            self.mark_quiescent(&mut inner);
        }
    }

    fn mark_quiescent(&self, inner: &mut Inner<T, R>) {
        self.transition(inner, RunState::Quiescent);
        self.bus.publish(Event::new(EventKind::RunQuiescent).with_load(0, 0));
    }

    fn transition(&self, inner: &mut Inner<T, R>, next: RunState) {
        tracing::trace!(from = %inner.state, to = %next, "run state transition");
        inner.state = next;
        self.state_tx.send_replace(next);
    }

    fn enqueue_and_dispatch(self: &Arc<Self>, item: T) -> Result<(), ExecutorError> {
        let mut inner = self.lock();
        self.admit(&mut inner, item)?;
        self.fill_slots(&mut inner);
        Ok(())
    }
}

/// Closes the run if `get_results` is dropped before the race resolves.
struct RunGuard<'a, T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    shared: Option<&'a Arc<Shared<T, R>>>,
    timeout: std::time::Duration,
}

impl<T, R> RunGuard<'_, T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn disarm(&mut self) {
        self.shared = None;
    }
}

impl<T, R> Drop for RunGuard<'_, T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.abandon_run(self.timeout);
        }
    }
}

/// Admission capability handed to handlers.
struct SlotEnqueuer<T, R>(Arc<Shared<T, R>>);

impl<T, R> Enqueue<T> for SlotEnqueuer<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn enqueue(&self, item: T) -> Result<(), ExecutorError> {
        self.0.enqueue_and_dispatch(item)
    }
}

impl<T, R> Enqueue<T> for Executor<T, R>
where
    T: Send + 'static,
    R: Send + 'static,
{
    fn enqueue(&self, item: T) -> Result<(), ExecutorError> {
        self.shared.enqueue_and_dispatch(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MAX_QUEUE_TIMEOUT;
    use crate::handlers::HandlerFn;
    use crate::policies::ResultOrder;
    use crate::subscribers::Subscribe;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::{Instant, sleep};

    fn cfg(queue_size: usize, timeout_ms: u64, max_workers: usize) -> Config {
        Config::new(queue_size, Duration::from_millis(timeout_ms), max_workers)
    }

    fn completing(delay_ms: u64) -> HandlerRef<String, String> {
        HandlerFn::arc(
            "complete",
            move |item: String, _ctx: HandlerContext<String>| async move {
                sleep(Duration::from_millis(delay_ms)).await;
                Ok::<_, HandlerError>(format!("Completed task:  {item}"))
            },
        )
    }

    /// Handler that sleeps `item` milliseconds and tracks peak concurrency.
    fn tracking(current: Arc<AtomicUsize>, peak: Arc<AtomicUsize>) -> HandlerRef<u64, u64> {
        HandlerFn::arc("tracking", move |ms: u64, _ctx: HandlerContext<u64>| {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(ms)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, HandlerError>(ms)
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn runs_every_enqueued_item() {
        let exec = Executor::new(
            cfg(3, 5000, 5).with_result_order(ResultOrder::Submission),
            completing(10),
        )
        .unwrap();
        for item in ["task1", "task2", "task3"] {
            exec.enqueue(item.to_string()).unwrap();
        }

        let results = exec.get_results().await.unwrap();
        assert_eq!(
            results.into_values(),
            vec![
                "Completed task:  task1",
                "Completed task:  task2",
                "Completed task:  task3"
            ]
        );
        assert_eq!(exec.state(), RunState::Quiescent);
        assert!(exec.tasks_running().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_run_quiesces_immediately() {
        let exec = Executor::new(cfg(3, 50, 2), completing(10)).unwrap();
        let results = exec.get_results().await.unwrap();
        assert!(results.is_empty());
        assert_eq!(exec.state(), RunState::Quiescent);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_run_times_out_and_closes() {
        let exec = Executor::new(cfg(3, 50, 5), completing(1000)).unwrap();
        exec.enqueue("task1".to_string()).unwrap();

        let started = Instant::now();
        let err = exec.get_results().await.unwrap_err();
        assert_eq!(
            err,
            ExecutorError::Timeout {
                timeout: Duration::from_millis(50)
            }
        );
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(exec.state(), RunState::TimedOut);

        assert_eq!(
            exec.get_results().await.unwrap_err(),
            ExecutorError::NotIdle {
                state: RunState::TimedOut
            }
        );
        assert_eq!(
            exec.enqueue("late".to_string()),
            Err(ExecutorError::Closed {
                state: RunState::TimedOut
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overflow_rejects_without_losing_admitted_items() {
        let exec = Executor::new(cfg(3, 5000, 5), completing(10)).unwrap();
        for item in ["task1", "task2", "task3"] {
            exec.enqueue(item.to_string()).unwrap();
        }
        assert_eq!(
            exec.enqueue("task4".to_string()),
            Err(ExecutorError::QueueFull { capacity: 3 })
        );
        assert_eq!(exec.pending_len(), 3);

        let results = exec.get_results().await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn handlers_feed_the_queue() {
        let handler: HandlerRef<String, String> = HandlerFn::arc(
            "feeder",
            |item: String, ctx: HandlerContext<String>| async move {
                if item == "in-1" {
                    ctx.enqueue("in-extra".to_string())
                        .map_err(|e| HandlerError::fail(e.as_message()))?;
                }
                sleep(Duration::from_millis(20)).await;
                Ok::<_, HandlerError>(format!("done {item}"))
            },
        );
        let exec = Executor::new(
            cfg(10, 5000, 2).with_result_order(ResultOrder::Submission),
            handler,
        )
        .unwrap();
        for i in 1..=5 {
            exec.enqueue(format!("in-{i}")).unwrap();
        }

        let results = exec.get_results().await.unwrap();
        assert_eq!(results.len(), 6);
        assert_eq!(
            results.values().last().map(String::as_str),
            Some("done in-extra")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn refill_keeps_every_slot_busy() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let exec = Executor::new(
            Config::new(6, Duration::from_secs(5), 2),
            tracking(current, Arc::clone(&peak)),
        )
        .unwrap();
        for _ in 0..6 {
            exec.enqueue(100).unwrap();
        }

        let started = Instant::now();
        let results = exec.get_results().await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(results.len(), 6);
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(320), "{elapsed:?}");
        assert_eq!(peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_running_never_exceeds_max_workers() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let exec = Executor::new(
            Config::new(8, Duration::from_secs(5), 2),
            tracking(current, Arc::clone(&peak)),
        )
        .unwrap();
        for ms in [40, 10, 30, 20, 50] {
            exec.enqueue(ms).unwrap();
        }

        let sampler = {
            let exec = exec.clone();
            tokio::spawn(async move {
                let mut seen = 0;
                for _ in 0..40 {
                    seen = seen.max(exec.tasks_running().len());
                    sleep(Duration::from_millis(5)).await;
                }
                seen
            })
        };

        let results = exec.get_results().await.unwrap();
        assert_eq!(results.len(), 5);
        let seen = sampler.await.unwrap();
        assert!(seen <= 2, "sampled {seen} running tasks");
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_order_follows_latency() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let exec = Executor::new(
            Config::new(3, Duration::from_secs(1), 3),
            tracking(current, peak),
        )
        .unwrap();
        for ms in [30, 10, 20] {
            exec.enqueue(ms).unwrap();
        }

        let results = exec.get_results().await.unwrap();
        let seqs: Vec<u64> = results.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, vec![1, 2, 0]);
        assert_eq!(results.into_values(), vec![10, 20, 30]);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_and_panics_are_isolated() {
        let handler: HandlerRef<String, String> = HandlerFn::arc(
            "flaky",
            |item: String, _ctx: HandlerContext<String>| async move {
                match item.as_str() {
                    "bad" => Err(HandlerError::fail("bad input")),
                    "boom" => panic!("exploded"),
                    _ => Ok(item),
                }
            },
        );
        let exec = Executor::new(
            cfg(3, 1000, 1).with_result_order(ResultOrder::Submission),
            handler,
        )
        .unwrap();
        for item in ["bad", "boom", "ok"] {
            exec.enqueue(item.to_string()).unwrap();
        }

        let results = exec.get_results().await.unwrap();
        assert_eq!(results.len(), 3);
        let failures: Vec<(u64, HandlerError)> =
            results.failures().map(|(seq, e)| (seq, e.clone())).collect();
        assert_eq!(
            failures,
            vec![
                (0, HandlerError::fail("bad input")),
                (
                    1,
                    HandlerError::Panicked {
                        info: "exploded".into()
                    }
                ),
            ]
        );
        assert_eq!(results.into_values(), vec!["ok".to_string()]);
    }

    fn flagging(flag: Arc<AtomicBool>) -> HandlerRef<u32, u32> {
        HandlerFn::arc("flagging", move |n: u32, _ctx: HandlerContext<u32>| {
            let flag = Arc::clone(&flag);
            async move {
                sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok::<_, HandlerError>(n)
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn detached_handlers_finish_after_timeout() {
        let flag = Arc::new(AtomicBool::new(false));
        let exec = Executor::new(cfg(1, 50, 1), flagging(Arc::clone(&flag))).unwrap();
        let mut events = exec.subscribe();
        exec.enqueue(1).unwrap();

        assert!(exec.get_results().await.is_err());
        assert_eq!(exec.tasks_running().len(), 1);

        sleep(Duration::from_millis(500)).await;
        assert!(flag.load(Ordering::SeqCst));
        assert!(exec.tasks_running().is_empty());

        let mut kinds = Vec::new();
        while let Ok(ev) = events.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(kinds.last(), Some(&EventKind::ItemDiscarded));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_policy_drops_handlers_on_timeout() {
        let flag = Arc::new(AtomicBool::new(false));
        let exec = Executor::new(
            cfg(1, 50, 1).with_timeout_policy(TimeoutPolicy::Cancel),
            flagging(Arc::clone(&flag)),
        )
        .unwrap();
        exec.enqueue(1).unwrap();

        assert!(exec.get_results().await.is_err());

        sleep(Duration::from_millis(500)).await;
        assert!(!flag.load(Ordering::SeqCst));
        assert!(exec.tasks_running().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn handler_enqueue_respects_capacity() {
        let handler: HandlerRef<String, String> = HandlerFn::arc(
            "overfill",
            |item: String, ctx: HandlerContext<String>| async move {
                if item != "seed" {
                    return Ok::<_, HandlerError>(item);
                }
                ctx.enqueue("x".to_string())
                    .map_err(|e| HandlerError::fail(e.as_message()))?;
                match ctx.enqueue("y".to_string()) {
                    Err(e) => Ok(e.as_label().to_string()),
                    Ok(()) => Ok("admitted".to_string()),
                }
            },
        );
        let exec = Executor::new(
            cfg(1, 1000, 1).with_result_order(ResultOrder::Submission),
            handler,
        )
        .unwrap();
        exec.enqueue("seed".to_string()).unwrap();

        let results = exec.get_results().await.unwrap();
        assert_eq!(results.into_values(), vec!["queue_full", "x"]);
    }

    #[tokio::test(start_paused = true)]
    async fn run_publishes_lifecycle_events() {
        let exec = Executor::new(cfg(2, 1000, 2), completing(10)).unwrap();
        let mut events = exec.subscribe();
        exec.enqueue("a".to_string()).unwrap();
        exec.enqueue("b".to_string()).unwrap();
        exec.get_results().await.unwrap();

        let mut all = Vec::new();
        while let Ok(ev) = events.try_recv() {
            all.push(ev);
        }
        let kinds: Vec<EventKind> = all.iter().map(|ev| ev.kind).collect();
        let count = |k: EventKind| kinds.iter().filter(|&&x| x == k).count();

        for ev in &all {
            let slot_event = matches!(ev.kind, EventKind::ItemStarted | EventKind::ItemCompleted);
            let expected = slot_event.then_some("complete");
            assert_eq!(ev.handler.as_deref(), expected, "{:?}", ev.kind);
        }

        assert_eq!(kinds.first(), Some(&EventKind::ItemEnqueued));
        assert_eq!(kinds.last(), Some(&EventKind::RunQuiescent));
        assert_eq!(count(EventKind::ItemEnqueued), 2);
        assert_eq!(count(EventKind::RunStarted), 1);
        assert_eq!(count(EventKind::ItemStarted), 2);
        assert_eq!(count(EventKind::ItemCompleted), 2);
    }

    struct Recorder(std::sync::Mutex<Vec<EventKind>>);

    #[async_trait::async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.0.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_the_run() {
        let recorder = Arc::new(Recorder(std::sync::Mutex::new(Vec::new())));
        let exec = Executor::builder(cfg(2, 1000, 2))
            .with_subscriber(recorder.clone())
            .build(completing(10))
            .unwrap();
        exec.enqueue("a".to_string()).unwrap();
        exec.get_results().await.unwrap();

        for _ in 0..50 {
            if recorder.0.lock().unwrap().contains(&EventKind::RunQuiescent) {
                break;
            }
            sleep(Duration::from_millis(10)).await;
        }
        let seen = recorder.0.lock().unwrap().clone();
        assert!(seen.contains(&EventKind::ItemCompleted));
        assert!(seen.contains(&EventKind::RunQuiescent));

        let lanes = exec.subscribers().expect("builder attached a subscriber set");
        assert_eq!(lanes.len(), 1);
        assert_eq!(lanes.dropped("recorder"), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn executor_without_subscribers_has_no_lanes() {
        let exec = Executor::new(cfg(1, 1000, 1), completing(10)).unwrap();
        assert!(exec.subscribers().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_get_results_closes_the_run() {
        let flag = Arc::new(AtomicBool::new(false));
        let exec = Executor::new(cfg(1, 5000, 1), flagging(Arc::clone(&flag))).unwrap();
        let mut events = exec.subscribe();
        exec.enqueue(1).unwrap();

        let outer = time::timeout(Duration::from_millis(10), exec.get_results()).await;
        assert!(outer.is_err());
        assert_eq!(exec.state(), RunState::TimedOut);

        sleep(Duration::from_millis(500)).await;
        assert!(flag.load(Ordering::SeqCst));
        assert!(exec.tasks_running().is_empty());
        assert_eq!(
            exec.get_results().await.unwrap_err(),
            ExecutorError::NotIdle {
                state: RunState::TimedOut
            }
        );
        assert_eq!(
            exec.enqueue(2),
            Err(ExecutorError::Closed {
                state: RunState::TimedOut
            })
        );

        let mut all = Vec::new();
        while let Ok(ev) = events.try_recv() {
            all.push(ev);
        }
        let closed = all
            .iter()
            .find(|ev| ev.kind == EventKind::RunTimedOut)
            .expect("run closed");
        assert_eq!(closed.reason.as_deref(), Some("get_results dropped"));
        assert_eq!(closed.active, Some(1));
        assert_eq!(all.last().map(|ev| ev.kind), Some(EventKind::ItemDiscarded));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_get_results_cancels_under_cancel_policy() {
        let flag = Arc::new(AtomicBool::new(false));
        let exec = Executor::new(
            cfg(1, 5000, 1).with_timeout_policy(TimeoutPolicy::Cancel),
            flagging(Arc::clone(&flag)),
        )
        .unwrap();
        exec.enqueue(1).unwrap();

        let outer = time::timeout(Duration::from_millis(10), exec.get_results()).await;
        assert!(outer.is_err());

        sleep(Duration::from_millis(500)).await;
        assert!(!flag.load(Ordering::SeqCst));
        assert!(exec.tasks_running().is_empty());
        assert_eq!(exec.state(), RunState::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_timeout_is_clamped_for_the_run() {
        let handler: HandlerRef<u32, u32> =
            HandlerFn::arc("stuck", |n: u32, _ctx: HandlerContext<u32>| async move {
                sleep(Duration::from_secs(365 * 24 * 60 * 60)).await;
                Ok::<_, HandlerError>(n)
            });
        let exec = Executor::new(Config::new(1, Duration::MAX, 1), handler).unwrap();
        let mut events = exec.subscribe();
        exec.enqueue(1).unwrap();

        assert_eq!(
            exec.get_results().await.unwrap_err(),
            ExecutorError::Timeout {
                timeout: MAX_QUEUE_TIMEOUT
            }
        );

        let mut reported = Vec::new();
        while let Ok(ev) = events.try_recv() {
            if matches!(ev.kind, EventKind::RunStarted | EventKind::RunTimedOut) {
                reported.push((ev.kind, ev.timeout_ms));
            }
        }
        let clamped_ms = Some(i32::MAX as u32);
        assert_eq!(
            reported,
            vec![
                (EventKind::RunStarted, clamped_ms),
                (EventKind::RunTimedOut, clamped_ms)
            ]
        );
    }

    #[test]
    fn builder_rejects_zero_sizes() {
        let err = Executor::new(cfg(0, 1000, 2), completing(10)).err();
        assert_eq!(
            err,
            Some(ExecutorError::InvalidConfig {
                field: "queue_size",
                reason: "must be positive"
            })
        );
        let err = Executor::new(cfg(2, 1000, 0), completing(10)).err();
        assert!(matches!(
            err,
            Some(ExecutorError::InvalidConfig {
                field: "max_workers",
                ..
            })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_runtime_keeps_counts_consistent() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let handler: HandlerRef<u32, u32> = {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            HandlerFn::arc("stress", move |n: u32, ctx: HandlerContext<u32>| {
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    if n < 200 && n % 10 == 0 {
                        ctx.enqueue(n + 1000)
                            .map_err(|e| HandlerError::fail(e.as_message()))?;
                    }
                    tokio::task::yield_now().await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, HandlerError>(n)
                }
            })
        };
        let exec = Executor::new(Config::new(256, Duration::from_secs(10), 8), handler).unwrap();
        for n in 0..200 {
            exec.enqueue(n).unwrap();
        }

        let results = exec.get_results().await.unwrap();
        assert_eq!(results.len(), 220);
        assert_eq!(results.failures().count(), 0);
        assert!(peak.load(Ordering::SeqCst) <= 8);
        assert!(exec.tasks_running().is_empty());
    }
}
