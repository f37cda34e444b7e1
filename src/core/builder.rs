use std::sync::Arc;

use crate::{
    core::{Config, Executor},
    error::ExecutorError,
    events::Bus,
    handlers::HandlerRef,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing an [`Executor`] with optional subscribers.
pub struct ExecutorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ExecutorBuilder {
    /// Starts from `cfg` with no subscribers.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the subscriber list.
    ///
    /// Each subscriber is fed through its own bounded lane. With any set,
    /// [`build`](Self::build) spawns tasks and must run inside a tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the configuration and builds the executor around `handler`.
    ///
    /// Creates the event bus and, when subscribers were given, their lanes
    /// plus the task that forwards bus events into them.
    pub fn build<T, R>(self, handler: HandlerRef<T, R>) -> Result<Executor<T, R>, ExecutorError>
    where
        T: Send + 'static,
        R: Send + 'static,
    {
        self.cfg.validate()?;
        if self.cfg.queue_timeout > self.cfg.queue_timeout_clamped() {
            tracing::debug!(
                requested = ?self.cfg.queue_timeout,
                effective = ?self.cfg.queue_timeout_clamped(),
                "queue timeout clamped"
            );
        }

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let set = (!self.subscribers.is_empty()).then(|| {
            let set = Arc::new(SubscriberSet::new(self.subscribers));
            Arc::clone(&set).listen(&bus);
            set
        });
        Ok(Executor::from_parts(self.cfg, handler, bus, set))
    }
}
