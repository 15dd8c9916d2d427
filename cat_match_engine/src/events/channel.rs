//! Fire-and-forget event delivery
//!
//! Components of the engine publish events (e.g. "a match request was created") without knowing who, if anyone, is
//! listening. Each subscriber is an [`EventHandler`]: a bounded queue plus an async callback. Handlers are stateless
//! and only ever see the event itself.
//!
//! Publishing never blocks and never fails from the publisher's point of view. If a handler's queue is full, or the
//! handler has shut down, the event is dropped and the fact is logged.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::{mpsc, mpsc::error::TrySendError},
    task::JoinSet,
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    name: &'static str,
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(name: &'static str, buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        Self { name, listener: receiver, sender, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.name, self.sender.clone())
    }

    /// Runs the handler until every producer has been dropped, then waits for in-flight callbacks to finish.
    pub async fn start_handler(mut self) {
        let name = self.name;
        debug!("📬️ Starting {name} event handler");
        // Only producers may keep the channel open
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(ev) = self.listener.recv().await {
            trace!("📬️ Handling {name} event");
            let handler = Arc::clone(&self.handler);
            jobs.spawn(async move { (handler)(ev).await });
            while let Some(done) = jobs.try_join_next() {
                log_job_result(name, done);
            }
        }
        debug!("📬️ All {name} producers are gone. Waiting for {} jobs to complete", jobs.len());
        while let Some(done) = jobs.join_next().await {
            log_job_result(name, done);
        }
        debug!("📬️ {name} event handler has shut down");
    }
}

fn log_job_result(name: &str, result: Result<(), tokio::task::JoinError>) {
    match result {
        Ok(()) => trace!("📬️ {name} event handled"),
        Err(e) => warn!("📬️ A {name} event callback did not complete. {e}"),
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    name: &'static str,
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(name: &'static str, sender: mpsc::Sender<E>) -> Self {
        Self { name, sender }
    }

    /// Queues the event for the handler. This never waits.
    pub fn publish_event(&self, event: E) {
        match self.sender.try_send(event) {
            Ok(()) => trace!("📬️ {} event queued", self.name),
            Err(TrySendError::Full(_)) => warn!("📬️ The {} event queue is full. The event was dropped.", self.name),
            Err(TrySendError::Closed(_)) => {
                error!("📬️ The {} event handler has shut down. The event was dropped.", self.name)
            },
        }
    }
}
