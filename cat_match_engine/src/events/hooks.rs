use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, MatchApprovedEvent, MatchRequestedEvent};

/// The publishing side of the registered hooks. Cheap to clone, and handed to the APIs that emit events.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub match_requested_producer: Vec<EventProducer<MatchRequestedEvent>>,
    pub match_approved_producer: Vec<EventProducer<MatchApprovedEvent>>,
}

impl EventProducers {
    pub fn publish_match_requested(&self, event: MatchRequestedEvent) {
        for producer in &self.match_requested_producer {
            producer.publish_event(event.clone());
        }
    }

    pub fn publish_match_approved(&self, event: MatchApprovedEvent) {
        for producer in &self.match_approved_producer {
            producer.publish_event(event.clone());
        }
    }
}

pub struct EventHandlers {
    pub on_match_requested: Option<EventHandler<MatchRequestedEvent>>,
    pub on_match_approved: Option<EventHandler<MatchApprovedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_match_requested =
            hooks.on_match_requested.map(|f| EventHandler::new("match_requested", buffer_size, f));
        let on_match_approved = hooks.on_match_approved.map(|f| EventHandler::new("match_approved", buffer_size, f));
        Self { on_match_requested, on_match_approved }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_match_requested {
            result.match_requested_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_match_approved {
            result.match_approved_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns every registered handler onto the runtime.
    pub fn start_handlers(self) {
        if let Some(handler) = self.on_match_requested {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_match_approved {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_match_requested: Option<Handler<MatchRequestedEvent>>,
    pub on_match_approved: Option<Handler<MatchApprovedEvent>>,
}

impl EventHooks {
    pub fn on_match_requested<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MatchRequestedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_match_requested = Some(Arc::new(f));
        self
    }

    pub fn on_match_approved<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(MatchApprovedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_match_approved = Some(Arc::new(f));
        self
    }
}
