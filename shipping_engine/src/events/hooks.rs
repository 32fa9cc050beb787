use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, ShipmentStatusChangedEvent, TrackingAttachedEvent};

/// The producer side handed to [`crate::ShipmentFlowApi`]. Cloneable; every producer feeds the
/// same handler.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub tracking_attached_producer: Vec<EventProducer<TrackingAttachedEvent>>,
    pub status_changed_producer: Vec<EventProducer<ShipmentStatusChangedEvent>>,
}

/// Owns the handler loops. Build with the hooks you care about, take [`Self::producers`] for the
/// API, then call [`Self::start_handlers`] once at startup.
pub struct EventHandlers {
    pub on_tracking_attached: Option<EventHandler<TrackingAttachedEvent>>,
    pub on_status_changed: Option<EventHandler<ShipmentStatusChangedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_tracking_attached = hooks.on_tracking_attached.map(|f| EventHandler::new(buffer_size, f));
        let on_status_changed = hooks.on_status_changed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_tracking_attached, on_status_changed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_tracking_attached {
            result.tracking_attached_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_status_changed {
            result.status_changed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_tracking_attached {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_status_changed {
            tokio::spawn(handler.start_handler());
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_tracking_attached: Option<Handler<TrackingAttachedEvent>>,
    pub on_status_changed: Option<Handler<ShipmentStatusChangedEvent>>,
}

impl EventHooks {
    pub fn on_tracking_attached<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(TrackingAttachedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_tracking_attached = Some(Arc::new(f));
        self
    }

    pub fn on_status_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(ShipmentStatusChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_status_changed = Some(Arc::new(f));
        self
    }
}
