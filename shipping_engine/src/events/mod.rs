//! Stateless pub-sub hooks for shipment side effects.
//!
//! The flow API publishes an event whenever tracking is attached or a shipment status changes.
//! Subscribers (the notification wiring in the server, typically) react asynchronously and have
//! no access to engine state beyond the event payload itself. Handler failures stay inside the
//! handler task; they can never fail the operation that emitted the event.

mod channel;
mod event_types;
mod hooks;

pub use channel::{EventHandler, EventProducer, Handler};
pub use event_types::{ShipmentStatusChangedEvent, TrackingAttachedEvent};
pub use hooks::{EventHandlers, EventHooks, EventProducers};
