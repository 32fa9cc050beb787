use crate::db_types::{Order, ShipmentStatus};

/// Emitted after a seller successfully attaches (or re-attaches) tracking to an order. The order
/// carries the freshly persisted shipping record.
#[derive(Debug, Clone)]
pub struct TrackingAttachedEvent {
    pub order: Order,
}

/// Emitted by the reconciliation poller when a shipment's normalized status changed from the
/// previously stored value. Not emitted when a poll leaves the status untouched.
#[derive(Debug, Clone)]
pub struct ShipmentStatusChangedEvent {
    pub order: Order,
    pub previous: ShipmentStatus,
    pub current: ShipmentStatus,
}
