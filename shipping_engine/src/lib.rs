//! Atelier Shipping Engine
//!
//! Core library for the marketplace's shipment-tracking subsystem. It owns:
//! 1. The order/shipping data model and its SQLite persistence ([`mod@db_types`], the `sqlite`
//!    module). You should never need to touch the database directly; go through the API and the
//!    traits in [`mod@traits`].
//! 2. The shipment flow API ([`ShipmentFlowApi`]): the seller-triggered tracking-attachment
//!    operation and the scheduled reconciliation poll that keeps in-flight shipments fresh with
//!    status-dependent backoff.
//! 3. Event hooks ([`mod@events`]) through which the server attaches notification side effects
//!    without the engine knowing anything about notification delivery.
//!
//! Carrier integrations live in the `carrier_tools` crate and plug in through the
//! [`traits::CarrierClient`] seam.

pub mod db_types;
pub mod events;
pub mod shipping_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use db_types::{Carrier, NewOrder, Order, OrderId, PaymentStatus, ShipmentStatus, Shipping, TrackingEvent};
pub use shipping_api::{
    next_poll_time,
    PollOutcome,
    PollSummary,
    ShipmentFlowApi,
    ShipmentFlowError,
    MAX_POLL_ATTEMPTS,
    POLL_BATCH_SIZE,
};
