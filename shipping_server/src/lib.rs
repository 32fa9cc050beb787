//! Atelier Shipping Server
//!
//! The HTTP surface of the shipment-tracking subsystem: the seller-facing tracking-attachment
//! route, the scheduler-facing poll-due route, and the wiring that turns engine events into
//! buyer notifications. All business rules live in `shipping_engine`; this crate only
//! authenticates, deserializes and dispatches.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod notifications;
pub mod poll_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
