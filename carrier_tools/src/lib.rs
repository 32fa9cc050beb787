//! Carrier tracking integrations.
//!
//! Two direct carrier adapters (UPS and FedEx, both OAuth2 client-credentials APIs) plus an
//! API-key tracking aggregator used as the fallback for every other supported carrier. The
//! [`CarrierAdapters`] dispatcher applies the selection policy and implements the engine's
//! `CarrierClient` seam, returning tracking data already normalized onto the shared status
//! vocabulary.

mod aggregator;
mod config;
mod dispatch;
mod error;
mod fedex;
mod token;
mod ups;

pub mod normalize;

pub use aggregator::{AggregatorApi, AggregatorEvent, AggregatorLocation, AggregatorShipment};
pub use config::{AggregatorConfig, CarrierConfig, Environment, FedexConfig, UpsConfig};
pub use dispatch::CarrierAdapters;
pub use error::CarrierApiError;
pub use fedex::{FedexApi, FedexError, FedexScanEvent, FedexScanLocation, FedexStatusDetail, FedexTrackResult};
pub use token::{FreshToken, TokenCache};
pub use ups::{UpsActivity, UpsAddress, UpsApi, UpsLocation, UpsPackage, UpsStatus, UPS_TEST_TRACKING_NUMBERS};
