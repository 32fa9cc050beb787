use thiserror::Error;

use crate::db_types::{Carrier, ShipmentStatus, TrackingEvent};

/// Carrier tracking data after normalization onto the shared vocabulary.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTracking {
    /// The carrier that actually answered the query. When the aggregator is used with an `auto`
    /// lookup this may differ from the caller's hint.
    pub carrier: Carrier,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub events: Vec<TrackingEvent>,
}

/// A failed carrier lookup. Carries the upstream HTTP status when one was received so that the
/// tracking-attachment route can pass it through to the seller.
#[derive(Debug, Clone, Error)]
#[error("Carrier lookup failed{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
pub struct CarrierClientError {
    pub status: Option<u16>,
    pub message: String,
}

impl CarrierClientError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

/// The seam to the carrier integrations in `carrier_tools`.
///
/// Implementations hide authentication and transport, apply the adapter-selection policy
/// (explicit carrier, then UPS tracking-number inference, then the aggregator fallback) and
/// normalize the response before returning it.
#[allow(async_fn_in_trait)]
pub trait CarrierClient: Clone {
    async fn fetch_tracking(
        &self,
        tracking_number: &str,
        carrier: Option<Carrier>,
    ) -> Result<NormalizedTracking, CarrierClientError>;
}
