use serde::{Deserialize, Serialize};
use shipping_engine::{OrderId, Shipping};

/// Body of the tracking-attachment request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRequest {
    pub tracking_number: String,
    /// Carrier slug. Optional; when absent the carrier is inferred or auto-detected.
    #[serde(default)]
    pub carrier: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingResponse {
    pub order_id: OrderId,
    pub shipping: Shipping,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollQuery {
    #[serde(default)]
    pub secret: Option<String>,
}
