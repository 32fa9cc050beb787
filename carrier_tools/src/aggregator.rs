use log::*;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{config::AggregatorConfig, error::CarrierApiError};

/// Client for the multi-carrier tracking aggregator. Covers every supported carrier that has no
/// direct integration, and doubles as the fallback when the carrier cannot be inferred from the
/// tracking number (`tracking_provider: "auto"`).
#[derive(Clone)]
pub struct AggregatorApi {
    config: AggregatorConfig,
    client: Client,
}

impl AggregatorApi {
    pub fn new(config: AggregatorConfig) -> Result<Self, CarrierApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CarrierApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// Fetches tracking data for `tracking_number`. `provider` is the aggregator's carrier slug,
    /// or `"auto"` to let the aggregator detect the carrier itself.
    pub async fn fetch_tracking(
        &self,
        tracking_number: &str,
        provider: &str,
    ) -> Result<AggregatorShipment, CarrierApiError> {
        let url = format!("{}/shipment/status", self.config.base_url);
        let body = json!({
            "tracking_number": tracking_number,
            "tracking_provider": provider,
        });
        debug!("🚛️ Querying aggregator for {tracking_number} via provider '{provider}'");
        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.config.api_key.reveal())
            .json(&body)
            .send()
            .await
            .map_err(|e| CarrierApiError::ResponseError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AggregatorResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(body);
            return Err(CarrierApiError::QueryError { status: status.as_u16(), message });
        }
        let payload = response
            .json::<AggregatorResponse>()
            .await
            .map_err(|e| CarrierApiError::JsonError(e.to_string()))?;
        payload.data.ok_or_else(|| CarrierApiError::NoTrackingData(tracking_number.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct AggregatorResponse {
    data: Option<AggregatorShipment>,
    message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorShipment {
    pub tracking_number: Option<String>,
    /// Carrier slug as detected by the aggregator, e.g. `canada-post`.
    pub carrier: Option<String>,
    pub tracking_status: Option<String>,
    #[serde(default)]
    pub events: Vec<AggregatorEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorEvent {
    pub status: Option<String>,
    pub message: Option<String>,
    /// ISO-8601, e.g. `2024-01-16T09:30:12Z`.
    pub datetime: Option<String>,
    pub tracking_location: Option<AggregatorLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorLocation {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shipment_response_parses() {
        let json = r#"{
            "data": {
                "tracking_number": "RR123456785GB",
                "carrier": "royal-mail",
                "tracking_status": "in_transit",
                "events": [{
                    "status": "in_transit",
                    "message": "Item despatched to overseas",
                    "datetime": "2024-01-16T09:30:12Z",
                    "tracking_location": {"city": "London", "state": null, "country": "GB"}
                }]
            }
        }"#;
        let parsed = serde_json::from_str::<AggregatorResponse>(json).unwrap();
        let shipment = parsed.data.unwrap();
        assert_eq!(shipment.carrier.as_deref(), Some("royal-mail"));
        assert_eq!(shipment.events.len(), 1);
        assert_eq!(shipment.events[0].tracking_location.as_ref().unwrap().city.as_deref(), Some("London"));
    }

    #[test]
    fn error_message_parses_without_data() {
        let json = r#"{"message": "Invalid API key"}"#;
        let parsed = serde_json::from_str::<AggregatorResponse>(json).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.message.as_deref(), Some("Invalid API key"));
    }
}
