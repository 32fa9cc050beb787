use log::*;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::{
    config::FedexConfig,
    error::CarrierApiError,
    token::{FreshToken, TokenCache},
};

/// Client for the FedEx Track API (`/track/v1/trackingnumbers`).
#[derive(Clone)]
pub struct FedexApi {
    config: FedexConfig,
    client: Client,
    tokens: Arc<TokenCache>,
}

impl FedexApi {
    pub fn new(config: FedexConfig, tokens: Arc<TokenCache>) -> Result<Self, CarrierApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CarrierApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client, tokens })
    }

    async fn bearer_token(&self) -> Result<String, CarrierApiError> {
        let scopes = vec!["fedex:track".to_string()];
        self.tokens.get_or_refresh(&scopes, || self.request_token()).await
    }

    async fn request_token(&self) -> Result<FreshToken, CarrierApiError> {
        let url = format!("{}/oauth/token", self.config.base_url);
        debug!("🚛️ Requesting new FedEx access token");
        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.reveal().as_str()),
            ])
            .send()
            .await
            .map_err(|e| CarrierApiError::ResponseError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CarrierApiError::AuthFailed { status: status.as_u16(), message });
        }
        let token = response
            .json::<FedexTokenResponse>()
            .await
            .map_err(|e| CarrierApiError::JsonError(e.to_string()))?;
        Ok(FreshToken { access_token: token.access_token, expires_in_secs: token.expires_in })
    }

    /// Fetches the latest track result for `tracking_number`, returning the raw FedEx payload
    /// for the normalizer to interpret.
    pub async fn fetch_tracking(&self, tracking_number: &str) -> Result<FedexTrackResult, CarrierApiError> {
        let token = self.bearer_token().await?;
        let url = format!("{}/track/v1/trackingnumbers", self.config.base_url);
        let body = json!({
            "includeDetailedScans": true,
            "trackingInfo": [{"trackingNumberInfo": {"trackingNumber": tracking_number}}],
        });
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| CarrierApiError::ResponseError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<FedexErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.errors.into_iter().next())
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(CarrierApiError::QueryError { status: status.as_u16(), message });
        }
        let payload = response
            .json::<FedexTrackResponse>()
            .await
            .map_err(|e| CarrierApiError::JsonError(e.to_string()))?;
        let result = payload
            .output
            .complete_track_results
            .into_iter()
            .flat_map(|r| r.track_results)
            .next()
            .ok_or_else(|| CarrierApiError::NoTrackingData(tracking_number.to_string()))?;
        // FedEx reports per-number failures inside a 200 response.
        if let Some(error) = result.error {
            return Err(CarrierApiError::QueryError { status: status.as_u16(), message: error.message });
        }
        Ok(result)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FedexTokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct FedexTrackResponse {
    output: FedexTrackOutput,
}

#[derive(Debug, Clone, Deserialize)]
struct FedexTrackOutput {
    #[serde(rename = "completeTrackResults", default)]
    complete_track_results: Vec<FedexCompleteTrackResult>,
}

#[derive(Debug, Clone, Deserialize)]
struct FedexCompleteTrackResult {
    #[serde(rename = "trackResults", default)]
    track_results: Vec<FedexTrackResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FedexTrackResult {
    #[serde(rename = "latestStatusDetail")]
    pub latest_status_detail: Option<FedexStatusDetail>,
    #[serde(rename = "scanEvents", default)]
    pub scan_events: Vec<FedexScanEvent>,
    pub error: Option<FedexError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FedexStatusDetail {
    #[serde(rename = "derivedCode")]
    pub derived_code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FedexScanEvent {
    /// ISO-8601 with offset, e.g. `2024-01-16T04:30:12-05:00`.
    pub date: Option<String>,
    #[serde(rename = "eventDescription")]
    pub event_description: Option<String>,
    #[serde(rename = "derivedStatus")]
    pub derived_status: Option<String>,
    #[serde(rename = "scanLocation")]
    pub scan_location: Option<FedexScanLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FedexScanLocation {
    pub city: Option<String>,
    #[serde(rename = "stateOrProvinceCode")]
    pub state_or_province_code: Option<String>,
    #[serde(rename = "countryCode")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FedexError {
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
struct FedexErrorEnvelope {
    #[serde(default)]
    errors: Vec<FedexError>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn track_response_parses() {
        let json = r#"{
            "output": {
                "completeTrackResults": [{
                    "trackingNumber": "449044304137821",
                    "trackResults": [{
                        "latestStatusDetail": {"derivedCode": "IT", "description": "In transit"},
                        "scanEvents": [{
                            "date": "2024-01-16T04:30:12-05:00",
                            "eventDescription": "Departed FedEx location",
                            "derivedStatus": "In transit",
                            "scanLocation": {"city": "MEMPHIS", "stateOrProvinceCode": "TN", "countryCode": "US"}
                        }]
                    }]
                }]
            }
        }"#;
        let parsed = serde_json::from_str::<FedexTrackResponse>(json).unwrap();
        let result = &parsed.output.complete_track_results[0].track_results[0];
        assert_eq!(result.latest_status_detail.as_ref().unwrap().derived_code.as_deref(), Some("IT"));
        assert_eq!(result.scan_events.len(), 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn per_number_errors_parse() {
        let json = r#"{
            "output": {
                "completeTrackResults": [{
                    "trackResults": [{
                        "error": {"code": "TRACKING.TRACKINGNUMBER.NOTFOUND", "message": "Tracking number cannot be found."}
                    }]
                }]
            }
        }"#;
        let parsed = serde_json::from_str::<FedexTrackResponse>(json).unwrap();
        let result = &parsed.output.complete_track_results[0].track_results[0];
        assert_eq!(result.error.as_ref().unwrap().message, "Tracking number cannot be found.");
    }
}
