use log::*;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    config::{Environment, UpsConfig},
    error::CarrierApiError,
    token::{FreshToken, TokenCache},
};

/// Tracking numbers from the UPS developer sandbox. Lookups against these always return the
/// canned payload outside of production, so staging environments work without live credentials.
pub const UPS_TEST_TRACKING_NUMBERS: [&str; 3] =
    ["1Z12345E0291980793", "1Z12345E6605272234", "1Z12345E0390515214"];

/// Client for the UPS Track API (`/api/track/v1/details`).
#[derive(Clone)]
pub struct UpsApi {
    config: UpsConfig,
    environment: Environment,
    client: Client,
    tokens: Arc<TokenCache>,
}

impl UpsApi {
    pub fn new(
        config: UpsConfig,
        environment: Environment,
        tokens: Arc<TokenCache>,
    ) -> Result<Self, CarrierApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CarrierApiError::Initialization(e.to_string()))?;
        Ok(Self { config, environment, client, tokens })
    }

    fn use_mock(&self, tracking_number: &str) -> bool {
        if self.environment.is_production() {
            return false;
        }
        self.config.mock_mode || UPS_TEST_TRACKING_NUMBERS.contains(&tracking_number)
    }

    async fn bearer_token(&self) -> Result<String, CarrierApiError> {
        let scopes = vec!["ups:tracking".to_string()];
        self.tokens.get_or_refresh(&scopes, || self.request_token()).await
    }

    async fn request_token(&self) -> Result<FreshToken, CarrierApiError> {
        let url = format!("{}/security/v1/oauth/token", self.config.base_url);
        debug!("🚛️ Requesting new UPS access token");
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(self.config.client_secret.reveal()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CarrierApiError::ResponseError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CarrierApiError::AuthFailed { status: status.as_u16(), message });
        }
        let token = response
            .json::<UpsTokenResponse>()
            .await
            .map_err(|e| CarrierApiError::JsonError(e.to_string()))?;
        // UPS serializes expires_in as a string.
        let expires_in_secs = token.expires_in.parse::<i64>().unwrap_or(3600);
        Ok(FreshToken { access_token: token.access_token, expires_in_secs })
    }

    /// Fetches the tracked package for `tracking_number`, returning the raw UPS payload for the
    /// normalizer to interpret.
    pub async fn fetch_tracking(&self, tracking_number: &str) -> Result<UpsPackage, CarrierApiError> {
        if self.use_mock(tracking_number) {
            info!("🚛️ Returning mock UPS tracking data for {tracking_number}");
            return Ok(mock_package(tracking_number));
        }
        let token = self.bearer_token().await?;
        let url = format!("{}/api/track/v1/details/{tracking_number}", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header("transId", format!("asg-{}", chrono::Utc::now().timestamp_millis()))
            .header("transactionSrc", "atelier-shipping-gateway")
            .send()
            .await
            .map_err(|e| CarrierApiError::ResponseError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpsErrorEnvelope>(&body)
                .ok()
                .and_then(|env| env.response.errors.into_iter().next())
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(CarrierApiError::QueryError { status: status.as_u16(), message });
        }
        let payload = response
            .json::<UpsTrackResponse>()
            .await
            .map_err(|e| CarrierApiError::JsonError(e.to_string()))?;
        payload
            .track_response
            .shipment
            .into_iter()
            .flat_map(|s| s.package)
            .next()
            .ok_or_else(|| CarrierApiError::NoTrackingData(tracking_number.to_string()))
    }
}

fn mock_package(tracking_number: &str) -> UpsPackage {
    UpsPackage {
        tracking_number: Some(tracking_number.to_string()),
        current_status: Some(UpsStatus {
            code: Some("IT".to_string()),
            description: Some("In Transit".to_string()),
        }),
        activity: vec![
            UpsActivity {
                status: Some(UpsStatus {
                    code: Some("IT".to_string()),
                    description: Some("Departed from Facility".to_string()),
                }),
                date: Some("20240116".to_string()),
                time: Some("043012".to_string()),
                location: Some(UpsLocation {
                    address: Some(UpsAddress {
                        city: Some("Louisville".to_string()),
                        state_province: Some("KY".to_string()),
                        country: Some("US".to_string()),
                    }),
                }),
            },
            UpsActivity {
                status: Some(UpsStatus {
                    code: Some("OR".to_string()),
                    description: Some("Origin Scan".to_string()),
                }),
                date: Some("20240115".to_string()),
                time: Some("183455".to_string()),
                location: Some(UpsLocation {
                    address: Some(UpsAddress {
                        city: Some("Portland".to_string()),
                        state_province: Some("OR".to_string()),
                        country: Some("US".to_string()),
                    }),
                }),
            },
            UpsActivity {
                status: Some(UpsStatus {
                    code: Some("MP".to_string()),
                    description: Some("Shipper created a label, UPS has not received the package yet.".to_string()),
                }),
                date: Some("20240115".to_string()),
                time: Some("091500".to_string()),
                location: None,
            },
        ],
    }
}

#[derive(Debug, Clone, Deserialize)]
struct UpsTokenResponse {
    access_token: String,
    expires_in: String,
}

#[derive(Debug, Clone, Deserialize)]
struct UpsTrackResponse {
    #[serde(rename = "trackResponse")]
    track_response: UpsTrackResponseBody,
}

#[derive(Debug, Clone, Deserialize)]
struct UpsTrackResponseBody {
    #[serde(default)]
    shipment: Vec<UpsShipment>,
}

#[derive(Debug, Clone, Deserialize)]
struct UpsShipment {
    #[serde(default)]
    package: Vec<UpsPackage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsPackage {
    #[serde(rename = "trackingNumber")]
    pub tracking_number: Option<String>,
    #[serde(rename = "currentStatus")]
    pub current_status: Option<UpsStatus>,
    #[serde(default)]
    pub activity: Vec<UpsActivity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsStatus {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsActivity {
    pub status: Option<UpsStatus>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub location: Option<UpsLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsLocation {
    pub address: Option<UpsAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsAddress {
    pub city: Option<String>,
    #[serde(rename = "stateProvince")]
    pub state_province: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct UpsErrorEnvelope {
    response: UpsErrorResponse,
}

#[derive(Debug, Clone, Deserialize)]
struct UpsErrorResponse {
    #[serde(default)]
    errors: Vec<UpsError>,
}

#[derive(Debug, Clone, Deserialize)]
struct UpsError {
    #[allow(dead_code)]
    code: Option<String>,
    message: String,
}
