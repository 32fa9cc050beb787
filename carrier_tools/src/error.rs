use shipping_engine::traits::CarrierClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarrierApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Token request failed. Error {status}. {message}")]
    AuthFailed { status: u16, message: String },
    #[error("Invalid response from carrier: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Tracking query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Carrier returned no usable tracking data for {0}")]
    NoTrackingData(String),
}

impl From<CarrierApiError> for CarrierClientError {
    fn from(e: CarrierApiError) -> Self {
        let status = match &e {
            CarrierApiError::AuthFailed { status, .. } => Some(*status),
            CarrierApiError::QueryError { status, .. } => Some(*status),
            _ => None,
        };
        CarrierClientError::new(status, e.to_string())
    }
}
