use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use shipping_engine::ShipmentFlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The order cannot be modified. {0}")]
    OrderNotModifiable(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Carrier lookup failed. {message}")]
    CarrierError { status: Option<u16>, message: String },
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::OrderNotModifiable(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            // The upstream carrier's verdict passes through to the caller when we have one.
            Self::CarrierError { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token signature is invalid.")]
    ValidationError,
    #[error("Access token has expired.")]
    ExpiredToken,
}

impl From<ShipmentFlowError> for ServerError {
    fn from(e: ShipmentFlowError) -> Self {
        match e {
            ShipmentFlowError::EmptyTrackingNumber => Self::InvalidRequestBody(e.to_string()),
            ShipmentFlowError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            ShipmentFlowError::OrderNotShippable(_) => Self::OrderNotModifiable(e.to_string()),
            ShipmentFlowError::CarrierError(e) => Self::CarrierError { status: e.status, message: e.message },
            ShipmentFlowError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}
