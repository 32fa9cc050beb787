//! Access-token verification.
//!
//! Session management is owned by the marketplace's identity service. This server only consumes
//! the access tokens it mints: `user_id:expires_at:signature`, where the signature is the
//! hex-encoded HMAC-SHA256 of `user_id:expires_at` under a key shared with the identity service.
//! Expired or malformed tokens are rejected with a 403.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use asg_common::Secret;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

type HmacSha256 = Hmac<Sha256>;

pub const ACCESS_TOKEN_HEADER: &str = "asg_access_token";

/// The verified caller. Extracted from the access-token header on every authenticated route.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ServerError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| ServerError::InitializeError("Auth configuration is not registered".to_string()))?;
    let token = req
        .headers()
        .get(ACCESS_TOKEN_HEADER)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let user = validate_access_token(token, &config.hmac_key).map_err(|e| {
        debug!("🔐️ Rejected access token. {e}");
        e
    })?;
    Ok(user)
}

pub fn validate_access_token(token: &str, key: &Secret<String>) -> Result<AuthenticatedUser, AuthError> {
    let parts = token.split(':').collect::<Vec<&str>>();
    let [user_id, expires_at, signature] = parts.as_slice() else {
        return Err(AuthError::PoorlyFormattedToken("expected user_id:expires_at:signature".to_string()));
    };
    let expires_at = expires_at.parse::<i64>().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let signature = decode_hex(signature)?;
    let mut mac = HmacSha256::new_from_slice(key.reveal().as_bytes())
        .map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    mac.update(format!("{user_id}:{expires_at}").as_bytes());
    mac.verify_slice(&signature).map_err(|_| AuthError::ValidationError)?;
    if Utc::now().timestamp() >= expires_at {
        return Err(AuthError::ExpiredToken);
    }
    Ok(AuthenticatedUser { user_id: user_id.to_string() })
}

/// Mints tokens in the identity service's format. The server itself never issues tokens; this
/// exists for the endpoint tests and for local smoke testing.
#[derive(Clone)]
pub struct TokenIssuer {
    key: Secret<String>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self { key: config.hmac_key.clone() }
    }

    pub fn issue(&self, user_id: &str, expires_at: DateTime<Utc>) -> String {
        let expires_at = expires_at.timestamp();
        let mut mac = HmacSha256::new_from_slice(self.key.reveal().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(format!("{user_id}:{expires_at}").as_bytes());
        let signature = encode_hex(&mac.finalize().into_bytes());
        format!("{user_id}:{expires_at}:{signature}")
    }
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        use std::fmt::Write;
        let _ = write!(s, "{b:02x}");
        s
    })
}

fn decode_hex(s: &str) -> Result<Vec<u8>, AuthError> {
    if s.len() % 2 != 0 {
        return Err(AuthError::PoorlyFormattedToken("signature is not valid hex".to_string()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| AuthError::PoorlyFormattedToken("signature is not valid hex".to_string()))
        })
        .collect()
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn config() -> AuthConfig {
        AuthConfig { hmac_key: Secret::new("test-signing-key".to_string()) }
    }

    #[test]
    fn issued_tokens_validate() {
        let issuer = TokenIssuer::new(&config());
        let token = issuer.issue("seller-1", Utc::now() + Duration::hours(1));
        let user = validate_access_token(&token, &config().hmac_key).unwrap();
        assert_eq!(user.user_id, "seller-1");
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let issuer = TokenIssuer::new(&config());
        let token = issuer.issue("seller-1", Utc::now() - Duration::seconds(1));
        let err = validate_access_token(&token, &config().hmac_key).unwrap_err();
        assert!(matches!(err, AuthError::ExpiredToken));
    }

    #[test]
    fn tampered_tokens_are_rejected() {
        let issuer = TokenIssuer::new(&config());
        let token = issuer.issue("seller-1", Utc::now() + Duration::hours(1));
        let tampered = token.replacen("seller-1", "seller-2", 1);
        let err = validate_access_token(&tampered, &config().hmac_key).unwrap_err();
        assert!(matches!(err, AuthError::ValidationError));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let key = config().hmac_key;
        assert!(matches!(validate_access_token("", &key), Err(AuthError::PoorlyFormattedToken(_))));
        assert!(matches!(validate_access_token("seller-1", &key), Err(AuthError::PoorlyFormattedToken(_))));
        assert!(matches!(
            validate_access_token("seller-1:not-a-number:abcd", &key),
            Err(AuthError::PoorlyFormattedToken(_))
        ));
        assert!(matches!(
            validate_access_token("seller-1:2000000000:zzzz", &key),
            Err(AuthError::PoorlyFormattedToken(_))
        ));
    }
}
