use std::{collections::HashMap, future::Future};

use chrono::{DateTime, Duration, Utc};
use log::*;
use tokio::sync::RwLock;

use crate::error::CarrierApiError;

/// Refresh a token this long before it actually expires.
const EXPIRY_SAFETY_MARGIN_SECS: i64 = 60;

/// A freshly minted bearer token as returned by a carrier's OAuth endpoint.
#[derive(Debug, Clone)]
pub struct FreshToken {
    pub access_token: String,
    pub expires_in_secs: i64,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Process-wide cache of OAuth2 client-credentials tokens, keyed by the requested scope set.
///
/// `get_or_refresh` holds no lock across the network call, so two concurrent callers with a cold
/// cache may both fetch a token. That is deliberate: token minting is safe to repeat and the last
/// write wins, which keeps the hot path lock-light.
#[derive(Default)]
pub struct TokenCache {
    tokens: RwLock<HashMap<Vec<String>, CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token for `scopes`, refreshing via `refresh` when it is missing or
    /// within the safety margin of expiry. A refresh failure is returned as-is and nothing is
    /// cached; token-endpoint rejections are configuration errors and are not retried here.
    pub async fn get_or_refresh<F, Fut>(&self, scopes: &[String], refresh: F) -> Result<String, CarrierApiError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<FreshToken, CarrierApiError>>,
    {
        let key = scopes.to_vec();
        {
            let tokens = self.tokens.read().await;
            if let Some(cached) = tokens.get(&key) {
                if cached.expires_at - Duration::seconds(EXPIRY_SAFETY_MARGIN_SECS) > Utc::now() {
                    return Ok(cached.token.clone());
                }
                debug!("🔑️ Cached token for scopes {key:?} is about to expire. Refreshing.");
            }
        }
        let fresh = refresh().await?;
        let expires_at = Utc::now() + Duration::seconds(fresh.expires_in_secs);
        let token = fresh.access_token;
        let mut tokens = self.tokens.write().await;
        tokens.insert(key, CachedToken { token: token.clone(), expires_at });
        Ok(token)
    }
}
