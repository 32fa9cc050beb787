use std::str::FromStr;

use asg_common::Secret;
use log::*;

/// Deployment environment. Mock tracking mode is refused in `Production` no matter what the
/// configuration says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    Production,
    Staging,
    #[default]
    Development,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            s => Err(format!("Unknown environment: {s}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CarrierConfig {
    pub environment: Environment,
    pub ups: UpsConfig,
    pub fedex: FedexConfig,
    pub aggregator: AggregatorConfig,
}

#[derive(Debug, Clone, Default)]
pub struct UpsConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    /// When true (and not in production), tracking lookups return the canned payload instead of
    /// calling UPS. Known UPS test tracking numbers trigger the same path automatically.
    pub mock_mode: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FedexConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AggregatorConfig {
    pub base_url: String,
    pub api_key: Secret<String>,
}

impl CarrierConfig {
    pub fn from_env_or_default() -> Self {
        let environment = std::env::var("ASG_ENVIRONMENT")
            .ok()
            .and_then(|s| {
                s.parse()
                    .map_err(|e| warn!("🚛️ Invalid ASG_ENVIRONMENT: {e}. Defaulting to development."))
                    .ok()
            })
            .unwrap_or_default();
        Self {
            environment,
            ups: UpsConfig::from_env_or_default(),
            fedex: FedexConfig::from_env_or_default(),
            aggregator: AggregatorConfig::from_env_or_default(),
        }
    }
}

impl UpsConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = std::env::var("ASG_UPS_BASE_URL").unwrap_or_else(|_| "https://onlinetools.ups.com".to_string());
        let client_id = std::env::var("ASG_UPS_CLIENT_ID").unwrap_or_else(|_| {
            warn!("🚛️ ASG_UPS_CLIENT_ID not set. UPS tracking lookups will fail to authenticate.");
            String::default()
        });
        let client_secret = Secret::new(std::env::var("ASG_UPS_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("🚛️ ASG_UPS_CLIENT_SECRET not set. UPS tracking lookups will fail to authenticate.");
            String::default()
        }));
        let mock_mode = std::env::var("ASG_UPS_MOCK_MODE").map(|s| &s == "1" || &s == "true").unwrap_or(false);
        Self { base_url, client_id, client_secret, mock_mode }
    }
}

impl FedexConfig {
    pub fn from_env_or_default() -> Self {
        let base_url = std::env::var("ASG_FEDEX_BASE_URL").unwrap_or_else(|_| "https://apis.fedex.com".to_string());
        let client_id = std::env::var("ASG_FEDEX_CLIENT_ID").unwrap_or_else(|_| {
            warn!("🚛️ ASG_FEDEX_CLIENT_ID not set. FedEx tracking lookups will fail to authenticate.");
            String::default()
        });
        let client_secret = Secret::new(std::env::var("ASG_FEDEX_CLIENT_SECRET").unwrap_or_else(|_| {
            warn!("🚛️ ASG_FEDEX_CLIENT_SECRET not set. FedEx tracking lookups will fail to authenticate.");
            String::default()
        }));
        Self { base_url, client_id, client_secret }
    }
}

impl AggregatorConfig {
    pub fn from_env_or_default() -> Self {
        let base_url =
            std::env::var("ASG_AGGREGATOR_BASE_URL").unwrap_or_else(|_| "https://api.trackship.com/v1".to_string());
        let api_key = Secret::new(std::env::var("ASG_AGGREGATOR_API_KEY").unwrap_or_else(|_| {
            warn!("🚛️ ASG_AGGREGATOR_API_KEY not set. Aggregator tracking lookups will be rejected.");
            String::default()
        }));
        Self { base_url, api_key }
    }
}
