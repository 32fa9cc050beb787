use std::{env, time::Duration};

use asg_common::Secret;
use carrier_tools::CarrierConfig;
use log::*;

const DEFAULT_ASG_HOST: &str = "127.0.0.1";
const DEFAULT_ASG_PORT: u16 = 4480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// Shared secret guarding the poll-due route. When empty, the route rejects every caller.
    pub poll_secret: Secret<String>,
    /// When set, an in-process worker runs the reconciliation batch on this interval. Leave unset
    /// if an external scheduler drives the poll-due route instead.
    pub poll_interval: Option<Duration>,
    pub carriers: CarrierConfig,
}

#[derive(Clone, Debug, Default)]
pub struct AuthConfig {
    /// Key for verifying access tokens minted by the session service.
    pub hmac_key: Secret<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_ASG_HOST.to_string(),
            port: DEFAULT_ASG_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            poll_secret: Secret::default(),
            poll_interval: None,
            carriers: CarrierConfig::default(),
        }
    }
}

/// Wrapper so the poll secret can live in actix app data without colliding with other `Secret`s.
#[derive(Clone)]
pub struct PollSecret(pub Secret<String>);

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("ASG_HOST").ok().unwrap_or_else(|| DEFAULT_ASG_HOST.into());
        let port = env::var("ASG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for ASG_PORT. {e} Using the default, {DEFAULT_ASG_PORT}, instead."
                    );
                    DEFAULT_ASG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_ASG_PORT);
        let database_url = env::var("ASG_DATABASE_URL").unwrap_or_else(|_| {
            warn!("🪛️ ASG_DATABASE_URL is not set. Using the default, sqlite://data/shipping.db.");
            "sqlite://data/shipping.db".to_string()
        });
        let hmac_key = Secret::new(env::var("ASG_AUTH_KEY").unwrap_or_else(|_| {
            warn!("🪛️ ASG_AUTH_KEY is not set. Every authenticated route will reject its callers.");
            String::default()
        }));
        let poll_secret = Secret::new(env::var("ASG_POLL_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ ASG_POLL_SECRET is not set. The poll-due route will reject every caller.");
            String::default()
        }));
        let poll_interval = env::var("ASG_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| error!("🪛️ {s} is not a valid value for ASG_POLL_INTERVAL_SECS. {e}"))
                    .ok()
            })
            .map(Duration::from_secs);
        match poll_interval {
            Some(interval) => info!("🪛️ In-process reconciliation worker enabled, every {}s", interval.as_secs()),
            None => info!("🪛️ In-process reconciliation worker disabled. Drive /orders/shipments/poll-due externally."),
        }
        let carriers = CarrierConfig::from_env_or_default();
        Self { host, port, database_url, auth: AuthConfig { hmac_key }, poll_secret, poll_interval, carriers }
    }
}
