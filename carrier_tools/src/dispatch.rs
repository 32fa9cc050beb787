use std::sync::{Arc, OnceLock};

use log::*;
use regex::Regex;
use shipping_engine::{
    traits::{CarrierClient, CarrierClientError, NormalizedTracking},
    Carrier,
};

use crate::{
    aggregator::AggregatorApi, config::CarrierConfig, error::CarrierApiError, fedex::FedexApi, normalize,
    token::TokenCache, ups::UpsApi,
};

fn ups_shape() -> &'static Regex {
    static UPS_SHAPE: OnceLock<Regex> = OnceLock::new();
    UPS_SHAPE.get_or_init(|| Regex::new(r"^1Z[0-9A-Z]{16}$").unwrap())
}

enum Route {
    Ups,
    Fedex,
    /// Aggregator lookup, with the carrier to report it as (None lets the aggregator detect it).
    Aggregator(Option<Carrier>),
}

/// Owns one adapter per integration and routes each lookup to the right one.
///
/// An explicitly supplied carrier always wins. Without one, a tracking number shaped like a UPS
/// number (`1Z` + 16 alphanumerics) goes to UPS directly, and everything else goes to the
/// aggregator in auto-detect mode.
#[derive(Clone)]
pub struct CarrierAdapters {
    ups: UpsApi,
    fedex: FedexApi,
    aggregator: AggregatorApi,
}

impl CarrierAdapters {
    pub fn new(config: CarrierConfig) -> Result<Self, CarrierApiError> {
        let tokens = Arc::new(TokenCache::new());
        let ups = UpsApi::new(config.ups, config.environment, Arc::clone(&tokens))?;
        let fedex = FedexApi::new(config.fedex, tokens)?;
        let aggregator = AggregatorApi::new(config.aggregator)?;
        Ok(Self { ups, fedex, aggregator })
    }

    pub fn from_env_or_default() -> Result<Self, CarrierApiError> {
        Self::new(CarrierConfig::from_env_or_default())
    }

    fn route(carrier: Option<Carrier>, tracking_number: &str) -> Route {
        match carrier {
            Some(Carrier::Ups) => Route::Ups,
            Some(Carrier::Fedex) => Route::Fedex,
            Some(other) => Route::Aggregator(Some(other)),
            None if ups_shape().is_match(tracking_number) => Route::Ups,
            None => Route::Aggregator(None),
        }
    }

    async fn fetch_ups(&self, tracking_number: &str) -> Result<NormalizedTracking, CarrierApiError> {
        let package = self.ups.fetch_tracking(tracking_number).await?;
        Ok(NormalizedTracking {
            carrier: Carrier::Ups,
            tracking_number: tracking_number.to_string(),
            status: normalize::ups_status(package.current_status.as_ref()),
            events: normalize::ups_events(&package.activity),
        })
    }

    async fn fetch_fedex(&self, tracking_number: &str) -> Result<NormalizedTracking, CarrierApiError> {
        let result = self.fedex.fetch_tracking(tracking_number).await?;
        Ok(NormalizedTracking {
            carrier: Carrier::Fedex,
            tracking_number: tracking_number.to_string(),
            status: normalize::fedex_status(result.latest_status_detail.as_ref()),
            events: normalize::fedex_events(&result.scan_events),
        })
    }

    async fn fetch_aggregator(
        &self,
        tracking_number: &str,
        carrier: Option<Carrier>,
    ) -> Result<NormalizedTracking, CarrierApiError> {
        let provider = carrier.map(|c| c.aggregator_slug().to_string()).unwrap_or_else(|| "auto".to_string());
        let shipment = self.aggregator.fetch_tracking(tracking_number, &provider).await?;
        // When we asked for auto-detection, the aggregator's verdict must be a carrier we
        // support, otherwise the record would be unrepresentable.
        let carrier = match carrier {
            Some(c) => c,
            None => {
                let slug = shipment.carrier.as_deref().ok_or_else(|| {
                    CarrierApiError::ResponseError(format!(
                        "Aggregator did not identify a carrier for {tracking_number}"
                    ))
                })?;
                slug.parse::<Carrier>().map_err(|_| {
                    CarrierApiError::ResponseError(format!("Aggregator reported an unsupported carrier: {slug}"))
                })?
            },
        };
        Ok(NormalizedTracking {
            carrier,
            tracking_number: tracking_number.to_string(),
            status: normalize::aggregator_status(shipment.tracking_status.as_deref()),
            events: normalize::aggregator_events(&shipment.events),
        })
    }
}

impl CarrierClient for CarrierAdapters {
    async fn fetch_tracking(
        &self,
        tracking_number: &str,
        carrier: Option<Carrier>,
    ) -> Result<NormalizedTracking, CarrierClientError> {
        let result = match Self::route(carrier, tracking_number) {
            Route::Ups => self.fetch_ups(tracking_number).await,
            Route::Fedex => self.fetch_fedex(tracking_number).await,
            Route::Aggregator(hint) => self.fetch_aggregator(tracking_number, hint).await,
        };
        result
            .inspect(|t| trace!("🚛️ {tracking_number} ({}) is {}", t.carrier, t.status))
            .map_err(|e| {
                debug!("🚛️ Tracking lookup for {tracking_number} failed. {e}");
                e.into()
            })
    }
}
