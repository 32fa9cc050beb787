use std::{fmt::Display, str::FromStr};

use asg_common::MinorUnits;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------        OrderId        -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------    PaymentStatus      -------------------------------------------------------
/// Settlement state of an order. Orders that are `Failed` or `Refunded` are immutable and no
/// shipping work applies to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether shipping work may still be performed for an order in this state.
    pub fn is_shippable(&self) -> bool {
        !matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------   ShipmentStatus      -------------------------------------------------------
/// The shared internal shipment vocabulary. Every carrier-specific status string is normalized
/// onto this closed set before it is persisted. Unrecognized carrier statuses map to `Shipped`;
/// see the normalizers in `carrier_tools` for the per-carrier keyword tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Pending,
    Processing,
    Shipped,
    InTransit,
    OutForDelivery,
    Delivered,
    Exception,
    Returned,
}

impl ShipmentStatus {
    /// A terminal shipment is never re-polled.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShipmentStatus::Delivered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Processing => "processing",
            ShipmentStatus::Shipped => "shipped",
            ShipmentStatus::InTransit => "in_transit",
            ShipmentStatus::OutForDelivery => "out_for_delivery",
            ShipmentStatus::Delivered => "delivered",
            ShipmentStatus::Exception => "exception",
            ShipmentStatus::Returned => "returned",
        }
    }
}

impl Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipmentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "in_transit" => Ok(Self::InTransit),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "exception" => Ok(Self::Exception),
            "returned" => Ok(Self::Returned),
            s => Err(ConversionError(format!("Invalid shipment status: {s}"))),
        }
    }
}

//--------------------------------------       Carrier         -------------------------------------------------------
/// The closed set of supported shipping providers.
///
/// Caller-supplied carrier names and aggregator slugs must parse onto this set before anything is
/// persisted; an unrecognized slug is a validation error, never stored as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Carrier {
    Usps,
    Ups,
    Fedex,
    Dhl,
    CanadaPost,
    RoyalMail,
    AustraliaPost,
    LaPoste,
    DeutschePost,
}

impl Carrier {
    /// The canonical form used for persistence and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::Usps => "USPS",
            Carrier::Ups => "UPS",
            Carrier::Fedex => "FedEx",
            Carrier::Dhl => "DHL",
            Carrier::CanadaPost => "CanadaPost",
            Carrier::RoyalMail => "RoyalMail",
            Carrier::AustraliaPost => "AustraliaPost",
            Carrier::LaPoste => "LaPoste",
            Carrier::DeutschePost => "DeutschePost",
        }
    }

    /// The slug understood by the tracking aggregator.
    pub fn aggregator_slug(&self) -> &'static str {
        match self {
            Carrier::Usps => "usps",
            Carrier::Ups => "ups",
            Carrier::Fedex => "fedex",
            Carrier::Dhl => "dhl",
            Carrier::CanadaPost => "canada-post",
            Carrier::RoyalMail => "royal-mail",
            Carrier::AustraliaPost => "australia-post",
            Carrier::LaPoste => "la-poste",
            Carrier::DeutschePost => "deutsche-post",
        }
    }
}

impl Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Carrier {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "usps" => Ok(Self::Usps),
            "ups" => Ok(Self::Ups),
            "fedex" => Ok(Self::Fedex),
            "dhl" => Ok(Self::Dhl),
            "canadapost" => Ok(Self::CanadaPost),
            "royalmail" => Ok(Self::RoyalMail),
            "australiapost" | "auspost" => Ok(Self::AustraliaPost),
            "laposte" => Ok(Self::LaPoste),
            "deutschepost" => Ok(Self::DeutschePost),
            _ => Err(ConversionError(format!("Unsupported carrier: {s}"))),
        }
    }
}

impl Serialize for Carrier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Carrier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

//--------------------------------------    TrackingEvent      -------------------------------------------------------
/// One carrier scan. Events are replaced wholesale on every poll, in carrier order, and are not
/// deduplicated across polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// Lowercased free-text status tag as reported by the carrier.
    pub status: String,
    pub message: String,
    /// Omitted when the carrier timestamp could not be parsed. The event itself is still kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    /// City/state/country joined by ", ", empty parts dropped.
    #[serde(default)]
    pub location: String,
}

//--------------------------------------       Shipping        -------------------------------------------------------
/// The physical-fulfilment half of an order, embedded one-to-one.
///
/// Created empty at order creation, populated by the tracking attachment operation and thereafter
/// mutated only by the reconciliation poller (or a manual re-attachment) until delivery.
/// `next_poll_at` is `None` exactly when the shipment is delivered or polling has been abandoned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipping {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<Carrier>,
    #[serde(default)]
    pub shipment_status: ShipmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipped_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tracking_events: Vec<TrackingEvent>,
    /// Latched true once at least one real carrier event has been observed. Never unset.
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub poll_attempts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_polled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_poll_at: Option<DateTime<Utc>>,
}

impl Default for ShipmentStatus {
    fn default() -> Self {
        ShipmentStatus::Pending
    }
}

//--------------------------------------        Order          -------------------------------------------------------
/// A single purchase of one artwork, with its embedded shipping record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub artwork_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: MinorUnits,
    pub currency: String,
    pub payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shipping: Shipping,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// A new order as created at checkout initiation. Shipping starts empty.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub artwork_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: MinorUnits,
    pub currency: String,
    pub payment_ref: Option<String>,
}

impl NewOrder {
    pub fn new(order_id: OrderId, artwork_id: String, buyer_id: String, seller_id: String, price: MinorUnits) -> Self {
        Self { order_id, artwork_id, buyer_id, seller_id, price, currency: "USD".to_string(), payment_ref: None }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn carrier_slugs_normalize_to_canonical_names() {
        assert_eq!(Carrier::from_str("usps").unwrap().as_str(), "USPS");
        assert_eq!(Carrier::from_str(" USPS ").unwrap().as_str(), "USPS");
        assert_eq!(Carrier::from_str("FedEx").unwrap().as_str(), "FedEx");
        assert_eq!(Carrier::from_str("canada_post").unwrap().as_str(), "CanadaPost");
        assert_eq!(Carrier::from_str("royal-mail").unwrap().as_str(), "RoyalMail");
    }

    #[test]
    fn unknown_carrier_slugs_fail_validation() {
        assert!(Carrier::from_str("pigeon-express").is_err());
        assert!(Carrier::from_str("").is_err());
    }

    #[test]
    fn shipment_status_round_trips_through_strings() {
        for status in [
            ShipmentStatus::Pending,
            ShipmentStatus::Processing,
            ShipmentStatus::Shipped,
            ShipmentStatus::InTransit,
            ShipmentStatus::OutForDelivery,
            ShipmentStatus::Delivered,
            ShipmentStatus::Exception,
            ShipmentStatus::Returned,
        ] {
            assert_eq!(status.as_str().parse::<ShipmentStatus>().unwrap(), status);
        }
        assert!("lost".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn failed_and_refunded_orders_are_not_shippable() {
        assert!(PaymentStatus::Pending.is_shippable());
        assert!(PaymentStatus::Paid.is_shippable());
        assert!(!PaymentStatus::Failed.is_shippable());
        assert!(!PaymentStatus::Refunded.is_shippable());
    }

    #[test]
    fn events_without_datetimes_serialize_without_the_field() {
        let event = TrackingEvent {
            status: "in transit".to_string(),
            message: "Departed facility".to_string(),
            datetime: None,
            location: "Louisville, KY, US".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("datetime").is_none());
    }
}
