//! Pure mappings from raw carrier payloads onto the shared shipment status vocabulary.
//!
//! Carriers disagree on everything, including what a status is called, so the mapping is a
//! keyword table per carrier family. Anything unrecognized maps to `shipped`: a package with a
//! status we cannot interpret has at least been handed over, and the reconciliation schedule
//! keeps polling it until a recognizable status appears.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use shipping_engine::{ShipmentStatus, TrackingEvent};

use crate::{
    aggregator::AggregatorEvent,
    fedex::{FedexScanEvent, FedexStatusDetail},
    ups::{UpsActivity, UpsStatus},
};

/// Case-insensitive keyword mapping shared by every carrier family. Order matters: "out for
/// delivery" must win over "delivered".
pub fn status_from_text(text: &str) -> ShipmentStatus {
    let text = text.to_lowercase();
    if text.contains("out for delivery") {
        ShipmentStatus::OutForDelivery
    } else if text.contains("delivered") {
        ShipmentStatus::Delivered
    } else if text.contains("in transit")
        || text.contains("departed")
        || text.contains("arrived")
        || text.contains("origin scan")
        || text.contains("picked up")
    {
        ShipmentStatus::InTransit
    } else if text.contains("exception")
        || text.contains("failed attempt")
        || text.contains("return to sender")
        || text.contains("returned to sender")
        || text.contains("hold")
    {
        ShipmentStatus::Exception
    } else {
        ShipmentStatus::Shipped
    }
}

//--------------------------------------          UPS           ------------------------------------------------------

pub fn ups_status(status: Option<&UpsStatus>) -> ShipmentStatus {
    let Some(status) = status else { return ShipmentStatus::Shipped };
    if let Some(code) = status.code.as_deref() {
        match code {
            "D" | "DL" | "011D" => return ShipmentStatus::Delivered,
            "OD" | "OFD" => return ShipmentStatus::OutForDelivery,
            "I" | "IT" | "DP" | "AR" | "OR" | "P" => return ShipmentStatus::InTransit,
            "X" | "RS" => return ShipmentStatus::Exception,
            "M" | "MP" => return ShipmentStatus::Shipped,
            _ => {},
        }
    }
    status.description.as_deref().map(status_from_text).unwrap_or(ShipmentStatus::Shipped)
}

pub fn ups_events(activities: &[UpsActivity]) -> Vec<TrackingEvent> {
    activities
        .iter()
        .map(|a| {
            let message = a.status.as_ref().and_then(|s| s.description.clone()).unwrap_or_default();
            let status = ups_status(a.status.as_ref()).to_string();
            let datetime = match (a.date.as_deref(), a.time.as_deref()) {
                (Some(date), time) => parse_ups_datetime(date, time.unwrap_or("000000")),
                _ => None,
            };
            let location = a
                .location
                .as_ref()
                .and_then(|l| l.address.as_ref())
                .map(|addr| join_location(&[addr.city.as_deref(), addr.state_province.as_deref(), addr.country.as_deref()]))
                .unwrap_or_default();
            TrackingEvent { status, message, datetime, location }
        })
        .collect()
}

/// UPS activity timestamps arrive as a `YYYYMMDD` date and an `HHMMSS` time (the time is
/// sometimes truncated). No zone is reported, so they are treated as UTC.
pub fn parse_ups_datetime(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let padded = format!("{time:0<6}");
    let time = NaiveTime::parse_from_str(&padded, "%H%M%S").ok()?;
    Some(date.and_time(time).and_utc())
}

//--------------------------------------         FedEx          ------------------------------------------------------

pub fn fedex_status(detail: Option<&FedexStatusDetail>) -> ShipmentStatus {
    let Some(detail) = detail else { return ShipmentStatus::Shipped };
    if let Some(code) = detail.derived_code.as_deref() {
        match code {
            "DL" => return ShipmentStatus::Delivered,
            "OD" => return ShipmentStatus::OutForDelivery,
            "IT" | "DP" | "AR" | "PU" => return ShipmentStatus::InTransit,
            // Return-to-shipper legs surface as exceptions; only the aggregator's explicit
            // "returned" verdict produces the returned status.
            "DE" | "SE" | "HL" | "CA" | "RS" => return ShipmentStatus::Exception,
            "OC" => return ShipmentStatus::Shipped,
            _ => {},
        }
    }
    detail.description.as_deref().map(status_from_text).unwrap_or(ShipmentStatus::Shipped)
}

pub fn fedex_events(events: &[FedexScanEvent]) -> Vec<TrackingEvent> {
    events
        .iter()
        .map(|e| {
            let message = e.event_description.clone().unwrap_or_default();
            let status = e
                .derived_status
                .as_deref()
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| status_from_text(&message).to_string());
            let datetime =
                e.date.as_deref().and_then(|d| DateTime::parse_from_rfc3339(d).ok()).map(|d| d.with_timezone(&Utc));
            let location = e
                .scan_location
                .as_ref()
                .map(|l| join_location(&[l.city.as_deref(), l.state_or_province_code.as_deref(), l.country_code.as_deref()]))
                .unwrap_or_default();
            TrackingEvent { status, message, datetime, location }
        })
        .collect()
}

//--------------------------------------       Aggregator       ------------------------------------------------------

pub fn aggregator_status(status: Option<&str>) -> ShipmentStatus {
    let Some(status) = status else { return ShipmentStatus::Shipped };
    let tag = status.trim().to_lowercase().replace(['-', '_'], " ");
    match tag.as_str() {
        "delivered" => ShipmentStatus::Delivered,
        "out for delivery" => ShipmentStatus::OutForDelivery,
        "in transit" | "transit" => ShipmentStatus::InTransit,
        "exception" | "failure" | "failed" => ShipmentStatus::Exception,
        // The only source of a `returned` shipment status, and only for a confirmed return. A
        // "return to sender" leg still in motion falls through to the keyword table and stays an
        // exception until the aggregator's verdict is final.
        "returned" | "delivered to sender" => ShipmentStatus::Returned,
        "pre transit" | "label created" | "unknown" | "pending" => ShipmentStatus::Shipped,
        _ => status_from_text(&tag),
    }
}

pub fn aggregator_events(events: &[AggregatorEvent]) -> Vec<TrackingEvent> {
    events
        .iter()
        .map(|e| {
            let message = e.message.clone().unwrap_or_default();
            let status = e
                .status
                .as_deref()
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| status_from_text(&message).to_string());
            let datetime =
                e.datetime.as_deref().and_then(|d| DateTime::parse_from_rfc3339(d).ok()).map(|d| d.with_timezone(&Utc));
            let location = e
                .tracking_location
                .as_ref()
                .map(|l| join_location(&[l.city.as_deref(), l.state.as_deref(), l.country.as_deref()]))
                .unwrap_or_default();
            TrackingEvent { status, message, datetime, location }
        })
        .collect()
}

fn join_location(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .filter_map(|p| *p)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}
