use chrono::{DateTime, Duration, Utc};

use crate::db_types::ShipmentStatus;

/// Polling is abandoned once a shipment has been polled this many times without delivery.
pub const MAX_POLL_ATTEMPTS: i64 = 120;

/// The poll interval never exceeds a day, no matter how many attempts have accumulated.
const MAX_INTERVAL_HOURS: i64 = 24;

/// Computes when a shipment should next be polled.
///
/// Returns `None` when no further polling should happen: the shipment is delivered, or the
/// attempt ceiling has been reached. Otherwise the cadence is status-dependent (a shipment out
/// for delivery is polled far more often than one sitting in a warehouse), stretched by one hour
/// for every three attempts so far, and capped at 24 hours.
pub fn next_poll_time(status: ShipmentStatus, attempts: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if status.is_terminal() || attempts >= MAX_POLL_ATTEMPTS {
        return None;
    }
    let base_hours = match status {
        ShipmentStatus::OutForDelivery => 2,
        ShipmentStatus::InTransit => 6,
        _ => 12,
    };
    let hours = (base_hours + attempts / 3).min(MAX_INTERVAL_HOURS);
    Some(now + Duration::hours(hours))
}
