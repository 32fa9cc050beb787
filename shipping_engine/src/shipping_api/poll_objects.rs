use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db_types::{OrderId, ShipmentStatus};

/// Result of one reconciliation batch. Used for observability only: failed records keep their
/// previous schedule and are simply re-selected on the next invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub processed: usize,
    pub results: Vec<PollOutcome>,
}

/// Per-order outcome within a batch. Successful entries carry the status transition and the new
/// schedule; failed entries carry the error message and nothing else.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOutcome {
    pub order_id: OrderId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<ShipmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_status: Option<ShipmentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_attempts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_poll_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PollOutcome {
    pub fn success(
        order_id: OrderId,
        previous: ShipmentStatus,
        new: ShipmentStatus,
        poll_attempts: i64,
        next_poll_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            order_id,
            previous_status: Some(previous),
            new_status: Some(new),
            poll_attempts: Some(poll_attempts),
            next_poll_at,
            error: None,
        }
    }

    pub fn failure(order_id: OrderId, error: String) -> Self {
        Self { order_id, previous_status: None, new_status: None, poll_attempts: None, next_poll_at: None, error: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
