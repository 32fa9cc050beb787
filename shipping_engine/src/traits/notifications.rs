use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::OrderId;

/// A notification handed to the delivery subsystem. Delivery is asynchronous and best-effort:
/// callers log failures and never let them escalate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    /// User id of the recipient.
    pub recipient: String,
    /// User id of the actor that triggered the notification, if any.
    pub actor: Option<String>,
    /// Notification type tag, e.g. "shipped", "out_for_delivery", "delivered".
    pub kind: String,
    pub title: String,
    pub message: String,
    pub order_id: OrderId,
    #[serde(default)]
    pub related_data: serde_json::Value,
}

#[derive(Debug, Clone, Error)]
#[error("Could not store notification: {0}")]
pub struct NotificationError(pub String);

pub trait NotificationSink: Clone {
    /// Sends one notification. Declared desugared so the returned future is `Send`; sinks run
    /// inside spawned event-handler tasks.
    fn notify(&self, notification: NewNotification) -> impl Future<Output = Result<(), NotificationError>> + Send;
}
