use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db_types::{NewOrder, Order, OrderId, Shipping};

#[derive(Debug, Error)]
pub enum ShippingDatabaseError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Could not convert database record: {0}")]
    ConversionError(String),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for ShippingDatabaseError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Backend storage for orders and their embedded shipping records.
#[allow(async_fn_in_trait)]
pub trait ShippingDatabase: Clone {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Stores a new order with an empty shipping record. Idempotent: returns the existing order
    /// and `false` if the order id is already present.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), ShippingDatabaseError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ShippingDatabaseError>;

    /// Replaces the shipping record of the given order wholesale and returns the updated order.
    /// Writes are last-write-wins; overlapping reconciliation runs converge rather than corrupt.
    async fn update_shipping(&self, order_id: &OrderId, shipping: &Shipping) -> Result<Order, ShippingDatabaseError>;

    /// Selects the orders due for a reconciliation poll: tracking number set, not delivered, and
    /// `next_poll_at` absent or not after `now`. Ordered by `next_poll_at` ascending, capped at
    /// `limit` records.
    async fn fetch_due_shipments(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Order>, ShippingDatabaseError>;
}
