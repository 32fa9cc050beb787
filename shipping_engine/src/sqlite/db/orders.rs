use chrono::{DateTime, Utc};
use log::debug;
use sqlx::{FromRow, SqliteConnection};

use crate::{
    db_types::{Carrier, NewOrder, Order, OrderId, Shipping},
    shipping_api::MAX_POLL_ATTEMPTS,
    traits::ShippingDatabaseError,
};

/// Flat row shape of the orders table. `Carrier` persists in its canonical mixed-case form
/// ("FedEx") and tracking events as a JSON column, so the row is converted explicitly instead of
/// decoding domain types straight out of sqlx.
#[derive(Debug, FromRow)]
pub struct OrderRow {
    pub id: i64,
    pub order_id: String,
    pub artwork_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub price: i64,
    pub currency: String,
    pub payment_status: String,
    pub payment_ref: Option<String>,
    pub tracking_number: Option<String>,
    pub carrier: Option<String>,
    pub shipment_status: String,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub tracking_events: String,
    pub verified: bool,
    pub poll_attempts: i64,
    pub last_polled_at: Option<DateTime<Utc>>,
    pub next_poll_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = ShippingDatabaseError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let conversion = |e: String| ShippingDatabaseError::ConversionError(e);
        let carrier = row
            .carrier
            .map(|c| c.parse::<Carrier>())
            .transpose()
            .map_err(|e| conversion(e.to_string()))?;
        let shipping = Shipping {
            tracking_number: row.tracking_number,
            carrier,
            shipment_status: row.shipment_status.parse().map_err(|e: crate::db_types::ConversionError| conversion(e.to_string()))?,
            shipped_at: row.shipped_at,
            delivered_at: row.delivered_at,
            tracking_events: serde_json::from_str(&row.tracking_events).map_err(|e| conversion(e.to_string()))?,
            verified: row.verified,
            poll_attempts: row.poll_attempts,
            last_polled_at: row.last_polled_at,
            next_poll_at: row.next_poll_at,
        };
        Ok(Order {
            id: row.id,
            order_id: OrderId(row.order_id),
            artwork_id: row.artwork_id,
            buyer_id: row.buyer_id,
            seller_id: row.seller_id,
            price: row.price.try_into().map_err(|e: asg_common::MinorUnitsError| conversion(e.to_string()))?,
            currency: row.currency,
            payment_status: row.payment_status.parse().map_err(|e: crate::db_types::ConversionError| conversion(e.to_string()))?,
            payment_ref: row.payment_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
            shipping,
        })
    }
}

/// Inserts the order, returning `false` in the second element if it already existed.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(Order, bool), ShippingDatabaseError> {
    match fetch_order_by_order_id(&order.order_id, conn).await? {
        Some(existing) => Ok((existing, false)),
        None => {
            let order = insert_order(order, conn).await?;
            debug!("🗃️ Order {} inserted with id {}", order.order_id, order.id);
            Ok((order, true))
        },
    }
}

async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, ShippingDatabaseError> {
    let row: OrderRow = sqlx::query_as(
        r#"
            INSERT INTO orders (order_id, artwork_id, buyer_id, seller_id, price, currency, payment_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(order.order_id.as_str())
    .bind(order.artwork_id)
    .bind(order.buyer_id)
    .bind(order.seller_id)
    .bind(order.price.value())
    .bind(order.currency)
    .bind(order.payment_ref)
    .fetch_one(conn)
    .await?;
    row.try_into()
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, ShippingDatabaseError> {
    let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    row.map(Order::try_from).transpose()
}

/// Replaces the order's shipping columns wholesale and returns the updated order.
pub async fn update_shipping(
    order_id: &OrderId,
    shipping: &Shipping,
    conn: &mut SqliteConnection,
) -> Result<Order, ShippingDatabaseError> {
    let events = serde_json::to_string(&shipping.tracking_events)
        .map_err(|e| ShippingDatabaseError::ConversionError(e.to_string()))?;
    let row: Option<OrderRow> = sqlx::query_as(
        r#"
            UPDATE orders SET
                tracking_number = $2,
                carrier = $3,
                shipment_status = $4,
                shipped_at = $5,
                delivered_at = $6,
                tracking_events = $7,
                verified = $8,
                poll_attempts = $9,
                last_polled_at = $10,
                next_poll_at = $11,
                updated_at = $12
            WHERE order_id = $1
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(shipping.tracking_number.as_deref())
    .bind(shipping.carrier.map(|c| c.as_str()))
    .bind(shipping.shipment_status.as_str())
    .bind(shipping.shipped_at)
    .bind(shipping.delivered_at)
    .bind(events)
    .bind(shipping.verified)
    .bind(shipping.poll_attempts)
    .bind(shipping.last_polled_at)
    .bind(shipping.next_poll_at)
    .bind(Utc::now())
    .fetch_optional(conn)
    .await?;
    match row {
        Some(row) => row.try_into(),
        None => Err(ShippingDatabaseError::OrderNotFound(order_id.clone())),
    }
}

/// Shipments due for a reconciliation poll, ordered so the longest-overdue come first. Shipments
/// that have exhausted their poll attempts are abandoned and never selected again.
pub async fn fetch_due_shipments(
    now: DateTime<Utc>,
    limit: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, ShippingDatabaseError> {
    let rows: Vec<OrderRow> = sqlx::query_as(
        r#"
            SELECT * FROM orders
            WHERE tracking_number IS NOT NULL
              AND shipment_status != 'delivered'
              AND poll_attempts < $3
              AND (next_poll_at IS NULL OR next_poll_at <= $1)
            ORDER BY next_poll_at ASC
            LIMIT $2
        "#,
    )
    .bind(now)
    .bind(limit)
    .bind(MAX_POLL_ATTEMPTS)
    .fetch_all(conn)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
}
