//! `SqliteDatabase` is the concrete storage backend for the shipping engine. It implements the
//! [`ShippingDatabase`] seam as well as [`NotificationSink`] (notifications are persisted to
//! their own table and picked up by the delivery pipeline out of band).
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::db::{new_pool, notifications, orders};
use crate::{
    db_types::{NewOrder, Order, OrderId, Shipping},
    traits::{NewNotification, NotificationError, NotificationSink, ShippingDatabase, ShippingDatabaseError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, ShippingDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// An in-memory database for tests. Pinned to a single connection, otherwise every pooled
    /// connection would see its own empty database.
    pub async fn new_in_memory() -> Result<Self, ShippingDatabaseError> {
        Self::new_with_url("sqlite::memory:", 1).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ShippingDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), ShippingDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        orders::idempotent_insert(order, &mut conn).await
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ShippingDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn update_shipping(&self, order_id: &OrderId, shipping: &Shipping) -> Result<Order, ShippingDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_shipping(order_id, shipping, &mut conn).await
    }

    async fn fetch_due_shipments(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Order>, ShippingDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_due_shipments(now, limit, &mut conn).await
    }
}

impl NotificationSink for SqliteDatabase {
    async fn notify(&self, notification: NewNotification) -> Result<(), NotificationError> {
        let mut conn = self.pool.acquire().await.map_err(|e| NotificationError(e.to_string()))?;
        notifications::insert_notification(notification, &mut conn).await
    }
}
