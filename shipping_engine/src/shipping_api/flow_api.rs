use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db_types::{Carrier, Order, OrderId, ShipmentStatus, Shipping},
    events::{EventProducers, ShipmentStatusChangedEvent, TrackingAttachedEvent},
    shipping_api::{backoff::next_poll_time, errors::ShipmentFlowError, PollOutcome, PollSummary},
    traits::{CarrierClient, NormalizedTracking, ShippingDatabase},
};

/// Maximum number of due shipments handled per reconciliation invocation.
pub const POLL_BATCH_SIZE: i64 = 50;

/// `ShipmentFlowApi` drives the two shipment-tracking flows: the seller-triggered tracking
/// attachment and the scheduled reconciliation poll. It owns no policy about *who* may call it;
/// authorization happens at the route layer.
#[derive(Clone)]
pub struct ShipmentFlowApi<B, C> {
    db: B,
    carriers: C,
    producers: EventProducers,
}

impl<B, C> Debug for ShipmentFlowApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ShipmentFlowApi")
    }
}

impl<B, C> ShipmentFlowApi<B, C> {
    pub fn new(db: B, carriers: C, producers: EventProducers) -> Self {
        Self { db, carriers, producers }
    }
}

impl<B, C> ShipmentFlowApi<B, C>
where
    B: ShippingDatabase,
    C: CarrierClient,
{
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, ShipmentFlowError> {
        Ok(self.db.fetch_order_by_order_id(order_id).await?)
    }

    /// Attaches (or re-attaches) tracking to an order.
    ///
    /// Fetches the current carrier record, normalizes it and replaces the order's shipping state.
    /// Adapter failures propagate untouched and leave the order unchanged, so retrying is always
    /// safe. On success a [`TrackingAttachedEvent`] is published.
    pub async fn attach_tracking(
        &self,
        order: &Order,
        tracking_number: &str,
        carrier: Option<Carrier>,
    ) -> Result<Order, ShipmentFlowError> {
        let tracking_number = tracking_number.trim().to_uppercase();
        if tracking_number.is_empty() {
            return Err(ShipmentFlowError::EmptyTrackingNumber);
        }
        if !order.payment_status.is_shippable() {
            return Err(ShipmentFlowError::OrderNotShippable(order.order_id.clone()));
        }
        debug!("🚚️ Attaching tracking [{tracking_number}] to order {}", order.order_id);
        let tracking = self.carriers.fetch_tracking(&tracking_number, carrier).await?;
        let now = Utc::now();
        let shipping = apply_tracking(&order.shipping, &tracking, now, true);
        let updated = self.db.update_shipping(&order.order_id, &shipping).await?;
        info!(
            "🚚️ Order {} now tracked via {} [{tracking_number}], status {}",
            updated.order_id,
            tracking.carrier,
            updated.shipping.shipment_status
        );
        self.call_tracking_attached_hook(&updated).await;
        Ok(updated)
    }

    /// Runs one reconciliation batch: re-polls every due shipment, advances its schedule and
    /// reports per-order outcomes. One record's failure never aborts the batch; the record's
    /// schedule is left untouched so it stays due for the next invocation.
    pub async fn poll_due_shipments(&self, now: DateTime<Utc>) -> Result<PollSummary, ShipmentFlowError> {
        let due = self.db.fetch_due_shipments(now, POLL_BATCH_SIZE).await?;
        debug!("🚚️ Reconciliation batch: {} shipments due", due.len());
        let mut results = Vec::with_capacity(due.len());
        for order in due {
            let order_id = order.order_id.clone();
            let outcome = match self.poll_one(order, now).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("🚚️ Reconciliation failed for order {order_id}: {e}");
                    PollOutcome::failure(order_id, e.to_string())
                },
            };
            results.push(outcome);
        }
        let summary = PollSummary { processed: results.len(), results };
        info!(
            "🚚️ Reconciliation batch complete: {} processed, {} failed",
            summary.processed,
            summary.results.iter().filter(|r| !r.is_success()).count()
        );
        Ok(summary)
    }

    async fn poll_one(&self, order: Order, now: DateTime<Utc>) -> Result<PollOutcome, ShipmentFlowError> {
        let tracking_number = order
            .shipping
            .tracking_number
            .clone()
            .ok_or_else(|| ShipmentFlowError::EmptyTrackingNumber)?;
        let tracking = self.carriers.fetch_tracking(&tracking_number, order.shipping.carrier).await?;
        let previous = order.shipping.shipment_status;
        let mut shipping = apply_tracking(&order.shipping, &tracking, now, false);
        shipping.last_polled_at = Some(now);
        shipping.poll_attempts = order.shipping.poll_attempts + 1;
        shipping.next_poll_at = next_poll_time(shipping.shipment_status, shipping.poll_attempts, now);
        let updated = self.db.update_shipping(&order.order_id, &shipping).await?;
        let current = updated.shipping.shipment_status;
        if current != previous {
            debug!("🚚️ Order {} transitioned {previous} -> {current}", updated.order_id);
            self.call_status_changed_hook(&updated, previous, current).await;
        }
        Ok(PollOutcome::success(
            updated.order_id.clone(),
            previous,
            current,
            updated.shipping.poll_attempts,
            updated.shipping.next_poll_at,
        ))
    }

    async fn call_tracking_attached_hook(&self, order: &Order) {
        for producer in &self.producers.tracking_attached_producer {
            let event = TrackingAttachedEvent { order: order.clone() };
            producer.publish_event(event).await;
        }
    }

    async fn call_status_changed_hook(&self, order: &Order, previous: ShipmentStatus, current: ShipmentStatus) {
        for producer in &self.producers.status_changed_producer {
            let event = ShipmentStatusChangedEvent { order: order.clone(), previous, current };
            producer.publish_event(event).await;
        }
    }
}

/// Folds a normalized carrier result into an existing shipping record.
///
/// `reset_schedule` distinguishes the attachment flow (reconciliation state restarts from zero)
/// from the polling flow (the caller advances the schedule itself afterwards).
fn apply_tracking(current: &Shipping, tracking: &NormalizedTracking, now: DateTime<Utc>, reset_schedule: bool) -> Shipping {
    let mut shipping = current.clone();
    shipping.tracking_number = Some(tracking.tracking_number.clone());
    shipping.carrier = Some(tracking.carrier);
    shipping.shipment_status = tracking.status;
    shipping.tracking_events = tracking.events.clone();
    if shipping.shipped_at.is_none() {
        shipping.shipped_at = Some(now);
    }
    if !shipping.verified && !tracking.events.is_empty() {
        shipping.verified = true;
    }
    if tracking.status.is_terminal() && shipping.delivered_at.is_none() {
        shipping.delivered_at = Some(now);
    }
    if reset_schedule {
        shipping.poll_attempts = 0;
        shipping.last_polled_at = None;
        shipping.next_poll_at = next_poll_time(tracking.status, 0, now);
    }
    shipping
}
