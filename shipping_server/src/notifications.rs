//! Translates engine events into buyer notifications.
//!
//! The engine publishes events without knowing what a notification is; the hooks built here turn
//! the interesting transitions into [`NewNotification`]s and hand them to the sink. Delivery is
//! best-effort: failures are logged and swallowed, a lost notification never fails a request.

use std::{future::Future, pin::Pin};

use log::*;
use serde_json::json;
use shipping_engine::{
    events::EventHooks,
    traits::{NewNotification, NotificationSink},
    Order,
    ShipmentStatus,
};

/// Builds the event hooks for a notification sink. Wire the result into [`EventHandlers`] at
/// startup.
///
/// [`EventHandlers`]: shipping_engine::events::EventHandlers
pub fn notification_hooks<S>(sink: S) -> EventHooks
where S: NotificationSink + Send + Sync + 'static {
    let mut hooks = EventHooks::default();
    let attach_sink = sink.clone();
    hooks.on_tracking_attached(move |event| {
        let sink = attach_sink.clone();
        let fut = async move {
            let order = event.order;
            deliver(&sink, shipped(&order)).await;
            // A shipment can already be delivered when the seller first attaches tracking.
            if order.shipping.shipment_status == ShipmentStatus::Delivered {
                deliver(&sink, delivered(&order)).await;
            }
        };
        Box::pin(fut) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks.on_status_changed(move |event| {
        let sink = sink.clone();
        let fut = async move {
            match event.current {
                ShipmentStatus::OutForDelivery => deliver(&sink, out_for_delivery(&event.order)).await,
                ShipmentStatus::Delivered => deliver(&sink, delivered(&event.order)).await,
                // Other transitions are visible on the order itself; no notification.
                _ => {},
            }
        };
        Box::pin(fut) as Pin<Box<dyn Future<Output = ()> + Send>>
    });
    hooks
}

async fn deliver<S: NotificationSink>(sink: &S, notification: NewNotification) {
    let kind = notification.kind.clone();
    let order_id = notification.order_id.clone();
    if let Err(e) = sink.notify(notification).await {
        warn!("📨️ Could not deliver '{kind}' notification for order {order_id}. {e}");
    } else {
        debug!("📨️ Delivered '{kind}' notification for order {order_id}");
    }
}

fn shipped(order: &Order) -> NewNotification {
    NewNotification {
        recipient: order.buyer_id.clone(),
        actor: Some(order.seller_id.clone()),
        kind: "shipped".to_string(),
        title: "Your artwork has shipped".to_string(),
        message: format!("Order {} is on its way.", order.order_id),
        order_id: order.order_id.clone(),
        related_data: tracking_data(order),
    }
}

fn out_for_delivery(order: &Order) -> NewNotification {
    NewNotification {
        recipient: order.buyer_id.clone(),
        actor: None,
        kind: "out_for_delivery".to_string(),
        title: "Your artwork is out for delivery".to_string(),
        message: format!("Order {} should arrive today.", order.order_id),
        order_id: order.order_id.clone(),
        related_data: tracking_data(order),
    }
}

fn delivered(order: &Order) -> NewNotification {
    NewNotification {
        recipient: order.buyer_id.clone(),
        actor: None,
        kind: "delivered".to_string(),
        title: "Your artwork has been delivered".to_string(),
        message: format!("Order {} has been delivered.", order.order_id),
        order_id: order.order_id.clone(),
        related_data: tracking_data(order),
    }
}

fn tracking_data(order: &Order) -> serde_json::Value {
    json!({
        "trackingNumber": order.shipping.tracking_number,
        "carrier": order.shipping.carrier,
        "shipmentStatus": order.shipping.shipment_status,
    })
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use asg_common::MinorUnits;
    use chrono::Utc;
    use shipping_engine::{
        events::{EventHandlers, ShipmentStatusChangedEvent, TrackingAttachedEvent},
        traits::{NewNotification, NotificationError, NotificationSink},
        Carrier,
        Order,
        OrderId,
        PaymentStatus,
        ShipmentStatus,
        Shipping,
    };

    use super::notification_hooks;

    #[derive(Clone, Default)]
    struct RecordingSink {
        seen: Arc<Mutex<Vec<NewNotification>>>,
    }

    impl NotificationSink for RecordingSink {
        async fn notify(&self, notification: NewNotification) -> Result<(), NotificationError> {
            self.seen.lock().unwrap().push(notification);
            Ok(())
        }
    }

    fn order(status: ShipmentStatus) -> Order {
        let now = Utc::now();
        Order {
            id: 1,
            order_id: OrderId::from("order-77".to_string()),
            artwork_id: "art-20".to_string(),
            buyer_id: "buyer-9".to_string(),
            seller_id: "seller-1".to_string(),
            price: MinorUnits::try_from(125_000i64).unwrap(),
            currency: "USD".to_string(),
            payment_status: PaymentStatus::Paid,
            payment_ref: None,
            created_at: now,
            updated_at: now,
            shipping: Shipping {
                tracking_number: Some("1Z999AA10123456784".to_string()),
                carrier: Some(Carrier::Ups),
                shipment_status: status,
                ..Shipping::default()
            },
        }
    }

    // The hooks run on spawned handler tasks, so any sink's notify future has to be Send all the
    // way through the generic plumbing.
    #[tokio::test]
    async fn hooks_deliver_notifications_from_spawned_handlers() {
        let _ = env_logger::try_init();
        let sink = RecordingSink::default();
        let handlers = EventHandlers::new(4, notification_hooks(sink.clone()));
        let producers = handlers.producers();
        handlers.start_handlers().await;

        producers.tracking_attached_producer[0]
            .publish_event(TrackingAttachedEvent { order: order(ShipmentStatus::InTransit) })
            .await;
        producers.status_changed_producer[0]
            .publish_event(ShipmentStatusChangedEvent {
                order: order(ShipmentStatus::Delivered),
                previous: ShipmentStatus::OutForDelivery,
                current: ShipmentStatus::Delivered,
            })
            .await;
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let seen = sink.seen.lock().unwrap();
        let mut kinds = seen.iter().map(|n| n.kind.as_str()).collect::<Vec<_>>();
        kinds.sort_unstable();
        assert_eq!(kinds, ["delivered", "shipped"]);
        assert!(seen.iter().all(|n| n.recipient == "buyer-9"));
    }
}
