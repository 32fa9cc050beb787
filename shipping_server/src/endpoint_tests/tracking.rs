use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{Days, Duration, Utc};
use serde_json::json;
use shipping_engine::{
    db_types::{Carrier, PaymentStatus, ShipmentStatus, TrackingEvent},
    events::EventProducers,
    traits::{CarrierClientError, NormalizedTracking},
    ShipmentFlowApi,
};

use super::{
    helpers::{issue_token, patch_request, seeded_order},
    mocks::{MockCarriers, MockShippingDb},
};
use crate::routes::update_tracking;

const PATH: &str = "/order/order-1001/tracking";

fn valid_token() -> String {
    issue_token("seller-1", Utc::now() + Days::new(1))
}

fn tracking_body() -> serde_json::Value {
    json!({"trackingNumber": "1Z12345E0291980793", "carrier": "ups"})
}

#[actix_web::test]
async fn attach_tracking_without_token() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request("", PATH, tracking_body(), configure_untouched).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Authentication Error. No access token was provided."}"#);
}

#[actix_web::test]
async fn attach_tracking_with_expired_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("seller-1", Utc::now() - Duration::minutes(5));
    let (status, body) = patch_request(&token, PATH, tracking_body(), configure_untouched).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Authentication Error. Access token has expired."}"#);
}

#[actix_web::test]
async fn attach_tracking_with_blank_tracking_number() {
    let _ = env_logger::try_init().ok();
    let body = json!({"trackingNumber": "   "});
    let (status, body) = patch_request(&valid_token(), PATH, body, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: trackingNumber must not be empty"}"#);
}

#[actix_web::test]
async fn attach_tracking_with_unsupported_carrier() {
    let _ = env_logger::try_init().ok();
    let body = json!({"trackingNumber": "ABC123", "carrier": "pigeon-express"});
    let (status, body) = patch_request(&valid_token(), PATH, body, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Could not read request body: Unsupported carrier: pigeon-express"}"#);
}

#[actix_web::test]
async fn attach_tracking_to_unknown_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request(&valid_token(), PATH, tracking_body(), configure_missing_order).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order #order-1001"}"#);
}

#[actix_web::test]
async fn attach_tracking_as_non_seller() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("buyer-9", Utc::now() + Days::new(1));
    let (status, body) = patch_request(&token, PATH, tracking_body(), configure_other_seller).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. Only the seller may attach tracking to an order."}"#);
}

#[actix_web::test]
async fn attach_tracking_to_refunded_order() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request(&valid_token(), PATH, tracking_body(), configure_refunded_order).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"The order cannot be modified. Order #order-1001 is no longer shippable"}"#);
}

#[actix_web::test]
async fn carrier_failures_pass_through() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request(&valid_token(), PATH, tracking_body(), configure_carrier_down).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, r#"{"error":"Carrier lookup failed. UPS is experiencing an outage"}"#);
}

#[actix_web::test]
async fn attach_tracking_succeeds_for_seller() {
    let _ = env_logger::try_init().ok();
    let (status, body) = patch_request(&valid_token(), PATH, tracking_body(), configure_success).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""orderId":"order-1001""#), "body: {body}");
    assert!(body.contains(r#""trackingNumber":"1Z12345E0291980793""#), "body: {body}");
    assert!(body.contains(r#""carrier":"UPS""#), "body: {body}");
    assert!(body.contains(r#""shipmentStatus":"in_transit""#), "body: {body}");
    assert!(body.contains(r#""verified":true"#), "body: {body}");
}

fn in_transit_tracking() -> NormalizedTracking {
    NormalizedTracking {
        carrier: Carrier::Ups,
        tracking_number: "1Z12345E0291980793".to_string(),
        status: ShipmentStatus::InTransit,
        events: vec![TrackingEvent {
            status: "in_transit".to_string(),
            message: "Departed from Facility".to_string(),
            datetime: None,
            location: "Louisville, KY, US".to_string(),
        }],
    }
}

fn register(cfg: &mut ServiceConfig, db: MockShippingDb, carriers: MockCarriers) {
    let api = ShipmentFlowApi::new(db, carriers, EventProducers::default());
    cfg.app_data(web::Data::new(api)).service(
        web::resource("/order/{order_id}/tracking")
            .route(web::patch().to(update_tracking::<MockShippingDb, MockCarriers>)),
    );
}

// The request must be rejected before the database or carrier is touched.
fn configure_untouched(cfg: &mut ServiceConfig) {
    register(cfg, MockShippingDb::new(), MockCarriers::new());
}

fn configure_missing_order(cfg: &mut ServiceConfig) {
    let mut db = MockShippingDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    register(cfg, db, MockCarriers::new());
}

fn configure_other_seller(cfg: &mut ServiceConfig) {
    let mut db = MockShippingDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(seeded_order("seller-1"))));
    register(cfg, db, MockCarriers::new());
}

// No carrier expectations: a refunded order must never reach the carrier.
fn configure_refunded_order(cfg: &mut ServiceConfig) {
    let mut db = MockShippingDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| {
        let mut order = seeded_order("seller-1");
        order.payment_status = PaymentStatus::Refunded;
        Ok(Some(order))
    });
    register(cfg, db, MockCarriers::new());
}

fn configure_carrier_down(cfg: &mut ServiceConfig) {
    let mut db = MockShippingDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(seeded_order("seller-1"))));
    let mut carriers = MockCarriers::new();
    carriers
        .expect_fetch_tracking()
        .returning(|_, _| Err(CarrierClientError::new(Some(503), "UPS is experiencing an outage")));
    register(cfg, db, carriers);
}

fn configure_success(cfg: &mut ServiceConfig) {
    let mut db = MockShippingDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(seeded_order("seller-1"))));
    db.expect_update_shipping().returning(|order_id, shipping| {
        let mut order = seeded_order("seller-1");
        order.order_id = order_id.clone();
        order.shipping = shipping.clone();
        Ok(order)
    });
    let mut carriers = MockCarriers::new();
    carriers.expect_fetch_tracking().returning(|_, _| Ok(in_transit_tracking()));
    register(cfg, db, carriers);
}
