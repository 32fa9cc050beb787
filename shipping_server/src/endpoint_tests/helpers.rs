use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use asg_common::{MinorUnits, Secret};
use chrono::{DateTime, TimeZone, Utc};
use shipping_engine::db_types::{Order, OrderId, PaymentStatus, Shipping};

use crate::{
    auth::{TokenIssuer, ACCESS_TOKEN_HEADER},
    config::{AuthConfig, PollSecret},
};

// Test-only keys. DO NOT re-use these anywhere.
pub const TEST_AUTH_KEY: &str = "endpoint-test-signing-key";
pub const TEST_POLL_SECRET: &str = "endpoint-test-poll-secret";

pub fn get_auth_config() -> AuthConfig {
    AuthConfig { hmac_key: Secret::new(TEST_AUTH_KEY.to_string()) }
}

pub fn issue_token(user_id: &str, expiry: DateTime<Utc>) -> String {
    TokenIssuer::new(&get_auth_config()).issue(user_id, expiry)
}

pub async fn send_request(
    req: TestRequest,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let app = App::new()
        .app_data(web::Data::new(get_auth_config()))
        .app_data(web::Data::new(PollSecret(Secret::new(TEST_POLL_SECRET.to_string()))))
        .configure(configure);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let (_, res) = res.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn patch_request(
    auth_header: &str,
    path: &str,
    body: serde_json::Value,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::patch().uri(path).set_json(body);
    if !auth_header.is_empty() {
        req = req.insert_header((ACCESS_TOKEN_HEADER, auth_header));
    }
    send_request(req, configure).await
}

/// A seller's order, pre-tracking, as the database mock returns it.
pub fn seeded_order(seller_id: &str) -> Order {
    let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    Order {
        id: 1,
        order_id: OrderId("order-1001".to_string()),
        artwork_id: "art-77".to_string(),
        buyer_id: "buyer-9".to_string(),
        seller_id: seller_id.to_string(),
        price: MinorUnits::try_from(250_00_i64).unwrap(),
        currency: "USD".to_string(),
        payment_status: PaymentStatus::Paid,
        payment_ref: None,
        created_at,
        updated_at: created_at,
        shipping: Shipping::default(),
    }
}
