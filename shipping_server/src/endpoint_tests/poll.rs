use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use shipping_engine::{events::EventProducers, ShipmentFlowApi};

use super::{
    helpers::{send_request, TEST_POLL_SECRET},
    mocks::{MockCarriers, MockShippingDb},
};
use crate::routes::poll_due;

const PATH: &str = "/orders/shipments/poll-due";

#[actix_web::test]
async fn poll_due_without_secret() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_request(TestRequest::post().uri(PATH), configure_empty_batch).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. Invalid poll secret."}"#);
}

#[actix_web::test]
async fn poll_due_with_wrong_secret() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri(PATH).insert_header(("x-poll-secret", "not-the-secret"));
    let (status, _) = send_request(req, configure_empty_batch).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn poll_due_with_header_secret() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::post().uri(PATH).insert_header(("x-poll-secret", TEST_POLL_SECRET));
    let (status, body) = send_request(req, configure_empty_batch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"processed":0,"results":[]}"#);
}

#[actix_web::test]
async fn poll_due_with_query_secret() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri(&format!("{PATH}?secret={TEST_POLL_SECRET}"));
    let (status, body) = send_request(req, configure_empty_batch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"processed":0,"results":[]}"#);
}

fn configure_empty_batch(cfg: &mut ServiceConfig) {
    let mut db = MockShippingDb::new();
    db.expect_fetch_due_shipments().returning(|_, _| Ok(vec![]));
    let api = ShipmentFlowApi::new(db, MockCarriers::new(), EventProducers::default());
    cfg.app_data(web::Data::new(api)).service(
        web::resource(PATH)
            .route(web::post().to(poll_due::<MockShippingDb, MockCarriers>))
            .route(web::get().to(poll_due::<MockShippingDb, MockCarriers>)),
    );
}
