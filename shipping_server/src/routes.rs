//! Request handler definitions.
//!
//! Handlers stay generic over the database and carrier client so the endpoint tests can swap in
//! mocks; `server.rs` instantiates them with the concrete types. Anything longer than a screen
//! belongs in its own module.

use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use shipping_engine::{
    db_types::{Carrier, OrderId},
    traits::{CarrierClient, ShippingDatabase},
    ShipmentFlowApi,
};

use crate::{
    auth::AuthenticatedUser,
    config::PollSecret,
    data_objects::{PollQuery, TrackingRequest, TrackingResponse},
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//--------------------------------------------  Attach tracking  -----------------------------------------------
/// `PATCH /order/{order_id}/tracking` attaches (or re-attaches) a tracking number to an order.
///
/// Only the order's seller may call this; the caller is identified by the access token in the
/// `asg_access_token` header. The carrier field is optional: when present it must be a supported
/// carrier slug, when absent the carrier is inferred from the tracking number or auto-detected.
/// A carrier lookup failure passes the carrier's own status and message through untouched, so
/// sellers see why their tracking number was rejected.
pub async fn update_tracking<B, C>(
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<TrackingRequest>,
    api: web::Data<ShipmentFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: ShippingDatabase + 'static,
    C: CarrierClient + 'static,
{
    let order_id = OrderId(path.into_inner());
    let request = body.into_inner();
    debug!("💻️ PATCH tracking for order {order_id} from user {}", user.user_id);
    if request.tracking_number.trim().is_empty() {
        return Err(ServerError::InvalidRequestBody("trackingNumber must not be empty".to_string()));
    }
    let carrier = request
        .carrier
        .as_deref()
        .map(|slug| {
            slug.parse::<Carrier>()
                .map_err(|_| ServerError::InvalidRequestBody(format!("Unsupported carrier: {slug}")))
        })
        .transpose()?;
    let order = api
        .fetch_order(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    if order.seller_id != user.user_id {
        debug!("💻️ User {} may not attach tracking to order {order_id}", user.user_id);
        return Err(ServerError::InsufficientPermissions(
            "Only the seller may attach tracking to an order.".to_string(),
        ));
    }
    let updated = api.attach_tracking(&order, &request.tracking_number, carrier).await?;
    Ok(HttpResponse::Ok().json(TrackingResponse { order_id: updated.order_id.clone(), shipping: updated.shipping }))
}

//----------------------------------------------  Poll due  ----------------------------------------------------
/// `POST|GET /orders/shipments/poll-due` runs one reconciliation batch.
///
/// Meant to be driven by the platform scheduler, so it is guarded by a shared secret (the
/// `x-poll-secret` header, or a `secret` query parameter for schedulers that cannot set headers)
/// instead of a user token. An empty configured secret rejects every caller.
pub async fn poll_due<B, C>(
    req: HttpRequest,
    query: web::Query<PollQuery>,
    secret: web::Data<PollSecret>,
    api: web::Data<ShipmentFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: ShippingDatabase + 'static,
    C: CarrierClient + 'static,
{
    let expected = secret.0.reveal();
    let supplied = req
        .headers()
        .get("x-poll-secret")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| query.into_inner().secret);
    if expected.is_empty() || supplied.as_deref() != Some(expected.as_str()) {
        debug!("💻️ Rejected poll-due request with missing or incorrect secret");
        return Err(ServerError::InsufficientPermissions("Invalid poll secret.".to_string()));
    }
    let summary = api.poll_due_shipments(Utc::now()).await?;
    Ok(HttpResponse::Ok().json(summary))
}
