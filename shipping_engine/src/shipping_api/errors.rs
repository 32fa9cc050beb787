use thiserror::Error;

use crate::{
    db_types::OrderId,
    traits::{CarrierClientError, ShippingDatabaseError},
};

#[derive(Debug, Error)]
pub enum ShipmentFlowError {
    #[error("Tracking number must not be empty")]
    EmptyTrackingNumber,
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} is no longer shippable")]
    OrderNotShippable(OrderId),
    #[error(transparent)]
    CarrierError(#[from] CarrierClientError),
    #[error(transparent)]
    DatabaseError(#[from] ShippingDatabaseError),
}
