//! Trait seams between the engine and its collaborators.
//!
//! The engine never talks to SQLite, carriers or the notification store directly; it goes through
//! these traits so that backends can be swapped out (and mocked in the server's endpoint tests).

mod carrier_client;
mod notifications;
mod shipping_database;

pub use carrier_client::{CarrierClient, CarrierClientError, NormalizedTracking};
pub use notifications::{NewNotification, NotificationError, NotificationSink};
pub use shipping_database::{ShippingDatabase, ShippingDatabaseError};
