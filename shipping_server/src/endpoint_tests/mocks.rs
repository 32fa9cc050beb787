use chrono::{DateTime, Utc};
use mockall::mock;
use shipping_engine::{
    db_types::{Carrier, NewOrder, Order, OrderId, Shipping},
    traits::{
        CarrierClient,
        CarrierClientError,
        NormalizedTracking,
        ShippingDatabase,
        ShippingDatabaseError,
    },
};

mock! {
    pub ShippingDb {}
    impl ShippingDatabase for ShippingDb {
        fn url(&self) -> &str;
        async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), ShippingDatabaseError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, ShippingDatabaseError>;
        async fn update_shipping(&self, order_id: &OrderId, shipping: &Shipping) -> Result<Order, ShippingDatabaseError>;
        async fn fetch_due_shipments(&self, now: DateTime<Utc>, limit: i64) -> Result<Vec<Order>, ShippingDatabaseError>;
    }
    impl Clone for ShippingDb {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Carriers {}
    impl CarrierClient for Carriers {
        async fn fetch_tracking(&self, tracking_number: &str, carrier: Option<Carrier>) -> Result<NormalizedTracking, CarrierClientError>;
    }
    impl Clone for Carriers {
        fn clone(&self) -> Self;
    }
}
