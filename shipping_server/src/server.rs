use std::time::Duration;

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use actix_web::dev::Server;
use carrier_tools::CarrierAdapters;
use shipping_engine::{
    events::{EventHandlers, EventProducers},
    ShipmentFlowApi,
    SqliteDatabase,
};

use crate::{
    config::{PollSecret, ServerConfig},
    errors::ServerError,
    notifications::notification_hooks,
    poll_worker::start_poll_worker,
    routes::{health, poll_due, update_tracking},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let carriers =
        CarrierAdapters::new(config.carriers.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    // The database doubles as the notification sink; events become rows in the notifications
    // table for the delivery service to pick up.
    let handlers = EventHandlers::new(10, notification_hooks(db.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    if let Some(interval) = config.poll_interval {
        start_poll_worker(db.clone(), carriers.clone(), producers.clone(), interval);
    }
    let srv = create_server_instance(config, db, carriers, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    carriers: CarrierAdapters,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let bind_address = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let api = ShipmentFlowApi::new(db.clone(), carriers.clone(), producers.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("asg::access_log"))
            .app_data(web::Data::new(api))
            .app_data(web::Data::new(config.auth.clone()))
            .app_data(web::Data::new(PollSecret(config.poll_secret.clone())))
            .service(health)
            .service(
                web::resource("/order/{order_id}/tracking")
                    .name("update_tracking")
                    .route(web::patch().to(update_tracking::<SqliteDatabase, CarrierAdapters>)),
            )
            .service(
                web::resource("/orders/shipments/poll-due")
                    .name("poll_due")
                    .route(web::post().to(poll_due::<SqliteDatabase, CarrierAdapters>))
                    .route(web::get().to(poll_due::<SqliteDatabase, CarrierAdapters>)),
            )
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(bind_address)?
    .run();
    Ok(srv)
}
