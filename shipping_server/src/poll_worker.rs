use std::time::Duration;

use carrier_tools::CarrierAdapters;
use chrono::Utc;
use log::*;
use shipping_engine::{events::EventProducers, ShipmentFlowApi, SqliteDatabase};
use tokio::task::JoinHandle;

/// Starts the in-process reconciliation worker. Do not await the returned JoinHandle, as it will
/// run indefinitely.
pub fn start_poll_worker(
    db: SqliteDatabase,
    carriers: CarrierAdapters,
    producers: EventProducers,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = ShipmentFlowApi::new(db, carriers, producers);
        info!("🕰️ Shipment reconciliation worker started");
        loop {
            timer.tick().await;
            debug!("🕰️ Running shipment reconciliation batch");
            match api.poll_due_shipments(Utc::now()).await {
                Ok(summary) => {
                    let failed = summary.results.iter().filter(|r| !r.is_success()).count();
                    info!("🕰️ {} shipments polled, {failed} failed", summary.processed);
                },
                Err(e) => {
                    error!("🕰️ Error running shipment reconciliation batch: {e}");
                },
            }
        }
    })
}
