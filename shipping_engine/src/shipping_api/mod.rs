mod backoff;
mod errors;
mod flow_api;
mod poll_objects;

pub use backoff::{next_poll_time, MAX_POLL_ATTEMPTS};
pub use errors::ShipmentFlowError;
pub use flow_api::{ShipmentFlowApi, POLL_BATCH_SIZE};
pub use poll_objects::{PollOutcome, PollSummary};
