mod minor_units;
mod secret;

pub use minor_units::{MinorUnits, MinorUnitsError};
pub use secret::Secret;
