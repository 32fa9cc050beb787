use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A price expressed in minor currency units (cents, pence, etc.).
///
/// Order prices are always non-negative. The inner value is an `i64` so that it can round-trip
/// through SQLite without casts, but the constructors reject negative amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinorUnits(i64);

#[derive(Debug, Clone, Error)]
#[error("Invalid amount in minor currency units: {0}")]
pub struct MinorUnitsError(String);

impl MinorUnits {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for MinorUnits {
    type Error = MinorUnitsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            Err(MinorUnitsError(format!("{value} is negative")))
        } else {
            Ok(Self(value))
        }
    }
}

impl TryFrom<u64> for MinorUnits {
    type Error = MinorUnitsError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MinorUnitsError(format!("{value} is too large")))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(MinorUnits::try_from(-1i64).is_err());
        assert_eq!(MinorUnits::try_from(2500i64).unwrap().value(), 2500);
    }

    #[test]
    fn display_uses_major_units() {
        let price = MinorUnits::try_from(123456i64).unwrap();
        assert_eq!(price.to_string(), "1234.56");
    }
}
