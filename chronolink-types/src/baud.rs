//! Validated baud rates

use std::fmt;

use crate::error::ValidationError;

/// The fixed set of serial rates a transport may be asked to use
///
/// 0 is the special "leave unchanged" entry some backends accept. Anything
/// outside this table is rejected, never coerced to a neighbour.
pub const SUPPORTED_RATES: [u32; 31] = [
    50, 75, 110, 134, 150, 200, 300, 600, 1_200, 1_800, 2_400, 4_800, 9_600, 19_200, 38_400,
    57_600, 115_200, 230_400, 460_800, 500_000, 576_000, 921_600, 1_000_000, 1_152_000, 1_500_000,
    2_000_000, 2_500_000, 3_000_000, 3_500_000, 4_000_000, 0,
];

/// A baud rate known to be in [`SUPPORTED_RATES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Baud(u32);

impl Baud {
    /// Validate a proposed rate against the supported table
    pub fn new(rate: u32) -> Result<Self, ValidationError> {
        if SUPPORTED_RATES.contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(ValidationError::UnsupportedBaud(rate))
        }
    }

    /// The rate in bits per second
    pub fn rate(self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Baud {
    type Error = ValidationError;

    fn try_from(rate: u32) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl fmt::Display for Baud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Bd", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_table_entries() {
        for rate in [9_600, 57_600, 115_200, 4_000_000, 0] {
            assert_eq!(Baud::new(rate).unwrap().rate(), rate);
        }
    }

    #[test]
    fn rejects_off_table_rates() {
        for rate in [1, 9_601, 128_000, u32::MAX] {
            assert_eq!(Baud::new(rate), Err(ValidationError::UnsupportedBaud(rate)));
        }
    }

    #[test]
    fn try_from_round_trip() {
        let baud: Baud = 115_200u32.try_into().unwrap();
        assert_eq!(baud.to_string(), "115200 Bd");
    }
}
