//! GPSDO synchronization health bitmask

use bitflags::bitflags;

use crate::error::ParseError;

bitflags! {
    /// Health status reported by `SYNC:HEALTH?`
    ///
    /// An empty set means the unit is healthy and locked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SyncHealth: u16 {
        /// OCXO coarse DAC maxed out at 255
        const COARSE_DAC_HIGH = 0x001;
        /// OCXO coarse DAC min-ed out at 0
        const COARSE_DAC_LOW = 0x002;
        /// Phase offset to UTC greater than 250 ns
        const PHASE_OFFSET = 0x004;
        /// Runtime below 300 s
        const SHORT_RUNTIME = 0x008;
        /// Holdover longer than 60 s
        const LONG_HOLDOVER = 0x010;
        /// Frequency error estimate out of bounds
        const FEE_OUT_OF_BOUNDS = 0x020;
        /// OCXO voltage too high
        const OCXO_VOLTAGE_HIGH = 0x040;
        /// OCXO voltage too low
        const OCXO_VOLTAGE_LOW = 0x080;
        /// Short-term (100 s) drift above 100 ns
        const SHORT_TERM_DRIFT = 0x100;
        /// Runtime below 7 min since phase reset
        const RECENT_PHASE_RESET = 0x200;
    }
}

impl SyncHealth {
    /// Parse the hex reply of `SYNC:HEALTH?` (for instance `0x000` or `0x98`)
    pub fn parse(reply: &str) -> Result<Self, ParseError> {
        let trimmed = reply.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bits = u16::from_str_radix(digits, 16)
            .map_err(|_| ParseError::MalformedHealth(reply.to_string()))?;

        Self::from_bits(bits).ok_or_else(|| ParseError::MalformedHealth(reply.to_string()))
    }

    /// Healthy and locked (no flag set)
    pub fn is_healthy(self) -> bool {
        self.is_empty()
    }
}
