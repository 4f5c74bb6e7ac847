//! Instrument identification (`*IDN?` reply)

use std::fmt;

use crate::error::ParseError;

/// Identification of a SCPI instrument
///
/// Parsed from the standard `*IDN?` reply:
/// `<manufacturer>, <model>, <serial number>, <firmware>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    /// Manufacturer name
    pub manufacturer: String,

    /// Model designation
    pub model: String,

    /// Unit serial number
    pub serial_number: String,

    /// Firmware revision
    pub firmware: String,
}

impl Identification {
    /// Parse the four comma-separated `*IDN?` fields
    pub fn parse(reply: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = reply.split(',').map(str::trim).collect();

        match fields.as_slice() {
            [manufacturer, model, serial_number, firmware] => Ok(Self {
                manufacturer: manufacturer.to_string(),
                model: model.to_string(),
                serial_number: serial_number.to_string(),
                firmware: firmware.to_string(),
            }),
            _ => Err(ParseError::MalformedIdentification(reply.to_string())),
        }
    }
}

impl fmt::Display for Identification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [SN: {}, FW: {}]",
            self.manufacturer, self.model, self.serial_number, self.firmware
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_four_fields() {
        let idn = Identification::parse("Jackson Labs, FireFly-IA, 1234567, 0.913").unwrap();
        assert_eq!(idn.manufacturer, "Jackson Labs");
        assert_eq!(idn.model, "FireFly-IA");
        assert_eq!(idn.serial_number, "1234567");
        assert_eq!(idn.firmware, "0.913");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(Identification::parse("FireFly-IA, 1234567").is_err());
        assert!(Identification::parse("").is_err());
        assert!(Identification::parse("a, b, c, d, e").is_err());
    }
}
