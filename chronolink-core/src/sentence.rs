//! NMEA/PUBX sentence construction
//!
//! Sentences are line-oriented text frames of the form
//! `$<body>*<XX>` where `<XX>` is the XOR-8 checksum of the body in
//! uppercase hex. PUBX is the vendor sentence family used to configure
//! GNSS receivers.

use crate::{checksum, error::EncodingError};

/// Characters that cannot appear inside a sentence field
const RESERVED: [char; 3] = [',', '*', '$'];

/// Build a `$PUBX,<kind>,<field1>,...*XX` sentence
///
/// The checksum span runs from just after `$` to just before `*`, commas
/// included.
///
/// # Errors
///
/// Fails with [`EncodingError::InvalidField`] when a field contains `,`,
/// `*`, or `$`, which would corrupt the framing.
///
/// # Examples
///
/// ```
/// use chronolink_core::sentence;
///
/// let s = sentence::pubx("40", &["RMC", "1", "1", "1", "1", "0", "0"]).unwrap();
/// assert_eq!(s, "$PUBX,40,RMC,1,1,1,1,0,0*47");
/// ```
pub fn pubx(kind: &str, fields: &[&str]) -> Result<String, EncodingError> {
    let mut body = String::from("PUBX,");
    body.push_str(check_field(kind)?);

    for field in fields {
        body.push(',');
        body.push_str(check_field(field)?);
    }

    Ok(format!("${}*{}", body, checksum::xor8_hex(body.as_bytes())))
}

/// Build the PUBX 40 rate-control sentence
///
/// `$PUBX,40,<nmea_type>,<i2c>,<uart>,<usb>,<spi>,0,0*XX`; each rate is a
/// non-negative output interval in seconds, 0 meaning disabled.
pub fn pubx_rate(
    nmea_type: &str,
    i2c: u32,
    uart: u32,
    usb: u32,
    spi: u32,
) -> Result<String, EncodingError> {
    pubx(
        "40",
        &[
            nmea_type,
            &i2c.to_string(),
            &uart.to_string(),
            &usb.to_string(),
            &spi.to_string(),
            "0",
            "0",
        ],
    )
}

fn check_field<'a>(field: &'a str) -> Result<&'a str, EncodingError> {
    match field.chars().find(|c| RESERVED.contains(c)) {
        Some(reserved) => Err(EncodingError::InvalidField {
            field: field.to_string(),
            reserved,
        }),
        None => Ok(field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pubx_rate_sentence() {
        let s = pubx_rate("RMC", 1, 1, 1, 1).unwrap();
        assert_eq!(s, "$PUBX,40,RMC,1,1,1,1,0,0*47");
    }

    #[test]
    fn pubx_rate_disable() {
        let s = pubx_rate("GLL", 1, 0, 0, 0).unwrap();
        assert_eq!(s, "$PUBX,40,GLL,1,0,0,0,0,0*5D");
    }

    #[test]
    fn pubx_checksum_always_verifies() {
        let s = pubx("00", &["0"]).unwrap();
        assert!(checksum::verify_sentence(&s));
    }

    #[test]
    fn rejects_reserved_characters() {
        for bad in ["RMC,GGA", "RM*C", "$RMC"] {
            let err = pubx("40", &[bad]).unwrap_err();
            assert!(matches!(err, EncodingError::InvalidField { .. }), "{bad}");
        }
        assert!(matches!(
            pubx("4,0", &[]),
            Err(EncodingError::InvalidField { .. })
        ));
    }
}
