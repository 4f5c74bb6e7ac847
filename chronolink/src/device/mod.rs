//! Instrument sessions and protocol capabilities
//!
//! Every session owns one [`Link`] behind a FIFO mutex, so concurrent
//! callers queue for the write→drain critical section in arrival order.
//! Protocol capabilities are fixed at the type level: a session opts into
//! a marker trait (`ScpiCapable`, `NmeaCapable`, `UbxCapable`) and the
//! corresponding operations arrive through a blanket impl. Calling an
//! operation a device was not built with is a compile error, not a
//! runtime one.

pub mod csac;
pub mod gnss;
pub mod gpsdo;

pub use csac::CsacDevice;
pub use gnss::GnssReceiver;
pub use gpsdo::GpsdoDevice;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use chronolink_core::{constants::ubx, sentence, Frame, Response};
use chronolink_types::{Identification, ValidationError};

use crate::error::Result;
use crate::link::Link;

/// A link shared by cloned session handles; the mutex spans each full
/// command/response cycle
pub type SharedLink = Arc<Mutex<Link>>;

/// Anchor for every instrument session
pub trait Instrument: Send + Sync {
    /// The session's one link
    fn link(&self) -> &SharedLink;
}

/// Marker: the instrument answers SCPI-style text queries
pub trait ScpiCapable: Instrument {}

/// Marker: the instrument emits NMEA sentences and accepts PUBX
/// configuration sentences
pub trait NmeaCapable: Instrument {}

/// Marker: the instrument speaks the binary length-prefixed protocol
pub trait UbxCapable: Instrument {}

/// Operations available on every SCPI-capable instrument
#[async_trait]
pub trait ScpiOps: ScpiCapable {
    /// Identify the instrument (`*IDN?`)
    ///
    /// Reply format: `<manufacturer>, <model>, <serial number>, <firmware>`.
    async fn idn(&self) -> Result<Identification> {
        let response = self.query("*IDN?").await?;
        Ok(Identification::parse(response.first().unwrap_or_default())?)
    }

    /// Issue an arbitrary query and collect its answer lines
    async fn query(&self, command: &str) -> Result<Response> {
        self.link().lock().await.query(command).await
    }

    /// Issue a query using the command echo as the completion signal
    async fn query_matched(&self, command: &str) -> Result<Response> {
        self.link().lock().await.query_matched(command).await
    }

    /// Issue a command that produces no answer
    async fn exec(&self, command: &str) -> Result<()> {
        self.link().lock().await.exec(command).await
    }
}

impl<T: ScpiCapable> ScpiOps for T {}

/// Operations available on every NMEA-capable instrument
#[async_trait]
pub trait NmeaOps: NmeaCapable {
    /// Set the output interval of an NMEA sentence type on each port via
    /// PUBX 40
    ///
    /// Rates are in seconds, 0 meaning disabled.
    async fn set_sentence_rate(
        &self,
        nmea_type: &str,
        i2c: u32,
        uart: u32,
        usb: u32,
        spi: u32,
    ) -> Result<()> {
        let sentence = sentence::pubx_rate(nmea_type, i2c, uart, usb, spi)?;
        self.link().lock().await.exec(&sentence).await
    }

    /// Unsolicited sentences observed while other commands were serviced,
    /// in arrival order; the buffer is cleared
    async fn drain_sentences(&self) -> Vec<String> {
        self.link().lock().await.drain_sentences()
    }
}

impl<T: NmeaCapable> NmeaOps for T {}

/// Operations available on every binary-capable instrument
#[async_trait]
pub trait UbxOps: UbxCapable {
    /// Poll a zero-payload message and return the reply frame
    async fn poll(&self, class: u8, id: u8) -> Result<Frame> {
        self.link()
            .lock()
            .await
            .query_frame(&Frame::new(class, id, vec![]))
            .await
    }

    /// Firmware/hardware version and extensions (`MON-VER`)
    async fn mon_ver(&self) -> Result<Frame> {
        self.poll(ubx::CLASS_MON, ubx::ID_MON_VER).await
    }

    /// Hardware status (`MON-HW`)
    async fn mon_hw(&self) -> Result<Frame> {
        self.poll(ubx::CLASS_MON, ubx::ID_MON_HW).await
    }
}

impl<T: UbxCapable> UbxOps for T {}

/// Validate a settable numeric parameter against its documented closed
/// range; nothing is written when this fails
pub(crate) fn check_range<T>(min: T, max: T, got: T) -> std::result::Result<(), ValidationError>
where
    T: PartialOrd + Copy + Into<f64>,
{
    if got < min || got > max {
        Err(ValidationError::OutOfRange {
            min: min.into(),
            max: max.into(),
            got: got.into(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_range_boundaries() {
        assert!(check_range(-20_000_000, 20_000_000, 20_000_000).is_ok());
        assert!(check_range(-20_000_000, 20_000_000, -20_000_000).is_ok());

        let err = check_range(-20_000_000, 20_000_000, 20_000_001).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                min: -20_000_000.0,
                max: 20_000_000.0,
                got: 20_000_001.0,
            }
        );
    }

    #[test]
    fn check_range_floats() {
        assert!(check_range(0.0, 500.0, 0.7).is_ok());
        assert!(check_range(-10.0, 10.0, 10.01).is_err());
    }
}
