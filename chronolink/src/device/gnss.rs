//! GNSS receiver session (u-blox family)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use chronolink_transport::Transport;
use chronolink_types::Baud;

use crate::device::{Instrument, NmeaCapable, SharedLink, UbxCapable};
use crate::error::Result;
use crate::link::Link;

/// Session with a standalone GNSS receiver
///
/// The receiver speaks NMEA text (plus proprietary PUBX sentences) and
/// the binary length-prefixed protocol over the same line, at 9600 Bd
/// with a 1 s reply window.
///
/// # Examples
///
/// ```no_run
/// use chronolink::{GnssReceiver, NmeaOps, SerialTransport, UbxOps, Baud};
///
/// #[tokio::main]
/// async fn main() -> chronolink::Result<()> {
///     let port = SerialTransport::open("/dev/ttyACM0", Baud::new(9_600)?)?;
///     let receiver = GnssReceiver::open(Box::new(port)).await?;
///
///     // One GPGGA sentence per second on the UART, nothing elsewhere
///     receiver.set_sentence_rate("GGA", 0, 1, 0, 0).await?;
///
///     let version = receiver.mon_ver().await?;
///     println!("{version}");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct GnssReceiver {
    link: SharedLink,
}

impl GnssReceiver {
    /// Initial baud rate for the family
    pub const BAUD: u32 = 9_600;

    /// Initial reply window for the family
    pub const TIMEOUT: Duration = Duration::from_millis(1_000);

    /// Open a session, applying the family's baud/timeout to the transport
    pub async fn open(transport: Box<dyn Transport>) -> Result<Self> {
        let baud = Baud::new(Self::BAUD)?;
        let link = Link::new(transport, baud, Self::TIMEOUT).await?;

        Ok(Self {
            link: Arc::new(Mutex::new(link)),
        })
    }
}

impl Instrument for GnssReceiver {
    fn link(&self) -> &SharedLink {
        &self.link
    }
}

impl NmeaCapable for GnssReceiver {}
impl UbxCapable for GnssReceiver {}
