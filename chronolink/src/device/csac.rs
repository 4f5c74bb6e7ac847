//! Chip-scale atomic clock session (Microsemi SA.45 family)

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::warn;

use chronolink_core::Response;
use chronolink_transport::Transport;
use chronolink_types::Baud;

use crate::device::{check_range, Instrument, SharedLink};
use crate::error::Result;
use crate::link::Link;

/// Frequency steering range in parts per 10^15
pub const STEER_RANGE_PPT: (i32, i32) = (-20_000_000, 20_000_000);

/// Session with a chip-scale atomic clock
///
/// The clock speaks a terse `!`-prefixed text dialect at 57 600 Bd with a
/// 100 ms reply window.
///
/// # Examples
///
/// ```no_run
/// use chronolink::{CsacDevice, SerialTransport, Baud};
///
/// #[tokio::main]
/// async fn main() -> chronolink::Result<()> {
///     let port = SerialTransport::open("/dev/ttyUSB0", Baud::new(57_600)?)?;
///     let clock = CsacDevice::open(Box::new(port)).await?;
///
///     println!("{}", clock.telemetry().await?.text());
///     clock.steer_absolute(1_500).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct CsacDevice {
    link: SharedLink,
}

impl CsacDevice {
    /// Initial baud rate for the family
    pub const BAUD: u32 = 57_600;

    /// Initial reply window for the family
    pub const TIMEOUT: Duration = Duration::from_millis(100);

    /// Open a session, applying the family's baud/timeout to the transport
    pub async fn open(transport: Box<dyn Transport>) -> Result<Self> {
        let baud = Baud::new(Self::BAUD)?;
        let link = Link::new(transport, baud, Self::TIMEOUT).await?;

        Ok(Self {
            link: Arc::new(Mutex::new(link)),
        })
    }

    /// Column headers for the telemetry report (`!6`)
    pub async fn telemetry_header(&self) -> Result<Response> {
        self.link.lock().await.query("!6").await
    }

    /// One telemetry report in CSV format (`!^`)
    pub async fn telemetry(&self) -> Result<Response> {
        self.link.lock().await.query("!^").await
    }

    /// Adjust the absolute operating frequency, in parts per 10^15
    pub async fn steer_absolute(&self, ppt: i32) -> Result<Response> {
        let (min, max) = STEER_RANGE_PPT;
        check_range(min, max, ppt)?;

        self.link.lock().await.query(&format!("!FD{ppt}")).await
    }

    /// Adjust the operating frequency relative to the current steer, in
    /// parts per 10^15
    pub async fn steer_relative(&self, ppt: i32) -> Result<Response> {
        let (min, max) = STEER_RANGE_PPT;
        check_range(min, max, ppt)?;

        self.link.lock().await.query(&format!("!FD{ppt}")).await
    }

    /// Commit the current steering value to non-volatile storage (`!FL`)
    ///
    /// The hardware supports a finite number of steering lock writes, so
    /// this is deliberately a separate method from the steer commands and
    /// is never retried.
    pub async fn latch_steer(&self) -> Result<()> {
        warn!("latching steer value to non-volatile storage");
        self.link.lock().await.exec("!FL").await
    }
}

impl Instrument for CsacDevice {
    fn link(&self) -> &SharedLink {
        &self.link
    }
}
