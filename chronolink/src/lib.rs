//! # chronolink
//!
//! Async command/response sessions for laboratory time-and-frequency
//! instruments over serial: GPS-disciplined oscillators, chip-scale
//! atomic clocks, and GNSS receivers.
//!
//! ## Features
//!
//! - SCPI-style text queries with idle-timeout response collection
//! - NMEA/PUBX sentences with XOR-8 checksums
//! - Binary length-prefixed frames with dual-accumulator checksums
//! - Protocol capabilities fixed at the type level per instrument
//! - Unsolicited broadcast sentences buffered, never lost
//!
//! ## Quick Start
//!
//! ```no_run
//! use chronolink::{GpsdoDevice, ScpiOps, SerialTransport, Baud};
//!
//! #[tokio::main]
//! async fn main() -> chronolink::Result<()> {
//!     // Open the serial port and start a session
//!     let port = SerialTransport::open("/dev/ttyUSB0", Baud::new(115_200)?)?;
//!     let gpsdo = GpsdoDevice::open(Box::new(port)).await?;
//!
//!     // Identify the instrument
//!     let id = gpsdo.idn().await?;
//!     println!("{id}");
//!
//!     // Lock state and disciplining health
//!     println!("locked: {}", gpsdo.locked().await?);
//!     println!("health: {:?}", gpsdo.health().await?);
//!
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod link;

// Re-exports
pub use device::{
    CsacDevice, GnssReceiver, GpsdoDevice, Instrument, NmeaCapable, NmeaOps, ScpiCapable,
    ScpiOps, UbxCapable, UbxOps,
};
pub use error::{Error, Result};
pub use link::Link;

// Re-export types
pub use chronolink_core::{DrainPolicy, Frame, Response};
pub use chronolink_transport::{SerialTransport, Transport};
pub use chronolink_types::{Baud, Identification, SyncHealth};
