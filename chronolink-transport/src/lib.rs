//! Transport layer for instrument links
//!
//! The protocol core never touches the wire directly; it drives one of
//! these byte-oriented transports. A transport owns the physical resource
//! and its last-applied baud/timeout settings. How a port name is
//! discovered is out of scope here.

pub mod error;
pub mod serial;

pub use error::{Error, Result};
pub use serial::SerialTransport;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chronolink_types::Baud;

/// Byte transport for one instrument
///
/// `read_line`/`read_bytes` block up to the currently configured timeout;
/// "nothing arrived" is reported as `None`/empty rather than as an error,
/// because for these instruments an idle line is the only end-of-response
/// signal.
#[async_trait]
pub trait Transport: Send {
    /// Write raw bytes to the device
    async fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read one line of text, without its terminator
    ///
    /// Returns `None` when the timeout elapses with no complete line
    /// available.
    async fn read_line(&mut self) -> Result<Option<String>>;

    /// Read whatever raw bytes are available
    ///
    /// Returns an empty buffer when the timeout elapses with no data.
    async fn read_bytes(&mut self) -> Result<Bytes>;

    /// Apply a validated baud rate to the physical port
    async fn set_baud(&mut self, baud: Baud) -> Result<()>;

    /// Set the read timeout used by subsequent reads
    fn set_timeout(&mut self, timeout: Duration);

    /// Human-readable resource name for logs
    fn descriptor(&self) -> String;
}
