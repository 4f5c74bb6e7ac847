//! Serial transport over tokio-serial

use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chronolink_types::Baud;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, trace};

use crate::{error::*, Transport};

/// Default read timeout applied at open
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// Serial port transport
///
/// Keeps an internal receive buffer so that a read which pulls more than
/// one line off the wire loses nothing: the surplus is handed out by the
/// next `read_line`/`read_bytes` call.
pub struct SerialTransport {
    path: String,
    stream: SerialStream,
    buf: BytesMut,
    timeout: Duration,
}

impl SerialTransport {
    /// Open a serial port at the given path and rate
    pub fn open(path: impl Into<String>, baud: Baud) -> Result<Self> {
        let path = path.into();

        debug!("opening {} at {}", path, baud);

        let stream = tokio_serial::new(&path, baud.rate()).open_native_async()?;

        Ok(Self {
            path,
            stream,
            buf: BytesMut::with_capacity(4096),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Pull a complete line out of the receive buffer, if one is there
    fn take_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;

        let mut line = self.buf.split_to(pos + 1);
        line.truncate(pos);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// One buffered read with the configured timeout
    ///
    /// Returns `Ok(false)` when the timeout elapsed with no data.
    async fn fill(&mut self) -> Result<bool> {
        match timeout(self.timeout, self.stream.read_buf(&mut self.buf)).await {
            Err(_) => Ok(false),
            Ok(Ok(0)) => Err(Error::Closed),
            Ok(Ok(n)) => {
                trace!("received {} bytes from {}", n, self.path);
                Ok(true)
            }
            Ok(Err(e)) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn write(&mut self, bytes: &[u8]) -> Result<()> {
        trace!("sending {} bytes to {}", bytes.len(), self.path);

        self.stream.write_all(bytes).await?;
        self.stream.flush().await?;

        Ok(())
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = self.take_line() {
                trace!(line = %line, "received line");
                return Ok(Some(line));
            }

            // Partial line stays buffered; it may complete on a later call
            if !self.fill().await? {
                return Ok(None);
            }
        }
    }

    async fn read_bytes(&mut self) -> Result<Bytes> {
        if self.buf.is_empty() && !self.fill().await? {
            return Ok(Bytes::new());
        }

        Ok(self.buf.split().freeze())
    }

    async fn set_baud(&mut self, baud: Baud) -> Result<()> {
        // 0 is the "leave unchanged" table entry
        if baud.rate() != 0 {
            debug!("switching {} to {}", self.path, baud);
            self.stream.set_baud_rate(baud.rate())?;
        }
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    fn descriptor(&self) -> String {
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_missing_port_fails() {
        let result = SerialTransport::open("/dev/ttyDOESNOTEXIST", Baud::new(9600).unwrap());
        assert!(result.is_err());
    }

    // Tests against real hardware live behind #[ignore]; the protocol
    // behavior is covered with scripted transports in the device crate.
}
