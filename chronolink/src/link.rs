//! The command/response cycle for one instrument
//!
//! A [`Link`] owns exactly one transport. Every command runs as a single
//! write→drain cycle: nothing else may read the transport, and a second
//! command must not write while a prior drain is still consuming its
//! answer — the serial line has no multiplexing. Devices therefore keep
//! their `Link` behind a FIFO `tokio::sync::Mutex` and hold it across the
//! whole cycle.

use std::time::Duration;

use bytes::BytesMut;
use tracing::{debug, trace, warn};

use chronolink_core::{
    classify, frame, Frame, DrainPolicy, FramingError, LineClass, Response, SentenceBuffer,
};
use chronolink_transport::Transport;
use chronolink_types::Baud;

use crate::error::Result;

/// One instrument session: transport, settings, and the unsolicited
/// sentence buffer
///
/// Baud and timeout hold the last values applied to the transport; they
/// are never re-queried from hardware. Both may only change between
/// command cycles, since applying them mid-drain would change transport
/// behavior non-deterministically — the owning mutex guarantees that.
pub struct Link {
    transport: Box<dyn Transport>,
    sentences: SentenceBuffer,
    baud: Baud,
    timeout: Duration,
    idle_limit: u32,
}

impl Link {
    /// Create a link and apply the instrument family's initial settings to
    /// the transport before any command is issued
    pub async fn new(
        mut transport: Box<dyn Transport>,
        baud: Baud,
        timeout: Duration,
    ) -> Result<Self> {
        transport.set_baud(baud).await?;
        transport.set_timeout(timeout);

        debug!("link up on {} at {}", transport.descriptor(), baud);

        Ok(Self {
            transport,
            sentences: SentenceBuffer::new(),
            baud,
            timeout,
            idle_limit: 0,
        })
    }

    /// Last baud rate applied to the transport
    pub fn baud(&self) -> Baud {
        self.baud
    }

    /// Last read timeout applied to the transport
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Apply a new baud rate
    pub async fn set_baud(&mut self, baud: Baud) -> Result<()> {
        self.transport.set_baud(baud).await?;
        self.baud = baud;
        Ok(())
    }

    /// Apply a new read timeout
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.transport.set_timeout(timeout);
        self.timeout = timeout;
    }

    /// Extra consecutive idle timeouts tolerated before a drain concludes
    ///
    /// 0 means the first empty read ends the response. Raising this trades
    /// latency for robustness against instruments that pause mid-reply.
    pub fn set_idle_limit(&mut self, idle_limit: u32) {
        self.idle_limit = idle_limit;
    }

    /// Issue a query: encode, write, drain with the command echo dropped
    pub async fn query(&mut self, command: &str) -> Result<Response> {
        self.query_with(command, DrainPolicy::query()).await
    }

    /// Issue a query awaiting the command echo before trusting the answer
    ///
    /// A stronger completion signal than the idle timeout, for instruments
    /// with serial echo enabled.
    pub async fn query_matched(&mut self, command: &str) -> Result<Response> {
        self.query_with(command, DrainPolicy::query().with_echo(command))
            .await
    }

    /// Issue a query under an explicit drain policy
    pub async fn query_with(&mut self, command: &str, policy: DrainPolicy) -> Result<Response> {
        self.send_line(command).await?;
        self.drain(policy).await
    }

    /// Issue a fire-and-forget command
    ///
    /// The drain still runs so the command echo cannot leak into the next
    /// command's answer; any unexpected reply lines are logged and
    /// discarded, never buffered.
    pub async fn exec(&mut self, command: &str) -> Result<()> {
        self.send_line(command).await?;
        self.drain(DrainPolicy::command()).await?;
        Ok(())
    }

    /// Write one text line (terminator appended)
    async fn send_line(&mut self, command: &str) -> Result<()> {
        debug!(command = %command, "sending");

        let mut wire = command.as_bytes().to_vec();
        wire.extend_from_slice(b"\r\n");
        self.transport.write(&wire).await?;

        Ok(())
    }

    /// Read lines until the termination policy fires
    ///
    /// Lines starting with `$` go to the sentence buffer and neither count
    /// toward the answer nor reset the done condition's meaning; prompt
    /// and banner lines are dropped. The drain ends after `idle_limit + 1`
    /// consecutive empty reads — the only end-of-response signal these
    /// instruments provide, unless the policy awaits a command echo first.
    async fn drain(&mut self, policy: DrainPolicy) -> Result<Response> {
        let idle_limit = policy.idle_limit.max(self.idle_limit);
        let mut lines: Vec<String> = Vec::new();
        let mut idle = 0u32;
        let mut awaiting_echo = policy.echo.clone();
        let mut discard_first = policy.discard_first;

        loop {
            match self.transport.read_line().await? {
                Some(line) => {
                    idle = 0;

                    match classify(&line) {
                        LineClass::Unsolicited => {
                            trace!(sentence = %line, "buffering unsolicited sentence");
                            self.sentences.push(line.trim().to_string())?;
                        }
                        LineClass::Prompt => {}
                        LineClass::Answer => {
                            if let Some(echo) = &awaiting_echo {
                                if line.contains(echo.as_str()) {
                                    awaiting_echo = None;
                                    discard_first = false;
                                }
                                continue;
                            }
                            if discard_first {
                                discard_first = false;
                                continue;
                            }
                            lines.push(line);
                        }
                    }
                }
                None => {
                    if idle >= idle_limit {
                        break;
                    }
                    idle += 1;
                }
            }
        }

        if policy.expect_empty && !lines.is_empty() {
            warn!(
                discarded = lines.len(),
                response = %lines.join("\n"),
                "discarding response to a command that expects none"
            );
            lines.clear();
        }

        Ok(Response::from_lines(lines))
    }

    /// Issue a binary query: encode, write, reassemble one frame
    pub async fn query_frame(&mut self, request: &Frame) -> Result<Frame> {
        let encoded = request.encode()?;
        trace!(frame = %request, wire = %frame::to_wire_text(&encoded), "sending frame");

        self.transport.write(&encoded).await?;
        self.drain_frame().await
    }

    /// Accumulate raw bytes until one complete, checksum-verified frame
    /// can be parsed, or the timeout elapses mid-frame
    ///
    /// Text sentences interleaved ahead of the binary reply are routed to
    /// the sentence buffer like in the line drain. A checksum mismatch
    /// fails the query; the frame is discarded and never retried here,
    /// since resending a command with side effects could double-apply it.
    async fn drain_frame(&mut self) -> Result<Frame> {
        let mut buf = BytesMut::new();

        loop {
            let chunk = self.transport.read_bytes().await?;

            if chunk.is_empty() {
                if buf.is_empty() {
                    return Err(FramingError::Incomplete {
                        have: 0,
                        need: chronolink_core::constants::FRAME_HEADER_SIZE,
                    }
                    .into());
                }

                // Timeout: whatever we have is not a full frame
                return match Frame::decode(&buf) {
                    Ok((frame, consumed)) => {
                        self.buffer_text_prefix(&buf[..consumed - frame.size()])?;
                        Ok(frame)
                    }
                    Err(e) => Err(e.into()),
                };
            }

            buf.extend_from_slice(&chunk);

            match Frame::decode(&buf) {
                Ok((frame, consumed)) => {
                    trace!(frame = %frame, "received frame");
                    self.buffer_text_prefix(&buf[..consumed - frame.size()])?;
                    return Ok(frame);
                }
                Err(FramingError::Incomplete { .. }) | Err(FramingError::SyncNotFound(_)) => {
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Route `$`-prefixed lines skipped ahead of a binary frame into the
    /// sentence buffer
    fn buffer_text_prefix(&mut self, prefix: &[u8]) -> Result<()> {
        if prefix.is_empty() {
            return Ok(());
        }

        for line in String::from_utf8_lossy(prefix).lines() {
            let line = line.trim();
            if line.starts_with('$') {
                self.sentences.push(line.to_string())?;
            }
        }

        Ok(())
    }

    /// Drain the unsolicited sentences observed so far, in arrival order
    pub fn drain_sentences(&mut self) -> Vec<String> {
        self.sentences.drain_all()
    }

    /// Number of unsolicited sentences currently buffered
    pub fn buffered_sentences(&self) -> usize {
        self.sentences.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Transport fed from a script of read results
    struct Scripted {
        reads: VecDeque<Option<String>>,
        writes: Vec<Vec<u8>>,
    }

    impl Scripted {
        fn new(reads: impl IntoIterator<Item = Option<&'static str>>) -> Self {
            Self {
                reads: reads
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
                writes: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        async fn write(&mut self, bytes: &[u8]) -> chronolink_transport::Result<()> {
            self.writes.push(bytes.to_vec());
            Ok(())
        }

        async fn read_line(&mut self) -> chronolink_transport::Result<Option<String>> {
            Ok(self.reads.pop_front().flatten())
        }

        async fn read_bytes(&mut self) -> chronolink_transport::Result<Bytes> {
            Ok(Bytes::new())
        }

        async fn set_baud(&mut self, _baud: Baud) -> chronolink_transport::Result<()> {
            Ok(())
        }

        fn set_timeout(&mut self, _timeout: Duration) {}

        fn descriptor(&self) -> String {
            "scripted".into()
        }
    }

    async fn link_with(reads: impl IntoIterator<Item = Option<&'static str>>) -> Link {
        Link::new(
            Box::new(Scripted::new(reads)),
            Baud::new(115_200).unwrap(),
            Duration::from_millis(100),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn query_discards_echo_and_keeps_answer() {
        let mut link = link_with([Some("PTIME?"), Some("2016,4,28"), None]).await;

        let response = link.query("PTIME?").await.unwrap();
        assert_eq!(response.lines(), ["2016,4,28"]);
    }

    #[tokio::test]
    async fn unsolicited_sentences_go_to_buffer() {
        let mut link = link_with([
            Some("SYNC?"),
            Some("$GPGGA,one*00"),
            Some("$GPGGA,two*00"),
            Some("OK"),
            None,
        ])
        .await;

        let response = link.query("SYNC?").await.unwrap();
        assert_eq!(response.lines(), ["OK"]);
        assert_eq!(link.drain_sentences(), ["$GPGGA,one*00", "$GPGGA,two*00"]);
        assert!(link.drain_sentences().is_empty());
    }

    #[tokio::test]
    async fn empty_reply_is_a_valid_response() {
        let mut link = link_with([None]).await;

        let response = link.query("GPS?").await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn idle_limit_survives_a_pause() {
        let mut link = link_with([
            Some("SYST:STAT?"),
            Some("first"),
            None, // instrument pauses mid-reply
            Some("second"),
            None,
            None,
        ])
        .await;
        link.set_idle_limit(1);

        let response = link.query("SYST:STAT?").await.unwrap();
        assert_eq!(response.lines(), ["first", "second"]);
    }

    #[tokio::test]
    async fn echo_matching_drops_stale_lines() {
        // A late line from a previous exchange sits in front of the echo
        let mut link = link_with([
            Some("stale answer"),
            Some("SYNC:FEE?"),
            Some("-1.2E-11"),
            None,
        ])
        .await;

        let response = link.query_matched("SYNC:FEE?").await.unwrap();
        assert_eq!(response.lines(), ["-1.2E-11"]);
    }

    #[tokio::test]
    async fn exec_consumes_and_discards_leftovers() {
        let mut link = link_with([Some("SYNC:IMME"), Some("spurious"), None]).await;

        link.exec("SYNC:IMME").await.unwrap();

        // The leftover line was consumed, not buffered as a sentence
        assert_eq!(link.buffered_sentences(), 0);
    }

    #[tokio::test]
    async fn prompt_lines_are_dropped() {
        let mut link = link_with([Some("*IDN?"), Some("scpi>"), Some("a, b, c, d"), None]).await;

        let response = link.query("*IDN?").await.unwrap();
        assert_eq!(response.lines(), ["a, b, c, d"]);
    }
}
