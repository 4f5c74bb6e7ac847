//! End-to-end device session tests over a fake serial transport

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use chronolink::{
    Baud, CsacDevice, Error, GnssReceiver, GpsdoDevice, NmeaOps, ScpiOps, Transport, UbxOps,
};
use chronolink_core::FramingError;

/// Writes observed on the wire, shared with the test body
type WriteLog = Arc<Mutex<Vec<Vec<u8>>>>;

/// Transport fed from fixed scripts of line and byte reads
struct FakePort {
    lines: VecDeque<Option<String>>,
    chunks: VecDeque<Bytes>,
    writes: WriteLog,
}

impl FakePort {
    fn lines(script: impl IntoIterator<Item = Option<&'static str>>) -> (Self, WriteLog) {
        let writes = WriteLog::default();
        let port = Self {
            lines: script.into_iter().map(|l| l.map(str::to_string)).collect(),
            chunks: VecDeque::new(),
            writes: Arc::clone(&writes),
        };
        (port, writes)
    }

    fn bytes(script: impl IntoIterator<Item = Bytes>) -> (Self, WriteLog) {
        let writes = WriteLog::default();
        let port = Self {
            lines: VecDeque::new(),
            chunks: script.into_iter().collect(),
            writes: Arc::clone(&writes),
        };
        (port, writes)
    }
}

#[async_trait]
impl Transport for FakePort {
    async fn write(&mut self, bytes: &[u8]) -> chronolink_transport::Result<()> {
        self.writes.lock().push(bytes.to_vec());
        Ok(())
    }

    async fn read_line(&mut self) -> chronolink_transport::Result<Option<String>> {
        Ok(self.lines.pop_front().flatten())
    }

    async fn read_bytes(&mut self) -> chronolink_transport::Result<Bytes> {
        Ok(self.chunks.pop_front().unwrap_or_default())
    }

    async fn set_baud(&mut self, _baud: Baud) -> chronolink_transport::Result<()> {
        Ok(())
    }

    fn set_timeout(&mut self, _timeout: Duration) {}

    fn descriptor(&self) -> String {
        "fake".into()
    }
}

#[tokio::test]
async fn steer_out_of_range_writes_nothing() {
    let (port, writes) = FakePort::lines([]);
    let clock = CsacDevice::open(Box::new(port)).await.unwrap();

    let err = clock.steer_absolute(20_000_001).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(writes.lock().is_empty());
}

#[tokio::test]
async fn steer_at_range_boundary_writes_once() {
    let (port, writes) = FakePort::lines([Some("!FD20000000"), Some("Steer = 20000000"), None]);
    let clock = CsacDevice::open(Box::new(port)).await.unwrap();

    let reply = clock.steer_absolute(20_000_000).await.unwrap();
    assert_eq!(reply.lines(), ["Steer = 20000000"]);

    let writes = writes.lock();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0], b"!FD20000000\r\n");
}

#[tokio::test]
async fn broadcast_sentences_never_pollute_the_answer() {
    let (port, _) = FakePort::lines([
        Some("SYNC?"),
        Some("$GPGGA,123519,4807.038,N*41"),
        Some("$GPRMC,123519,A*00"),
        Some("GPS, AUTO, LOCKED"),
        None,
    ]);
    let gpsdo = GpsdoDevice::open(Box::new(port)).await.unwrap();

    let status = gpsdo.sync_status().await.unwrap();
    assert_eq!(status.lines(), ["GPS, AUTO, LOCKED"]);

    let sentences = gpsdo.drain_sentences().await;
    assert_eq!(
        sentences,
        ["$GPGGA,123519,4807.038,N*41", "$GPRMC,123519,A*00"]
    );

    // A second drain finds nothing: the first one cleared the buffer
    assert!(gpsdo.drain_sentences().await.is_empty());
}

#[tokio::test]
async fn rate_commands_carry_the_checksummed_sentence() {
    let (port, writes) = FakePort::lines([None]);
    let receiver = GnssReceiver::open(Box::new(port)).await.unwrap();

    receiver.set_sentence_rate("GLL", 1, 0, 0, 0).await.unwrap();

    let writes = writes.lock();
    assert_eq!(writes.len(), 1);
    // Golden checksum from the receiver protocol description
    assert_eq!(writes[0], b"$PUBX,40,GLL,1,0,0,0,0,0*5D\r\n");
}

#[tokio::test]
async fn rate_above_limit_is_rejected_locally() {
    let (port, writes) = FakePort::lines([]);
    let gpsdo = GpsdoDevice::open(Box::new(port)).await.unwrap();

    let err = gpsdo.set_gpgga_rate(256).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(writes.lock().is_empty());
}

#[tokio::test]
async fn version_poll_reassembles_a_split_frame() {
    let reply = chronolink::Frame::new(0x0A, 0x04, &b"7.03 (45969)"[..]);
    let encoded = reply.encode().unwrap();
    let (head, tail) = encoded.split_at(5);

    let (port, writes) = FakePort::bytes([
        Bytes::copy_from_slice(head),
        Bytes::copy_from_slice(tail),
    ]);
    let receiver = GnssReceiver::open(Box::new(port)).await.unwrap();

    let frame = receiver.mon_ver().await.unwrap();
    assert_eq!(frame, reply);

    let writes = writes.lock();
    assert_eq!(writes.len(), 1);
    // MON-VER poll with its fixed checksum
    assert_eq!(writes[0], [0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34]);
}

#[tokio::test]
async fn corrupt_frame_fails_the_poll() {
    let mut encoded = chronolink::Frame::new(0x0A, 0x09, vec![1, 2, 3, 4])
        .encode()
        .unwrap()
        .to_vec();
    let last = encoded.len() - 1;
    encoded[last] ^= 0x01;

    let (port, _) = FakePort::bytes([Bytes::from(encoded)]);
    let receiver = GnssReceiver::open(Box::new(port)).await.unwrap();

    let err = receiver.mon_hw().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Core(chronolink_core::Error::Framing(
            FramingError::ChecksumMismatch { .. }
        ))
    ));
}

#[tokio::test]
async fn silent_line_times_out_as_incomplete() {
    let (port, _) = FakePort::bytes([]);
    let receiver = GnssReceiver::open(Box::new(port)).await.unwrap();

    let err = receiver.mon_ver().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Core(chronolink_core::Error::Framing(FramingError::Incomplete {
            have: 0,
            ..
        }))
    ));
}

/// Transport that answers each command with its echo and a tagged reply,
/// so crossed answers are detectable
struct Echoing {
    pending: VecDeque<Option<String>>,
    writes: WriteLog,
}

#[async_trait]
impl Transport for Echoing {
    async fn write(&mut self, bytes: &[u8]) -> chronolink_transport::Result<()> {
        let command = String::from_utf8_lossy(bytes).trim().to_string();
        self.pending.push_back(Some(command.clone()));
        self.pending.push_back(Some(format!("reply to {command}")));
        self.pending.push_back(None);
        self.writes.lock().push(bytes.to_vec());
        Ok(())
    }

    async fn read_line(&mut self) -> chronolink_transport::Result<Option<String>> {
        Ok(self.pending.pop_front().flatten())
    }

    async fn read_bytes(&mut self) -> chronolink_transport::Result<Bytes> {
        Ok(Bytes::new())
    }

    async fn set_baud(&mut self, _baud: Baud) -> chronolink_transport::Result<()> {
        Ok(())
    }

    fn set_timeout(&mut self, _timeout: Duration) {}

    fn descriptor(&self) -> String {
        "echoing".into()
    }
}

#[tokio::test]
async fn concurrent_queries_never_interleave() {
    let port = Echoing {
        pending: VecDeque::new(),
        writes: WriteLog::default(),
    };
    let gpsdo = GpsdoDevice::open(Box::new(port)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let device = gpsdo.clone();
        handles.push(tokio::spawn(async move {
            let command = format!("QUERY:{i}?");
            let response = device.query(&command).await.unwrap();
            assert_eq!(response.lines(), [format!("reply to {command}")]);
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}
