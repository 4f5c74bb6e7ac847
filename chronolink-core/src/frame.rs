//! Binary frame structure and encoding/decoding (UBX dialect)

use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    checksum,
    constants::{FRAME_CHECKSUM_SIZE, FRAME_HEADER_SIZE, MAX_PAYLOAD_SIZE, SYNC_1, SYNC_2},
    error::{EncodingError, FramingError},
};

/// One binary protocol frame
///
/// # Wire format
///
/// ```text
/// ┌───────┬───────┬───────┬───────┬───────────┬───────────┬────────┬────────┐
/// │ sync1 │ sync2 │ class │  id   │  len_lo   │  len_hi   │payload │ ck_a/b │
/// │ 0xB5  │ 0x62  │  u8   │  u8   │ u16 little-endian     │ N bytes│ 2 bytes│
/// └───────┴───────┴───────┴───────┴───────────┴───────────┴────────┴────────┘
/// ```
///
/// The length field counts payload bytes only. The checksum is the
/// dual-accumulator sum over `class, id, len, payload` — sync excluded —
/// and is always appended last.
///
/// # Examples
///
/// ```
/// use chronolink_core::Frame;
///
/// let poll = Frame::new(0x0A, 0x04, vec![]);
/// let encoded = poll.encode().unwrap();
/// assert_eq!(&encoded[..], &[0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message class
    pub class: u8,

    /// Message id within the class
    pub id: u8,

    /// Frame payload (message-specific data)
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame
    pub fn new(class: u8, id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            class,
            id,
            payload: payload.into(),
        }
    }

    /// Checksum over the `class, id, len, payload` span of this frame
    pub fn checksum(&self) -> (u8, u8) {
        let mut span = Vec::with_capacity(4 + self.payload.len());
        span.push(self.class);
        span.push(self.id);
        span.extend_from_slice(&(self.payload.len() as u16).to_le_bytes());
        span.extend_from_slice(&self.payload);
        checksum::fletcher(&span)
    }

    /// Encode the frame to wire bytes
    ///
    /// # Errors
    ///
    /// Fails only when the payload exceeds the 16-bit length field.
    pub fn encode(&self) -> Result<BytesMut, EncodingError> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(EncodingError::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let total = FRAME_HEADER_SIZE + self.payload.len() + FRAME_CHECKSUM_SIZE;
        let mut buf = BytesMut::with_capacity(total);

        buf.put_u8(SYNC_1);
        buf.put_u8(SYNC_2);
        buf.put_u8(self.class);
        buf.put_u8(self.id);
        buf.put_u16_le(self.payload.len() as u16);
        buf.put_slice(&self.payload);

        let (ck_a, ck_b) = self.checksum();
        buf.put_u8(ck_a);
        buf.put_u8(ck_b);

        Ok(buf)
    }

    /// Decode one frame from a receive buffer
    ///
    /// Leading bytes that are not part of a frame (for instance an
    /// unsolicited text sentence interleaved before the binary reply) are
    /// skipped while scanning for the sync pair. On success returns the
    /// frame and the number of bytes consumed from the front of `buf`,
    /// including any skipped prefix.
    ///
    /// # Errors
    ///
    /// - [`FramingError::SyncNotFound`] — no sync pair anywhere in `buf`
    /// - [`FramingError::Incomplete`] — a frame has started but more bytes
    ///   are required; callers keep reading until their timeout elapses
    /// - [`FramingError::ChecksumMismatch`] — the frame is complete but
    ///   corrupt, and must be discarded
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), FramingError> {
        let start = find_sync(buf)?;
        let frame = &buf[start..];

        if frame.len() < FRAME_HEADER_SIZE {
            return Err(FramingError::Incomplete {
                have: frame.len(),
                need: FRAME_HEADER_SIZE,
            });
        }

        let class = frame[2];
        let id = frame[3];
        let len = LittleEndian::read_u16(&frame[4..6]) as usize;
        let total = FRAME_HEADER_SIZE + len + FRAME_CHECKSUM_SIZE;

        if frame.len() < total {
            return Err(FramingError::Incomplete {
                have: frame.len(),
                need: total,
            });
        }

        let span = &frame[2..FRAME_HEADER_SIZE + len];
        let expected = checksum::fletcher(span);
        let received = (frame[total - 2], frame[total - 1]);

        if expected != received {
            return Err(FramingError::ChecksumMismatch { expected, received });
        }

        let decoded = Self::new(class, id, frame[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + len].to_vec());
        Ok((decoded, start + total))
    }

    /// Total encoded size of this frame
    pub fn size(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len() + FRAME_CHECKSUM_SIZE
    }
}

/// Position of the first sync pair in `buf`
///
/// A trailing lone `0xB5` counts as the start of a possibly-split pair and
/// reports `Incomplete` rather than `SyncNotFound`.
fn find_sync(buf: &[u8]) -> Result<usize, FramingError> {
    for (i, window) in buf.windows(2).enumerate() {
        if window == [SYNC_1, SYNC_2] {
            return Ok(i);
        }
    }

    if buf.last() == Some(&SYNC_1) {
        return Err(FramingError::Incomplete {
            have: 1,
            need: FRAME_HEADER_SIZE,
        });
    }

    Err(FramingError::SyncNotFound(buf.len()))
}

/// Render frame bytes as backslash-escaped lowercase hex (`\xNN` per byte)
///
/// Used with transports that only accept textual writes. The escaping is
/// lossless; [`from_wire_text`] is its exact inverse.
pub fn to_wire_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for byte in bytes {
        out.push_str("\\x");
        out.push_str(&hex::encode([*byte]));
    }
    out
}

/// Parse a `\xNN\xNN...` string back into bytes
///
/// # Errors
///
/// Fails with the character offset of the first group that is not a
/// backslash, an `x`, and two hex digits.
pub fn from_wire_text(text: &str) -> Result<Vec<u8>, FramingError> {
    let raw = text.as_bytes();
    let mut out = Vec::with_capacity(raw.len() / 4);
    let mut i = 0;

    while i < raw.len() {
        if raw.len() - i < 4 || raw[i] != b'\\' || raw[i + 1] != b'x' {
            return Err(FramingError::MalformedWireText(i));
        }
        let digits = std::str::from_utf8(&raw[i + 2..i + 4])
            .map_err(|_| FramingError::MalformedWireText(i + 2))?;
        let byte =
            u8::from_str_radix(digits, 16).map_err(|_| FramingError::MalformedWireText(i + 2))?;
        out.push(byte);
        i += 4;
    }

    Ok(out)
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("class", &format!("0x{:02X}", self.class))
            .field("id", &format!("0x{:02X}", self.id))
            .field("payload_len", &self.payload.len())
            .field("checksum", &format!("{:02X?}", self.checksum()))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[class=0x{:02X}, id=0x{:02X}, len={}]",
            self.class,
            self.id,
            self.payload.len()
        )
    }
}
