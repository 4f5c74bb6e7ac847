//! Error types for chronolink-core

/// Result type alias for core protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building an outbound command.
///
/// These always indicate a programming error at the call site and are
/// never retried.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodingError {
    /// A sentence field contains a character reserved by the framing
    #[error("field {field:?} contains reserved character {reserved:?}")]
    InvalidField {
        field: String,
        reserved: char,
    },

    /// Binary payload exceeds the 16-bit length field
    #[error("payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },
}

/// Errors raised while reassembling an inbound binary frame.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FramingError {
    /// Timeout elapsed before a complete frame arrived
    #[error("incomplete frame: have {have} bytes, need {need}")]
    Incomplete {
        have: usize,
        need: usize,
    },

    /// Sync pair never found in the received bytes
    #[error("sync bytes not found in {0} received bytes")]
    SyncNotFound(usize),

    /// Checksum verification failed; the frame is discarded
    #[error("checksum mismatch: expected {expected:02X?}, received {received:02X?}")]
    ChecksumMismatch {
        expected: (u8, u8),
        received: (u8, u8),
    },

    /// A `\xNN` group in wire text could not be parsed back to a byte
    #[error("malformed wire text at offset {0}")]
    MalformedWireText(usize),
}

/// Core protocol errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Sentence buffer capacity exceeded; sentences are never silently dropped
    #[error("sentence buffer overflow: capacity {capacity} reached")]
    BufferOverflow {
        capacity: usize,
    },
}
