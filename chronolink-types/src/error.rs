//! Validation and reply-parsing errors

/// Parameter validation errors
///
/// Raised before any byte reaches the wire; an out-of-range setter argument
/// is a caller bug, never retried, never silently dropped.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// Numeric parameter outside its documented closed range
    #[error("value {got} outside documented range [{min}, {max}]")]
    OutOfRange {
        min: f64,
        max: f64,
        got: f64,
    },

    /// Baud rate not in the fixed enumerated set; never coerced
    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),
}

/// Reply-parsing errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// `*IDN?` reply did not contain the four comma-separated fields
    #[error("malformed identification reply: {0:?}")]
    MalformedIdentification(String),

    /// Health bitmask reply was not a hex value
    #[error("malformed health reply: {0:?}")]
    MalformedHealth(String),

    /// Date or time reply did not match the documented format
    #[error("malformed {kind} reply: {reply:?}")]
    MalformedTime {
        kind: &'static str,
        reply: String,
    },
}
