//! Transport errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Underlying I/O failures, surfaced verbatim; the protocol layers add no
/// interpretation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("port not open")]
    NotOpen,

    #[error("port closed by peer")]
    Closed,

    #[error("serial error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
