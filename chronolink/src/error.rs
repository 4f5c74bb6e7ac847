//! High-level error types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("protocol error: {0}")]
    Core(#[from] chronolink_core::Error),

    #[error("transport error: {0}")]
    Transport(#[from] chronolink_transport::Error),

    #[error("validation error: {0}")]
    Validation(#[from] chronolink_types::ValidationError),

    #[error("reply parse error: {0}")]
    Parse(#[from] chronolink_types::ParseError),
}

impl From<chronolink_core::EncodingError> for Error {
    fn from(e: chronolink_core::EncodingError) -> Self {
        Self::Core(e.into())
    }
}

impl From<chronolink_core::FramingError> for Error {
    fn from(e: chronolink_core::FramingError) -> Self {
        Self::Core(e.into())
    }
}
