//! # chronolink-core
//!
//! Protocol core for laboratory time-and-frequency instruments.
//!
//! This crate provides the pure, I/O-free primitives:
//! - Checksums: XOR-8 for NMEA/PUBX sentences, dual-accumulator for binary
//!   frames
//! - Binary frame encoding/decoding and `\xNN` wire-text escaping
//! - PUBX sentence construction
//! - Line classification, drain policy, and response assembly types
//! - The unsolicited-sentence buffer

pub mod buffer;
pub mod checksum;
pub mod collector;
pub mod constants;
pub mod error;
pub mod frame;
pub mod sentence;

pub use buffer::SentenceBuffer;
pub use collector::{classify, DrainPolicy, LineClass, Response};
pub use error::{EncodingError, Error, FramingError, Result};
pub use frame::Frame;
