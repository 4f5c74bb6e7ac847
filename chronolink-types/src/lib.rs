//! # chronolink-types
//!
//! Instrument-facing value types: validated baud rates, parameter
//! validation errors, `*IDN?` identification, GPSDO health flags, and
//! UTC date/time reply parsing.

pub mod baud;
pub mod error;
pub mod gpstime;
pub mod health;
pub mod identification;

pub use baud::{Baud, SUPPORTED_RATES};
pub use error::{ParseError, ValidationError};
pub use health::SyncHealth;
pub use identification::Identification;
