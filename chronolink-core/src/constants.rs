//! Protocol constants

/// First UBX sync character (μ)
pub const SYNC_1: u8 = 0xB5;

/// Second UBX sync character (b)
pub const SYNC_2: u8 = 0x62;

/// Frame header size in bytes: sync pair, class, id, 16-bit length
pub const FRAME_HEADER_SIZE: usize = 6;

/// Trailing checksum size in bytes
pub const FRAME_CHECKSUM_SIZE: usize = 2;

/// Maximum binary payload (16-bit length field)
pub const MAX_PAYLOAD_SIZE: usize = 65535;

/// Default sentence buffer capacity
pub const SENTENCE_BUFFER_CAPACITY: usize = 1024;

/// Command prompt emitted by SCPI instruments on RS-232
pub const SCPI_PROMPT: &str = "scpi>";

/// UBX message classes and ids
pub mod ubx {
    /// MON message class
    pub const CLASS_MON: u8 = 0x0A;

    /// MON-VER: firmware/hardware version and extensions
    pub const ID_MON_VER: u8 = 0x04;

    /// MON-HW: hardware status
    pub const ID_MON_HW: u8 = 0x09;
}
