//! Error types for frame encoding and decoding

use thiserror::Error;

/// Errors that can occur when building or validating an SY frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Frame is too short to contain header, length, checksum and trailer
    #[error("Frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Frame does not start with the 0x53 0x59 header
    #[error("Invalid header: expected {expected:02X?}, got {actual:02X?}")]
    InvalidHeader { expected: [u8; 2], actual: [u8; 2] },

    /// Frame does not end with the 0x54 0x43 trailer
    #[error("Invalid trailer: expected {expected:02X?}, got {actual:02X?}")]
    InvalidTrailer { expected: [u8; 2], actual: [u8; 2] },

    /// Length field doesn't match actual frame length
    #[error("Length mismatch: header says {header_len} data bytes, frame has room for {actual_len}")]
    LengthMismatch { header_len: usize, actual_len: usize },

    /// Checksum byte doesn't match the sum of the preceding bytes
    #[error("Checksum mismatch: calculated {calculated:#04X}, received {received:#04X}")]
    ChecksumMismatch { calculated: u8, received: u8 },

    /// Payload does not fit in the 16 bit length field
    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),
}

/// A decoded status byte outside its declared set of values
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid {field}: {value}")]
pub struct StatusError {
    pub field: &'static str,
    pub value: u8,
}
