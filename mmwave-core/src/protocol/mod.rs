//! SY wire protocol shared by the R60 radar family.
//!
//! Every message, in both directions, is carried in the same envelope:
//!
//! ```text
//! ┌────────┬─────────┬─────────┬──────────┬──────────┬─────┬─────────┐
//! │ 53 59  │ control │ command │ len (BE) │ data ... │ sum │  54 43  │
//! └────────┴─────────┴─────────┴──────────┴──────────┴─────┴─────────┘
//! ```
//!
//! The checksum is the low byte of the sum of every byte before it.
//! All functions here are pure (no I/O).
//!
//! # Example
//!
//! ```
//! use mmwave_core::protocol::{encode_frame, Frame};
//!
//! let bytes = encode_frame(0x80, 0x80, &[0x0F]).unwrap();
//! let frame = Frame::decode(&bytes).unwrap();
//! assert_eq!(frame.key(), (0x80, 0x80));
//! assert_eq!(frame.data, vec![0x0F]);
//! ```

pub mod decode;
pub mod parser;

use serde::Serialize;

use crate::error::FrameError;

// =============================================================================
// Constants
// =============================================================================

/// Frame header bytes ("SY")
pub const HEADER: [u8; 2] = [0x53, 0x59];

/// Frame trailer bytes ("TC")
pub const TRAILER: [u8; 2] = [0x54, 0x43];

/// Header + control + command + length + checksum + trailer
pub const MIN_FRAME_LEN: usize = 9;

/// Offset of the first data byte
const DATA_OFFSET: usize = 6;

// =============================================================================
// Frame
// =============================================================================

/// One decoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Control byte (functional group)
    pub control: u8,
    /// Command byte (message within the group)
    pub command: u8,
    /// Payload bytes
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(control: u8, command: u8, data: impl Into<Vec<u8>>) -> Self {
        Frame {
            control,
            command,
            data: data.into(),
        }
    }

    /// The (control, command) pair that routes this frame to its handler
    pub fn key(&self) -> (u8, u8) {
        (self.control, self.command)
    }

    /// First payload byte, if any
    pub fn first(&self) -> Option<u8> {
        self.data.first().copied()
    }

    /// Encode this frame into wire bytes
    pub fn encode(&self) -> Result<Vec<u8>, FrameError> {
        encode_frame(self.control, self.command, &self.data)
    }

    /// Decode exactly one complete frame.
    ///
    /// The checks are made in the same order the stream parser makes them:
    /// trailer first, then checksum, then the length field.
    pub fn decode(bytes: &[u8]) -> Result<Frame, FrameError> {
        if bytes.len() < MIN_FRAME_LEN {
            return Err(FrameError::TooShort {
                expected: MIN_FRAME_LEN,
                actual: bytes.len(),
            });
        }
        let header = [bytes[0], bytes[1]];
        if header != HEADER {
            return Err(FrameError::InvalidHeader {
                expected: HEADER,
                actual: header,
            });
        }
        let end = bytes.len();
        let trailer = [bytes[end - 2], bytes[end - 1]];
        if trailer != TRAILER {
            return Err(FrameError::InvalidTrailer {
                expected: TRAILER,
                actual: trailer,
            });
        }
        let calculated = checksum(&bytes[..end - 3]);
        let received = bytes[end - 3];
        if calculated != received {
            return Err(FrameError::ChecksumMismatch {
                calculated,
                received,
            });
        }
        let header_len = u16::from_be_bytes([bytes[4], bytes[5]]) as usize;
        let actual_len = end - MIN_FRAME_LEN;
        if header_len != actual_len {
            return Err(FrameError::LengthMismatch {
                header_len,
                actual_len,
            });
        }

        Ok(Frame {
            control: bytes[2],
            command: bytes[3],
            data: bytes[DATA_OFFSET..DATA_OFFSET + header_len].to_vec(),
        })
    }
}

/// Low byte of the sum of all bytes
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Build the wire bytes for one frame
pub fn encode_frame(control: u8, command: u8, data: &[u8]) -> Result<Vec<u8>, FrameError> {
    let len = u16::try_from(data.len()).map_err(|_| FrameError::PayloadTooLarge(data.len()))?;

    let mut frame = Vec::with_capacity(MIN_FRAME_LEN + data.len());
    frame.extend_from_slice(&HEADER);
    frame.push(control);
    frame.push(command);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(data);
    frame.push(checksum(&frame));
    frame.extend_from_slice(&TRAILER);
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_presence_query() {
        let bytes = encode_frame(0x80, 0x80, &[0x0F]).unwrap();
        // 53+59+80+80+00+01+0F = 0x1BC
        assert_eq!(
            bytes,
            vec![0x53, 0x59, 0x80, 0x80, 0x00, 0x01, 0x0F, 0xBC, 0x54, 0x43]
        );
    }

    #[test]
    fn test_encode_empty_payload() {
        let bytes = encode_frame(0x01, 0x01, &[]).unwrap();
        assert_eq!(bytes.len(), MIN_FRAME_LEN);
        assert_eq!(Frame::decode(&bytes).unwrap(), Frame::new(0x01, 0x01, Vec::<u8>::new()));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let mut bytes = encode_frame(0x85, 0x02, &[72]).unwrap();
        bytes[7] ^= 0xFF;
        assert!(matches!(
            Frame::decode(&bytes),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_bad_trailer() {
        let mut bytes = encode_frame(0x85, 0x02, &[72]).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 0x00;
        assert!(matches!(
            Frame::decode(&bytes),
            Err(FrameError::InvalidTrailer { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_short_frame() {
        assert_eq!(
            Frame::decode(&[0x53, 0x59, 0x01]),
            Err(FrameError::TooShort {
                expected: MIN_FRAME_LEN,
                actual: 3
            })
        );
    }

    #[test]
    fn test_decode_rejects_length_mismatch() {
        let mut bytes = encode_frame(0x80, 0x01, &[1, 2]).unwrap();
        // Claim three data bytes, then fix up the checksum
        bytes[5] = 3;
        let crc_pos = bytes.len() - 3;
        bytes[crc_pos] = checksum(&bytes[..crc_pos]);
        assert!(matches!(
            Frame::decode(&bytes),
            Err(FrameError::LengthMismatch {
                header_len: 3,
                actual_len: 2
            })
        ));
    }
}
