//! Frame transport abstraction.
//!
//! This module defines the trait the correlation engine uses to talk to a
//! radar, so the same engine logic runs against a real UART, a replay file
//! or a scripted test double.
//!
//! # Design
//!
//! The trait uses a **poll-based** interface (not async) because:
//! - the device is half-duplex and only ever has one outstanding request
//! - the engine drains the transport from a periodic poller *and* from the
//!   wait loop of a blocking operation, so reads must never block
//!
//! Framing and checksum errors are absorbed by the transport and only show
//! up in [`TransportStats`]; the engine sees either a decoded [`Frame`] or
//! nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use mmwave_core::io::FrameTransport;
//!
//! fn presence_query<T: FrameTransport>(io: &mut T) {
//!     io.send_frame(0x80, 0x80, &[0x0F]).unwrap();
//!
//!     // Poll for the answer
//!     for frame in io.read_frames() {
//!         println!("{:02X}/{:02X} {:02X?}", frame.control, frame.command, frame.data);
//!     }
//! }
//! ```

use serde::Serialize;
use thiserror::Error;

use crate::protocol::Frame;

// =============================================================================
// Error Types
// =============================================================================

/// Failure to put a frame on the wire.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The underlying port reported an error
    #[error("Write failed: {0}")]
    Write(String),

    /// The frame could not be encoded
    #[error("Cannot encode frame: {0}")]
    Encode(#[from] crate::error::FrameError),

    /// The transport has been shut down
    #[error("Transport closed")]
    Closed,
}

// =============================================================================
// Statistics
// =============================================================================

/// Receive-side counters kept by a transport.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransportStats {
    /// Raw bytes taken from the port
    pub total_bytes_received: u64,
    /// Frames that passed every check
    pub total_frames_parsed: u64,
    /// Frames dropped because of a checksum mismatch
    pub crc_errors: u64,
    /// Frames dropped because of a bad trailer
    pub frame_errors: u64,
    /// Frames dropped because the length field was inconsistent
    pub invalid_frames: u64,
}

impl TransportStats {
    /// Total number of frames that were dropped
    pub fn dropped(&self) -> u64 {
        self.crc_errors + self.frame_errors + self.invalid_frames
    }
}

impl std::fmt::Display for TransportStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} bytes, {} frames, {} crc errors, {} frame errors, {} invalid",
            self.total_bytes_received,
            self.total_frames_parsed,
            self.crc_errors,
            self.frame_errors,
            self.invalid_frames
        )
    }
}

// =============================================================================
// FrameTransport Trait
// =============================================================================

/// Platform-independent frame transport.
///
/// Implementations must be non-blocking: `read_frames` returns whatever is
/// complete right now, possibly nothing.
pub trait FrameTransport {
    /// Encode and transmit one frame, returning the bytes that were written.
    fn send_frame(&mut self, control: u8, command: u8, data: &[u8])
        -> Result<Vec<u8>, TransportError>;

    /// Return every complete, valid frame currently available, in order.
    fn read_frames(&mut self) -> Vec<Frame>;

    /// Snapshot of the receive counters.
    fn stats(&self) -> TransportStats;

    /// Discard any partially received bytes.
    fn clear_buffer(&mut self);
}

impl<T: FrameTransport + ?Sized> FrameTransport for Box<T> {
    fn send_frame(
        &mut self,
        control: u8,
        command: u8,
        data: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        (**self).send_frame(control, command, data)
    }

    fn read_frames(&mut self) -> Vec<Frame> {
        (**self).read_frames()
    }

    fn stats(&self) -> TransportStats {
        (**self).stats()
    }

    fn clear_buffer(&mut self) {
        (**self).clear_buffer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_dropped() {
        let stats = TransportStats {
            total_bytes_received: 100,
            total_frames_parsed: 8,
            crc_errors: 1,
            frame_errors: 2,
            invalid_frames: 0,
        };
        assert_eq!(stats.dropped(), 3);
        assert_eq!(
            stats.to_string(),
            "100 bytes, 8 frames, 1 crc errors, 2 frame errors, 0 invalid"
        );
    }

    #[test]
    fn test_encode_error_converts() {
        let err: TransportError = crate::error::FrameError::PayloadTooLarge(70000).into();
        assert_eq!(err.to_string(), "Cannot encode frame: Payload too large: 70000 bytes");
    }
}
