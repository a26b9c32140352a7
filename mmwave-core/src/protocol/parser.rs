//! Incremental SY frame parser.
//!
//! Bytes arrive from the UART in arbitrary chunks. [`FrameParser`] keeps a
//! small receive buffer, extracts every complete frame it can find and
//! counts everything it has to throw away in [`TransportStats`].

use crate::error::FrameError;
use crate::io::TransportStats;

use super::{Frame, HEADER, MIN_FRAME_LEN};

/// Maximum bytes taken from the port per drain
pub const READ_CHUNK: usize = 32;

/// The receive buffer is discarded when it grows past this
pub const MAX_BUFFER: usize = 128;

/// Offset of the length field
const LENGTH_OFFSET: usize = 4;

#[derive(Debug, Default, Clone)]
pub struct FrameParser {
    buffer: Vec<u8>,
    stats: TransportStats,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append freshly received bytes and return every complete frame.
    ///
    /// Invalid frames are dropped and counted:
    /// - trailer mismatch: `frame_errors`, resync one byte further
    /// - checksum mismatch: `crc_errors`, skip the whole frame
    /// - inconsistent length: `invalid_frames`, skip the whole frame
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Frame> {
        if bytes.is_empty() {
            return Vec::new();
        }
        self.stats.total_bytes_received += bytes.len() as u64;
        if self.buffer.len() > MAX_BUFFER {
            self.buffer.clear();
        }
        self.buffer.extend_from_slice(bytes);

        let mut frames = Vec::new();
        let mut pos = 0;
        while self.buffer.len() - pos >= MIN_FRAME_LEN {
            let Some(start) = self.find_header(pos) else {
                // Keep a trailing 0x53 which may be the first half of a header
                pos = self.buffer.len() - 1;
                break;
            };
            pos = start;
            if self.buffer.len() - start < MIN_FRAME_LEN {
                break;
            }
            let data_len = u16::from_be_bytes([
                self.buffer[start + LENGTH_OFFSET],
                self.buffer[start + LENGTH_OFFSET + 1],
            ]) as usize;
            let end = start + MIN_FRAME_LEN + data_len;
            if end > self.buffer.len() {
                break;
            }

            match Frame::decode(&self.buffer[start..end]) {
                Ok(frame) => {
                    self.stats.total_frames_parsed += 1;
                    frames.push(frame);
                    pos = end;
                }
                Err(FrameError::InvalidTrailer { .. }) => {
                    self.stats.frame_errors += 1;
                    pos = start + 1;
                }
                Err(FrameError::ChecksumMismatch { .. }) => {
                    self.stats.crc_errors += 1;
                    pos = end;
                }
                Err(_) => {
                    self.stats.invalid_frames += 1;
                    pos = end;
                }
            }
        }

        if pos > 0 {
            self.buffer.drain(..pos);
        }
        frames
    }

    fn find_header(&self, from: usize) -> Option<usize> {
        self.buffer
            .get(from..)?
            .windows(2)
            .position(|w| w == HEADER)
            .map(|i| from + i)
    }

    pub fn stats(&self) -> TransportStats {
        self.stats
    }

    /// Bytes currently held waiting for the rest of a frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_frame;

    fn frame_bytes(control: u8, command: u8, data: &[u8]) -> Vec<u8> {
        encode_frame(control, command, data).unwrap()
    }

    #[test]
    fn test_parse_single_frame() {
        let mut parser = FrameParser::new();
        let frames = parser.push(&frame_bytes(0x80, 0x01, &[1]));
        assert_eq!(frames, vec![Frame::new(0x80, 0x01, vec![1])]);
        assert_eq!(parser.stats().total_frames_parsed, 1);
        assert_eq!(parser.stats().total_bytes_received, 10);
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_parse_split_frame() {
        let bytes = frame_bytes(0x85, 0x02, &[72]);
        let mut parser = FrameParser::new();
        assert!(parser.push(&bytes[..4]).is_empty());
        assert!(parser.push(&bytes[4..7]).is_empty());
        let frames = parser.push(&bytes[7..]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, vec![72]);
    }

    #[test]
    fn test_parse_skips_garbage_and_keeps_order() {
        let mut bytes = vec![0x00, 0x11, 0x53];
        bytes.extend(frame_bytes(0x80, 0x01, &[1]));
        bytes.extend(frame_bytes(0x80, 0x02, &[2]));
        let mut parser = FrameParser::new();
        let frames = parser.push(&bytes);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].key(), (0x80, 0x01));
        assert_eq!(frames[1].key(), (0x80, 0x02));
    }

    #[test]
    fn test_parse_counts_crc_error() {
        let mut bad = frame_bytes(0x80, 0x01, &[1]);
        bad[7] ^= 0x55;
        bad.extend(frame_bytes(0x80, 0x02, &[0]));
        let mut parser = FrameParser::new();
        let frames = parser.push(&bad);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].key(), (0x80, 0x02));
        assert_eq!(parser.stats().crc_errors, 1);
    }

    #[test]
    fn test_parse_counts_trailer_error() {
        let mut bad = frame_bytes(0x80, 0x01, &[1]);
        let last = bad.len() - 1;
        bad[last] = 0x00;
        bad.extend(frame_bytes(0x80, 0x02, &[0]));
        let mut parser = FrameParser::new();
        let frames = parser.push(&bad);
        assert_eq!(frames.len(), 1);
        assert_eq!(parser.stats().frame_errors, 1);
    }

    #[test]
    fn test_parse_clears_oversized_buffer() {
        let mut parser = FrameParser::new();
        // A header with a huge length keeps everything buffered
        let mut stuck = vec![0x53, 0x59, 0x80, 0x01, 0x01, 0x00];
        stuck.extend(std::iter::repeat(0xAA).take(130));
        assert!(parser.push(&stuck).is_empty());
        assert!(parser.buffered() > MAX_BUFFER);

        let frames = parser.push(&frame_bytes(0x80, 0x01, &[1]));
        assert_eq!(frames.len(), 1);
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_empty_push_is_noop() {
        let mut parser = FrameParser::new();
        assert!(parser.push(&[]).is_empty());
        assert_eq!(parser.stats(), TransportStats::default());
    }
}
