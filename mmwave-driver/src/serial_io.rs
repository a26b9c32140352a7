//! Serial implementation of FrameTransport.
//!
//! `SerialTransport` wraps anything that is `Read + Write` (a serial port
//! opened with a short read timeout, a pty, a socket) and turns it into the
//! poll-based frame interface `mmwave_core` expects.
//!
//! A read that times out or would block is simply "no data yet": the engine
//! polls again on its next tick or wait-loop iteration.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use mmwave_core::io::{FrameTransport, TransportError, TransportStats};
use mmwave_core::protocol::encode_frame;
use mmwave_core::protocol::parser::{FrameParser, READ_CHUNK};
use mmwave_core::Frame;

/// Default line speed of the R60 modules
pub const BAUD_RATE: u32 = 115_200;

/// Serial implementation of FrameTransport.
///
/// # Usage
///
/// ```rust,ignore
/// use mmwave_driver::serial_io::SerialTransport;
///
/// let io = SerialTransport::open("/dev/ttyUSB0")?;
/// let device = R60Abd1Device::new(io, Abd1Config::default(), Settings::default())?;
/// ```
pub struct SerialTransport<P> {
    port: P,
    parser: FrameParser,
    closed: bool,
}

impl SerialTransport<Box<dyn serialport::SerialPort>> {
    /// Open a serial device at the module's default line settings.
    pub fn open(path: &str) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(Duration::from_millis(5))
            .open()?;
        log::info!("Opened {} at {} baud", path, BAUD_RATE);
        Ok(SerialTransport::new(port))
    }
}

impl<P: Read + Write> SerialTransport<P> {
    pub fn new(port: P) -> Self {
        SerialTransport {
            port,
            parser: FrameParser::new(),
            closed: false,
        }
    }

    /// Stop using the port; later sends fail and reads return nothing
    pub fn shutdown(&mut self) {
        self.closed = true;
        self.parser.clear();
    }

    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P: Read + Write> FrameTransport for SerialTransport<P> {
    fn send_frame(
        &mut self,
        control: u8,
        command: u8,
        data: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let bytes = encode_frame(control, command, data)?;
        self.port
            .write_all(&bytes)
            .and_then(|_| self.port.flush())
            .map_err(|e| TransportError::Write(e.to_string()))?;
        Ok(bytes)
    }

    fn read_frames(&mut self) -> Vec<Frame> {
        if self.closed {
            return Vec::new();
        }
        let mut buf = [0u8; READ_CHUNK];
        match self.port.read(&mut buf) {
            Ok(n) => self.parser.push(&buf[..n]),
            Err(ref e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Vec::new()
            }
            Err(e) => {
                log::debug!("Serial read failed: {}", e);
                Vec::new()
            }
        }
    }

    fn stats(&self) -> TransportStats {
        self.parser.stats()
    }

    fn clear_buffer(&mut self) {
        self.parser.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// In-memory port: reads come from `rx`, writes land in `tx`
    #[derive(Default)]
    struct LoopPort {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl Read for LoopPort {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.rx.is_empty() {
                return Err(ErrorKind::TimedOut.into());
            }
            let n = buf.len().min(self.rx.len());
            for (i, b) in self.rx.drain(..n).enumerate() {
                buf[i] = b;
            }
            Ok(n)
        }
    }

    impl Write for LoopPort {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.tx.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_send_writes_encoded_frame() {
        let mut io = SerialTransport::new(LoopPort::default());
        let bytes = io.send_frame(0x80, 0x80, &[0x0F]).unwrap();
        assert_eq!(bytes, encode_frame(0x80, 0x80, &[0x0F]).unwrap());
        assert_eq!(io.into_inner().tx, bytes);
    }

    #[test]
    fn test_timeout_is_no_data() {
        let mut io = SerialTransport::new(LoopPort::default());
        assert!(io.read_frames().is_empty());
        assert_eq!(io.stats(), TransportStats::default());
    }

    #[test]
    fn test_reads_one_chunk_per_call() {
        let mut port = LoopPort::default();
        // Four 10 byte frames, more than one chunk
        for _ in 0..4 {
            port.rx.extend(encode_frame(0x80, 0x01, &[1]).unwrap());
        }
        let mut io = SerialTransport::new(port);
        assert_eq!(io.read_frames().len(), 3);
        assert_eq!(io.read_frames().len(), 1);
        assert_eq!(io.stats().total_bytes_received, 40);
    }

    #[test]
    fn test_closed_transport() {
        let mut io = SerialTransport::new(LoopPort::default());
        io.shutdown();
        assert_eq!(io.send_frame(0x01, 0x01, &[0x0F]), Err(TransportError::Closed));
    }
}
