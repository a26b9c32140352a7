//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use mmwave_core::io::{FrameTransport, TransportError, TransportStats};
use mmwave_core::Frame;
use mmwave_driver::Settings;

pub type Responder = Box<dyn FnMut(&Frame) -> Vec<Frame> + Send>;

struct Inner {
    responder: Responder,
    pending: VecDeque<Frame>,
    sent: Vec<Frame>,
    frames_read: u64,
}

/// Answers every sent frame through a responder closure. Clones share the
/// same state, so a test can keep one to inspect what the engine sent.
#[derive(Clone)]
pub struct MockTransport(Arc<Mutex<Inner>>);

impl MockTransport {
    pub fn new(responder: impl FnMut(&Frame) -> Vec<Frame> + Send + 'static) -> Self {
        MockTransport(Arc::new(Mutex::new(Inner {
            responder: Box::new(responder),
            pending: VecDeque::new(),
            sent: Vec::new(),
            frames_read: 0,
        })))
    }

    /// Behaves like a healthy module reporting `product_model`
    pub fn answering(product_model: &'static str) -> Self {
        MockTransport::new(move |frame| answer(product_model, frame))
    }

    /// Never answers anything
    pub fn silent() -> Self {
        MockTransport::new(|_| Vec::new())
    }

    /// Queue a frame as if the module had sent it unprompted
    pub fn inject(&self, frame: Frame) {
        self.0.lock().unwrap().pending.push_back(frame);
    }

    pub fn sent(&self) -> Vec<Frame> {
        self.0.lock().unwrap().sent.clone()
    }

    pub fn sent_keys(&self) -> Vec<(u8, u8)> {
        self.sent().iter().map(Frame::key).collect()
    }

    pub fn sent_count(&self, key: (u8, u8)) -> usize {
        self.sent().iter().filter(|f| f.key() == key).count()
    }
}

/// Identity queries get the model string, other queries get 1, sets are echoed.
///
/// Query commands have the high bit set; everything below 0x80 (sets,
/// switches, reset, heartbeat reports) is echoed back unchanged.
pub fn answer(product_model: &str, frame: &Frame) -> Vec<Frame> {
    if frame.command < 0x80 {
        return vec![frame.clone()];
    }
    let data = match frame.key() {
        (0x02, 0xA1) => product_model.as_bytes().to_vec(),
        (0x02, 0xA2) => b"0001".to_vec(),
        (0x02, 0xA3) => b"G60SM1".to_vec(),
        (0x02, 0xA4) => b"V1.0.3".to_vec(),
        _ => vec![1],
    };
    vec![Frame::new(frame.control, frame.command, data)]
}

impl FrameTransport for MockTransport {
    fn send_frame(&mut self, control: u8, command: u8, data: &[u8]) -> Result<Vec<u8>, TransportError> {
        let frame = Frame::new(control, command, data.to_vec());
        let bytes = frame.encode()?;
        let mut inner = self.0.lock().unwrap();
        let replies = (inner.responder)(&frame);
        inner.sent.push(frame);
        inner.pending.extend(replies);
        Ok(bytes)
    }

    fn read_frames(&mut self) -> Vec<Frame> {
        let mut inner = self.0.lock().unwrap();
        let frames: Vec<Frame> = inner.pending.drain(..).collect();
        inner.frames_read += frames.len() as u64;
        frames
    }

    fn stats(&self) -> TransportStats {
        TransportStats {
            total_frames_parsed: self.0.lock().unwrap().frames_read,
            ..Default::default()
        }
    }

    fn clear_buffer(&mut self) {
        self.0.lock().unwrap().pending.clear();
    }
}

/// Short timings so failing start-ups do not take seconds
pub fn fast_settings() -> Settings {
    Settings {
        parse_interval_ms: 20,
        max_retries: 0,
        retry_delay_ms: 0,
        init_timeout_ms: 1000,
        reset_settle_ms: 10,
        recovery_timeout_ms: 200,
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
