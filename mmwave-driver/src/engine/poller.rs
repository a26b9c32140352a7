//! Background drain of the transport.
//!
//! Two threads per engine: a tick thread that empties the port every
//! `parse_interval` and a worker that applies the frames in arrival order.
//! Dispatch never runs on the tick thread, so a slow mirror update cannot
//! delay the next read.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, select, tick, Receiver, Sender};
use log::{debug, trace, warn};
use mmwave_core::{DeviceProfile, Frame};

use super::Shared;
use crate::error::DeviceError;

/// Frames buffered between the tick thread and the worker
const QUEUE_DEPTH: usize = 64;

pub struct Poller {
    stop_tx: Sender<()>,
    reader: JoinHandle<()>,
    worker: JoinHandle<()>,
}

impl Poller {
    pub(crate) fn start<P: DeviceProfile>(
        shared: Arc<Shared<P>>,
        interval: Duration,
    ) -> Result<Self, DeviceError> {
        let (stop_tx, stop_rx) = bounded::<()>(0);
        let (frame_tx, frame_rx) = bounded::<Frame>(QUEUE_DEPTH);

        let worker = {
            let shared = shared.clone();
            thread::Builder::new()
                .name(format!("{}-dispatch", shared.key))
                .spawn(move || run_worker(shared, frame_rx))?
        };
        let reader = thread::Builder::new()
            .name(format!("{}-poll", shared.key))
            .spawn(move || run_reader(shared, interval, stop_rx, frame_tx))?;

        Ok(Poller {
            stop_tx,
            reader,
            worker,
        })
    }

    /// Stop both threads and wait for them.
    ///
    /// Dropping the stop sender wakes the reader; the reader dropping the
    /// frame sender ends the worker once the queue is empty.
    pub fn stop(self) {
        drop(self.stop_tx);
        if self.reader.join().is_err() {
            warn!("Poll thread panicked");
        }
        if self.worker.join().is_err() {
            warn!("Dispatch thread panicked");
        }
    }
}

fn run_reader<P: DeviceProfile>(
    shared: Arc<Shared<P>>,
    interval: Duration,
    stop_rx: Receiver<()>,
    frame_tx: Sender<Frame>,
) {
    debug!("{}: poller started, every {:?}", shared.key, interval);
    let ticker = tick(interval);
    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                let frames = {
                    let mut transport = shared.lock_transport();
                    // Checked under the lock: execute() clears the flag
                    // before it takes the transport to send
                    if shared.running.load(Ordering::SeqCst) {
                        let frames = transport.read_frames();
                        shared.queued.fetch_add(frames.len(), Ordering::SeqCst);
                        frames
                    } else {
                        Vec::new()
                    }
                };
                let mut closed = false;
                for frame in frames {
                    trace!("{}: polled {:02X}/{:02X}", shared.key, frame.control, frame.command);
                    if frame_tx.send(frame).is_err() {
                        closed = true;
                        break;
                    }
                }
                if closed {
                    break;
                }
            }
        }
    }
    debug!("{}: poller stopped", shared.key);
}

fn run_worker<P: DeviceProfile>(shared: Arc<Shared<P>>, frame_rx: Receiver<Frame>) {
    for frame in frame_rx.iter() {
        shared.dispatch(&frame);
        shared.queued.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::Engine;
    use crate::settings::Settings;
    use mmwave_core::io::{FrameTransport, TransportError, TransportStats};
    use mmwave_core::models::r60amp1::R60Amp1;
    use mmwave_core::Frame;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// Reads come from a shared queue the test fills
    struct Feed(Arc<Mutex<VecDeque<Frame>>>);

    impl FrameTransport for Feed {
        fn send_frame(&mut self, _: u8, _: u8, data: &[u8]) -> Result<Vec<u8>, TransportError> {
            Ok(data.to_vec())
        }

        fn read_frames(&mut self) -> Vec<Frame> {
            self.0.lock().unwrap().drain(..).collect()
        }

        fn stats(&self) -> TransportStats {
            TransportStats::default()
        }

        fn clear_buffer(&mut self) {}
    }

    fn wait_for(engine: &Engine<R60Amp1>, f: impl Fn(&mmwave_core::models::r60amp1::State) -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if engine.with_state(&f) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_poller_applies_telemetry() {
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let settings = Settings {
            parse_interval_ms: 10,
            ..Default::default()
        };
        let engine = Engine::<R60Amp1>::new(Feed(queue.clone()), settings);
        engine.start().unwrap();
        assert!(engine.is_running());

        queue.lock().unwrap().push_back(Frame::new(0x80, 0x01, vec![1]));
        queue.lock().unwrap().push_back(Frame::new(0x80, 0x03, vec![42]));
        assert!(wait_for(&engine, |s| s.presence == 1 && s.body_motion == 42));

        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_stopped_poller_leaves_port_alone() {
        let queue = Arc::new(Mutex::new(VecDeque::new()));
        let settings = Settings {
            parse_interval_ms: 10,
            ..Default::default()
        };
        let engine = Engine::<R60Amp1>::new(Feed(queue.clone()), settings);
        engine.start().unwrap();
        engine.stop();

        queue.lock().unwrap().push_back(Frame::new(0x80, 0x01, vec![1]));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.lock().unwrap().len(), 1);
        assert_eq!(engine.with_state(|s| s.presence), 0);
    }
}
