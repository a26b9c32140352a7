//! Operation executor.
//!
//! The engine owns the transport, the state mirror and the single
//! operation slot of one radar. Two paths read the wire:
//!
//! ```text
//!   caller ──► execute() ──► send ──► wait loop ─┬─► manual drain ──► dispatch
//!                                                │
//!   Poller (tick thread) ──► drain ──► channel ──┴─► worker ──────► dispatch
//! ```
//!
//! The poller only drains while the running flag is set. `execute` clears
//! the flag for the duration of the call, so the foreground loop is the
//! only reader while it waits for its reply, and a [`PauseGuard`] puts it
//! back on every exit path. The flag is only ever put back while the
//! poller threads exist: once `stop` has run, a finishing operation leaves
//! it cleared.
//!
//! Frames the poller read before the pause may still sit in the worker's
//! queue. The wait loop does not drain the port itself until that queue is
//! empty, so the mirror sees frames in the order they came off the wire.
//!
//! Lock order: the mirror is released before the operation slot is taken,
//! and the transport lock is never held while dispatching.

mod poller;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};
use mmwave_core::io::{FrameTransport, TransportStats};
use mmwave_core::operation::{Offer, OperationStats, OperationTracker};
use mmwave_core::{DeviceProfile, Frame, Operation, Value};

use crate::error::{DeviceError, OperationError};
use crate::settings::Settings;

pub use poller::Poller;

/// Longest single wait on the completion signal before draining the port
const WAIT_SLICE: Duration = Duration::from_millis(2);

pub type BoxedTransport = Box<dyn FrameTransport + Send>;

pub(crate) struct Shared<P: DeviceProfile> {
    key: String,
    transport: Mutex<BoxedTransport>,
    state: RwLock<P::State>,
    operation: Mutex<OperationTracker<P::Op>>,
    completed: Condvar,
    /// Poller may drain right now
    running: AtomicBool,
    /// Poller threads exist; changed only under the operation lock
    active: AtomicBool,
    /// Frames read by the poller and not yet dispatched by the worker
    queued: AtomicUsize,
    epoch: Instant,
}

impl<P: DeviceProfile> Shared<P> {
    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn lock_transport(&self) -> MutexGuard<'_, BoxedTransport> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_operation(&self) -> MutexGuard<'_, OperationTracker<P::Op>> {
        self.operation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take whatever frames the transport has right now
    fn drain(&self) -> Vec<Frame> {
        self.lock_transport().read_frames()
    }

    /// Apply one frame to the mirror and offer any reply to the operation slot.
    pub(crate) fn dispatch(&self, frame: &Frame) {
        let reply = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            P::apply(frame, &mut state, self.now_ms())
        };
        let Some(reply) = reply else {
            return;
        };

        let name = reply.operation.name();
        let mut tracker = self.lock_operation();
        match tracker.offer(reply.operation, reply.value) {
            Offer::Completed => {
                debug!("{}: {} answered", self.key, name);
                self.completed.notify_all();
            }
            Offer::Unsolicited => {
                debug!("{}: unsolicited {}", self.key, name);
            }
            Offer::Mismatch { expected } => {
                trace!("{}: {} while waiting for {}", self.key, name, expected.name());
            }
            Offer::Duplicate => {
                trace!("{}: duplicate {}", self.key, name);
            }
        }
    }
}

/// Pauses the background poller and releases the operation slot on drop.
///
/// On drop the running flag follows `active`, which is what it was before
/// the call unless the poller was stopped in the meantime.
struct PauseGuard<'a, P: DeviceProfile> {
    shared: &'a Shared<P>,
}

impl<'a, P: DeviceProfile> PauseGuard<'a, P> {
    fn new(shared: &'a Shared<P>) -> Self {
        shared.running.store(false, Ordering::SeqCst);
        PauseGuard { shared }
    }
}

impl<P: DeviceProfile> Drop for PauseGuard<'_, P> {
    fn drop(&mut self) {
        let mut tracker = self.shared.lock_operation();
        tracker.finish();
        let active = self.shared.active.load(Ordering::SeqCst);
        self.shared.running.store(active, Ordering::SeqCst);
    }
}

/// Generic command/response engine for one radar.
pub struct Engine<P: DeviceProfile> {
    shared: Arc<Shared<P>>,
    poller: Mutex<Option<Poller>>,
    settings: Settings,
}

impl<P: DeviceProfile> Engine<P> {
    pub fn new<T>(transport: T, settings: Settings) -> Self
    where
        T: FrameTransport + Send + 'static,
    {
        Engine {
            shared: Arc::new(Shared {
                key: P::MODEL.to_string(),
                transport: Mutex::new(Box::new(transport)),
                state: RwLock::new(P::State::default()),
                operation: Mutex::new(OperationTracker::new()),
                completed: Condvar::new(),
                running: AtomicBool::new(false),
                active: AtomicBool::new(false),
                queued: AtomicUsize::new(0),
                epoch: Instant::now(),
            }),
            poller: Mutex::new(None),
            settings,
        }
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Milliseconds since the engine was created; mirror timestamps use this clock
    pub fn now_ms(&self) -> u64 {
        self.shared.now_ms()
    }

    // -------------------------------------------------------------------------
    // Background Poller
    // -------------------------------------------------------------------------

    /// Start the background poller. Does nothing if it is already running.
    pub fn start(&self) -> Result<(), DeviceError> {
        let mut poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if poller.is_none() {
            *poller = Some(Poller::start(self.shared.clone(), self.settings.parse_interval())?);
            let tracker = self.shared.lock_operation();
            self.shared.active.store(true, Ordering::SeqCst);
            // An operation in flight re-arms the flag when it finishes
            if tracker.is_idle() {
                self.shared.running.store(true, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    /// Stop the background poller and wait for its threads.
    ///
    /// An operation still in flight keeps running on its manual drain but
    /// does not turn the poller flag back on when it finishes.
    pub fn stop(&self) {
        {
            let _tracker = self.shared.lock_operation();
            self.shared.active.store(false, Ordering::SeqCst);
            self.shared.running.store(false, Ordering::SeqCst);
        }
        let poller = self.poller.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(poller) = poller {
            poller.stop();
        }
        // Frames the reader counted but could not hand over
        self.shared.queued.store(0, Ordering::SeqCst);
    }

    /// Whether the background poller may drain the port right now
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Run one request/response exchange.
    ///
    /// `payload` replaces the catalog's default payload, which is how set
    /// operations carry their argument. Fails at once with
    /// [`OperationError::Busy`] if another operation is in flight; nothing is
    /// sent in that case.
    pub fn execute(
        &self,
        operation: P::Op,
        payload: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<Value, OperationError> {
        let shared = &*self.shared;
        let wire = operation.wire();
        let deadline = Instant::now() + timeout;

        if let Err(current) =
            shared
                .lock_operation()
                .try_begin(operation, shared.now_ms(), timeout.as_millis() as u64)
        {
            debug!("{}: {} rejected, {} in flight", shared.key, wire.name, current.name());
            return Err(OperationError::Busy {
                requested: wire.name,
                in_flight: current.name(),
            });
        }
        let _guard = PauseGuard::new(shared);

        let data = payload.unwrap_or(wire.payload);
        match shared.lock_transport().send_frame(wire.control, wire.command, data) {
            Ok(bytes) => trace!("{}: sent {} {:02X?}", shared.key, wire.name, bytes),
            Err(e) => {
                debug!("{}: cannot send {}: {}", shared.key, wire.name, e);
                return Err(OperationError::SendFailed {
                    operation: wire.name,
                    reason: e.to_string(),
                });
            }
        }

        loop {
            {
                let mut tracker = shared.lock_operation();
                if let Some(value) = tracker.take_result() {
                    return Ok(value);
                }
                let now = Instant::now();
                if now >= deadline {
                    debug!("{}: {} timed out", shared.key, wire.name);
                    return Err(OperationError::Timeout {
                        operation: wire.name,
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                let (mut tracker, _) = shared
                    .completed
                    .wait_timeout(tracker, (deadline - now).min(WAIT_SLICE))
                    .unwrap_or_else(PoisonError::into_inner);
                if let Some(value) = tracker.take_result() {
                    return Ok(value);
                }
            }

            // Stand in for the paused poller, once its queue is applied
            if shared.queued.load(Ordering::SeqCst) == 0 {
                for frame in shared.drain() {
                    shared.dispatch(&frame);
                }
            }
        }
    }

    /// [`execute`](Self::execute) with up to `max_retries` extra attempts,
    /// `retry_delay` apart. Returns the last error when every attempt fails.
    pub fn execute_with_retry(
        &self,
        operation: P::Op,
        payload: Option<&[u8]>,
        timeout: Duration,
    ) -> Result<Value, OperationError> {
        let attempts = self.settings.max_retries + 1;
        let mut attempt = 1;
        loop {
            match self.execute(operation, payload, timeout) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    debug!(
                        "{}: {} attempt {}/{} failed: {}",
                        self.key(),
                        operation.name(),
                        attempt,
                        attempts,
                        e
                    );
                    std::thread::sleep(self.settings.retry_delay());
                    attempt += 1;
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // State
    // -------------------------------------------------------------------------

    /// Snapshot of the state mirror
    pub fn state(&self) -> P::State {
        self.with_state(Clone::clone)
    }

    /// Read the mirror without cloning it
    pub fn with_state<R>(&self, f: impl FnOnce(&P::State) -> R) -> R {
        let state = self.shared.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub fn operation_stats(&self) -> OperationStats {
        self.shared.lock_operation().stats()
    }

    pub fn transport_stats(&self) -> TransportStats {
        self.shared.lock_transport().stats()
    }

    /// Apply a frame as if it had been received.
    pub fn inject(&self, frame: &Frame) {
        self.shared.dispatch(frame);
    }

    /// Stop the poller, apply whatever is still buffered and clear the
    /// transport. Returns the final transport statistics.
    pub fn close(&self) -> TransportStats {
        self.stop();
        let remaining = self.shared.drain();
        if !remaining.is_empty() {
            debug!("{}: applying {} frames on close", self.key(), remaining.len());
        }
        for frame in &remaining {
            self.shared.dispatch(frame);
        }

        let mut transport = self.shared.lock_transport();
        let stats = transport.stats();
        if stats.dropped() > 0 {
            warn!("{}: dropped {} frames", self.key(), stats.dropped());
        }
        info!("{}: closed, {}", self.key(), stats);
        transport.clear_buffer();
        stats
    }
}

impl<P: DeviceProfile> Drop for Engine<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmwave_core::io::TransportError;
    use mmwave_core::models::r60amp1::{Op, R60Amp1};
    use std::collections::VecDeque;

    /// Answers presence switch queries, stays silent otherwise
    #[derive(Default)]
    struct Scripted {
        pending: VecDeque<Frame>,
        sent: Arc<Mutex<Vec<(u8, u8)>>>,
        fail_send: bool,
    }

    impl FrameTransport for Scripted {
        fn send_frame(&mut self, control: u8, command: u8, data: &[u8]) -> Result<Vec<u8>, TransportError> {
            if self.fail_send {
                return Err(TransportError::Write("unplugged".into()));
            }
            self.sent.lock().unwrap().push((control, command));
            if (control, command) == (0x80, 0x80) {
                self.pending.push_back(Frame::new(0x80, 0x02, vec![2]));
                self.pending.push_back(Frame::new(0x80, 0x80, vec![1]));
            }
            Ok(data.to_vec())
        }

        fn read_frames(&mut self) -> Vec<Frame> {
            self.pending.drain(..).collect()
        }

        fn stats(&self) -> TransportStats {
            TransportStats::default()
        }

        fn clear_buffer(&mut self) {
            self.pending.clear();
        }
    }

    #[test]
    fn test_execute_resolves_and_applies_telemetry() {
        let engine = Engine::<R60Amp1>::new(Scripted::default(), Settings::default());
        let value = engine
            .execute(Op::PresenceSwitch, None, Duration::from_millis(200))
            .unwrap();
        assert_eq!(value, Value::Bool(true));
        engine.with_state(|s| {
            assert!(s.presence_enabled);
            assert_eq!(s.motion, 2);
        });
        assert_eq!(engine.operation_stats().completed, 1);
    }

    #[test]
    fn test_timeout_restores_flag() {
        let engine = Engine::<R60Amp1>::new(Scripted::default(), Settings::default());
        let start = Instant::now();
        let err = engine
            .execute(Op::MotionStatus, None, Duration::from_millis(50))
            .unwrap_err();
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(
            err,
            OperationError::Timeout {
                operation: "Motion Info",
                timeout_ms: 50
            }
        );
        assert!(!engine.is_running());
        assert!(engine.shared.lock_operation().is_idle());
    }

    #[test]
    fn test_send_failure_releases_slot() {
        let transport = Scripted {
            fail_send: true,
            ..Default::default()
        };
        let engine = Engine::<R60Amp1>::new(transport, Settings::default());
        let err = engine
            .execute(Op::PresenceSwitch, None, Duration::from_millis(50))
            .unwrap_err();
        assert!(matches!(err, OperationError::SendFailed { .. }));
        assert!(engine.shared.lock_operation().is_idle());
    }

    #[test]
    fn test_retry_counts_attempts() {
        let transport = Scripted::default();
        let sent = transport.sent.clone();
        let settings = Settings {
            max_retries: 2,
            retry_delay_ms: 0,
            ..Default::default()
        };
        let engine = Engine::<R60Amp1>::new(transport, settings);
        assert!(engine
            .execute_with_retry(Op::BodyMotion, None, Duration::from_millis(10))
            .is_err());
        assert_eq!(sent.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_stop_during_operation_keeps_poller_off() {
        let engine = Engine::<R60Amp1>::new(Scripted::default(), Settings::default());
        engine.start().unwrap();
        assert!(engine.is_running());

        std::thread::scope(|s| {
            let pending = s.spawn(|| engine.execute(Op::MotionStatus, None, Duration::from_millis(200)));
            std::thread::sleep(Duration::from_millis(50));
            engine.close();
            assert!(matches!(pending.join().unwrap(), Err(OperationError::Timeout { .. })));
        });

        assert!(!engine.is_running());
        assert!(engine.shared.lock_operation().is_idle());
    }

    #[test]
    fn test_restart_after_stop_rearms_poller() {
        let engine = Engine::<R60Amp1>::new(Scripted::default(), Settings::default());
        engine.start().unwrap();
        engine.stop();
        assert!(engine
            .execute(Op::MotionStatus, None, Duration::from_millis(10))
            .is_err());
        assert!(!engine.is_running());

        engine.start().unwrap();
        assert!(engine
            .execute(Op::MotionStatus, None, Duration::from_millis(10))
            .is_err());
        assert!(engine.is_running());
        engine.stop();
    }

    #[test]
    fn test_wait_loop_defers_to_poller_queue() {
        let engine = Engine::<R60Amp1>::new(Scripted::default(), Settings::default());

        // Pretend the worker still has a frame to apply
        engine.shared.queued.store(1, Ordering::SeqCst);
        let err = engine
            .execute(Op::PresenceSwitch, None, Duration::from_millis(30))
            .unwrap_err();
        assert!(matches!(err, OperationError::Timeout { .. }));
        assert_eq!(engine.with_state(|s| s.motion), 0);

        engine.shared.queued.store(0, Ordering::SeqCst);
        let value = engine
            .execute(Op::PresenceSwitch, None, Duration::from_millis(200))
            .unwrap();
        assert_eq!(value, Value::Bool(true));
        assert_eq!(engine.with_state(|s| s.motion), 2);
    }

    #[test]
    fn test_unsolicited_reply_still_updates_mirror() {
        let engine = Engine::<R60Amp1>::new(Scripted::default(), Settings::default());
        engine.inject(&Frame::new(0x80, 0x81, vec![1]));
        assert_eq!(engine.with_state(|s| s.presence), 1);
        assert_eq!(engine.operation_stats().unsolicited, 1);
    }
}
