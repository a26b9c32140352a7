mod common;

use std::thread;
use std::time::{Duration, Instant};

use common::{answer, fast_settings, init_logging, MockTransport};
use mmwave_core::models::r60amp1::{Op, R60Amp1};
use mmwave_core::status::MotionStatus;
use mmwave_core::{Frame, StatusError, Value};
use mmwave_driver::{
    Abd1Config, Afd1Config, Amp1Config, Engine, OperationError, R60Abd1Device, R60Afd1Device,
    R60Amp1Device,
};

fn amp1(io: &MockTransport) -> R60Amp1Device {
    R60Amp1Device::new(io.clone(), Amp1Config::default(), fast_settings()).unwrap()
}

#[test]
fn test_telemetry_before_reply() {
    init_logging();
    let io = MockTransport::new(|frame: &Frame| match frame.key() {
        (0x80, 0x82) => vec![
            Frame::new(0x80, 0x01, vec![1]),
            Frame::new(0x80, 0x82, vec![2]),
        ],
        _ => answer("R60AMP1", frame),
    });
    let radar = amp1(&io);

    assert_eq!(radar.query_motion_info(None), Ok(MotionStatus::Active));
    let state = radar.state();
    assert_eq!(state.presence, 1);
    assert_eq!(state.motion, 2);
}

#[test]
fn test_reply_to_other_operation_does_not_complete() {
    init_logging();
    let io = MockTransport::new(|frame: &Frame| match frame.key() {
        (0x80, 0x81) => vec![Frame::new(0x80, 0x82, vec![1])],
        _ => answer("R60AMP1", frame),
    });
    let radar = amp1(&io);

    let result = radar.query_presence_status(Some(Duration::from_millis(100)));
    assert_eq!(
        result,
        Err(OperationError::Timeout {
            operation: "Presence Status",
            timeout_ms: 100
        })
    );
    // The stray frame still reached the mirror
    assert_eq!(radar.state().motion, 1);
}

#[test]
fn test_invalid_status_is_fault() {
    init_logging();
    let io = MockTransport::new(|frame: &Frame| match frame.key() {
        (0x80, 0x82) => vec![Frame::new(0x80, 0x82, vec![7])],
        _ => answer("R60AMP1", frame),
    });
    let radar = amp1(&io);

    let err = radar.query_motion_info(None).unwrap_err();
    assert!(err.is_fault());
    assert!(matches!(err, OperationError::InvalidStatus(StatusError { value: 7, .. })));
}

#[test]
fn test_second_operation_is_busy() {
    init_logging();
    let io = MockTransport::silent();
    let engine = Engine::<R60Amp1>::new(io.clone(), fast_settings());
    engine.start().unwrap();

    thread::scope(|s| {
        let first = s.spawn(|| engine.execute(Op::PresenceSwitch, None, Duration::from_millis(400)));
        thread::sleep(Duration::from_millis(100));

        let second = engine.execute(Op::MotionStatus, None, Duration::from_millis(100));
        assert_eq!(
            second,
            Err(OperationError::Busy {
                requested: "Motion Info",
                in_flight: "Human Presence Switch"
            })
        );
        assert!(matches!(first.join().unwrap(), Err(OperationError::Timeout { .. })));
    });

    assert_eq!(io.sent_keys(), vec![(0x80, 0x80)]);
    assert_eq!(engine.operation_stats().rejected_busy, 1);
    engine.stop();
}

#[test]
fn test_timeout_is_bounded_and_restores_poller() {
    init_logging();
    let engine = Engine::<R60Amp1>::new(MockTransport::silent(), fast_settings());
    engine.start().unwrap();

    let timeout = Duration::from_millis(150);
    // One poll interval plus room for the scheduler
    let bound = timeout + engine.settings().parse_interval() + Duration::from_millis(30);

    let started = Instant::now();
    let result = engine.execute(Op::PresenceStatus, None, timeout);
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(OperationError::Timeout { timeout_ms: 150, .. })));
    assert!(elapsed >= timeout);
    assert!(elapsed <= bound, "took {:?}, bound {:?}", elapsed, bound);
    assert!(engine.is_running());

    // The slot is free again
    let result = engine.execute(Op::PresenceStatus, None, Duration::from_millis(20));
    assert!(matches!(result, Err(OperationError::Timeout { .. })));
    engine.stop();
}

#[test]
fn test_silent_wait_leaves_mirror_and_slot_alone() {
    init_logging();
    let io = MockTransport::answering("R60AMP1");
    let radar = amp1(&io);
    let engine = radar.engine();
    let state = engine.state();
    let stats = engine.operation_stats();

    // Every wait-loop drain of a silent port comes back empty
    let silent = MockTransport::silent();
    let quiet = Engine::<R60Amp1>::new(silent, fast_settings());
    let quiet_state = quiet.state();
    let quiet_stats = quiet.operation_stats();
    let result = quiet.execute(Op::PresenceStatus, None, Duration::from_millis(50));
    assert!(matches!(result, Err(OperationError::Timeout { .. })));
    assert_eq!(quiet.state(), quiet_state);
    let after = quiet.operation_stats();
    assert_eq!(after.started, quiet_stats.started + 1);
    assert_eq!(after.completed, quiet_stats.completed);
    assert_eq!(after.unsolicited, quiet_stats.unsolicited);
    // Nothing is left pending
    assert!(quiet.execute(Op::PresenceStatus, None, Duration::from_millis(10)).is_err());
    assert_eq!(quiet.operation_stats().rejected_busy, 0);

    // The running device is untouched by a poll of an empty port
    thread::sleep(Duration::from_millis(60));
    assert_eq!(engine.state(), state);
    assert_eq!(engine.operation_stats(), stats);
}

#[test]
fn test_execute_without_poller() {
    init_logging();
    let engine = Engine::<R60Amp1>::new(MockTransport::answering("R60AMP1"), fast_settings());
    assert!(!engine.is_running());
    assert_eq!(
        engine.execute(Op::PresenceSwitch, None, Duration::from_millis(100)),
        Ok(Value::Bool(true))
    );
    assert!(!engine.is_running());
}

#[test]
fn test_set_echo_updates_mirror() {
    init_logging();
    let io = MockTransport::answering("R60ABD1");
    let radar = R60Abd1Device::new(io.clone(), Abd1Config::default(), fast_settings()).unwrap();

    for threshold in [12, 15, 20] {
        assert_eq!(radar.set_low_breath_threshold(threshold, None), Ok(threshold));
        assert_eq!(radar.state().low_breath_threshold, threshold);
        assert_eq!(io.sent().last().unwrap().data, vec![threshold]);
    }

    assert_eq!(radar.set_sleep_end_duration(45, None), Ok(45));
    assert_eq!(radar.state().sleep_end_duration, 45);
}

#[test]
fn test_out_of_range_sends_nothing() {
    init_logging();
    let io = MockTransport::answering("R60ABD1");
    let radar = R60Abd1Device::new(io.clone(), Abd1Config::default(), fast_settings()).unwrap();
    let before = io.sent().len();

    assert_eq!(
        radar.set_low_breath_threshold(25, None),
        Err(OperationError::OutOfRange {
            name: "low breath threshold",
            value: 25,
            min: 10,
            max: 20
        })
    );
    assert!(matches!(
        radar.set_no_person_timing_duration(35, None),
        Err(OperationError::OffStep { step: 10, .. })
    ));
    assert!(matches!(
        radar.set_struggle_sensitivity(3, None),
        Err(OperationError::OutOfRange { .. })
    ));
    assert_eq!(io.sent().len(), before);
}

#[test]
fn test_afd1_install_angle_round_trip() {
    init_logging();
    let io = MockTransport::answering("R60AFD1");
    let radar = R60Afd1Device::new(io.clone(), Afd1Config::default(), fast_settings()).unwrap();

    assert_eq!(radar.set_install_angle([0, -5, 10], None), Ok([0, -5, 10]));
    assert_eq!(io.sent().last().unwrap().data, vec![0x00, 0x00, 0x80, 0x05, 0x00, 0x0A]);
    assert_eq!(radar.state().install_angle, [0, -5, 10]);

    let before = io.sent().len();
    assert!(matches!(
        radar.set_fall_duration(180, None),
        Err(OperationError::OutOfRange { .. })
    ));
    assert_eq!(io.sent().len(), before);
}

#[test]
fn test_close_applies_buffered_frames() {
    init_logging();
    let io = MockTransport::answering("R60AMP1");
    let mut radar = amp1(&io);

    io.inject(Frame::new(0x80, 0x01, vec![1]));
    let stats = radar.close();
    assert_eq!(radar.state().presence, 1);
    assert!(stats.total_frames_parsed > 0);

    let again = radar.close();
    assert_eq!(again.total_frames_parsed, stats.total_frames_parsed);
}
