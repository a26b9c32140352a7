mod common;

use common::{answer, fast_settings, init_logging, MockTransport};
use mmwave_core::Frame;
use mmwave_driver::{
    Abd1Config, Afd1Config, Amp1Config, DeviceError, R60Abd1Device, R60Afd1Device, R60Amp1Device,
    Settings,
};

#[test]
fn test_healthy_module_initializes_cleanly() {
    init_logging();
    let io = MockTransport::answering("R60AMP1");
    let radar = R60Amp1Device::new(io.clone(), Amp1Config::default(), fast_settings()).unwrap();

    let status = radar.configuration_status();
    assert!(status.initialization_complete);
    assert!(status.configuration_errors.is_empty(), "{:?}", status.configuration_errors);
    assert_eq!(status.device_info.product_model, "R60AMP1");
    assert_eq!(status.device_info.firmware_version, "V1.0.3");
    assert!(status.current_settings.presence_enabled);

    // Identity, readiness, the presence switch and the two checks
    assert_eq!(
        io.sent_keys(),
        vec![
            (0x02, 0xA1),
            (0x02, 0xA2),
            (0x02, 0xA3),
            (0x02, 0xA4),
            (0x05, 0x81),
            (0x80, 0x00),
            (0x05, 0x81),
            (0x80, 0x80),
        ]
    );
    assert_eq!(io.sent_count((0x01, 0x02)), 0);
}

#[test]
fn test_never_ready_resets_once_then_fails() {
    init_logging();
    let io = MockTransport::new(|frame: &Frame| {
        if frame.key() == (0x05, 0x81) {
            Vec::new()
        } else {
            answer("R60AMP1", frame)
        }
    });
    let result = R60Amp1Device::new(io.clone(), Amp1Config::default(), fast_settings());

    match result {
        Err(DeviceError::Initialization(reason)) => {
            assert_eq!(reason, "Device initialization failed even after reset")
        }
        Err(e) => panic!("unexpected error {}", e),
        Ok(_) => panic!("initialization should fail"),
    }
    assert_eq!(io.sent_count((0x01, 0x02)), 1);
    // Nothing is configured on a module that never became ready
    assert_eq!(io.sent_count((0x80, 0x00)), 0);
}

#[test]
fn test_no_identity_is_fatal() {
    init_logging();
    let io = MockTransport::silent();
    let result = R60Amp1Device::new(io.clone(), Amp1Config::default(), fast_settings());

    assert!(matches!(result, Err(DeviceError::Initialization(_))));
    assert_eq!(io.sent_keys().len(), 4);
}

#[test]
fn test_partial_identity_is_logged() {
    init_logging();
    let io = MockTransport::new(|frame: &Frame| {
        if frame.key() == (0x02, 0xA2) {
            Vec::new()
        } else {
            answer("R60AMP1", frame)
        }
    });
    let radar = R60Amp1Device::new(io, Amp1Config::default(), fast_settings()).unwrap();
    assert_eq!(radar.errors(), ["Failed to load Product ID"]);
    assert!(radar.configuration_status().device_info.product_id.is_empty());
}

#[test]
fn test_ready_after_reset() {
    init_logging();
    let mut reset = false;
    let io = MockTransport::new(move |frame: &Frame| match frame.key() {
        (0x01, 0x02) => {
            reset = true;
            answer("R60AMP1", frame)
        }
        (0x05, 0x81) => vec![Frame::new(0x05, 0x81, vec![u8::from(reset)])],
        _ => answer("R60AMP1", frame),
    });
    let radar = R60Amp1Device::new(io.clone(), Amp1Config::default(), fast_settings()).unwrap();
    assert!(radar.errors().is_empty());
    assert_eq!(io.sent_count((0x01, 0x02)), 1);
    assert!(radar.state().system.initialized);
}

#[test]
fn test_failed_step_and_verification_are_not_fatal() {
    init_logging();
    let io = MockTransport::new(|frame: &Frame| match frame.key() {
        (0x85, 0x00) | (0x85, 0x80) => Vec::new(),
        (0x81, 0x80) => vec![Frame::new(0x81, 0x80, vec![0])],
        _ => answer("R60ABD1", frame),
    });
    let radar = R60Abd1Device::new(io, Abd1Config::default(), fast_settings()).unwrap();

    assert!(radar.is_initialized());
    assert_eq!(
        radar.errors(),
        [
            "Failed to Enable Heart Rate Monitor",
            "Verification failed: Heart Rate Monitor",
            "Verification failed: Breath Monitor",
        ]
    );
}

#[test]
fn test_abd1_configuration_reaches_mirror() {
    init_logging();
    let config = Abd1Config {
        abnormal_struggle_enabled: true,
        struggle_sensitivity: 2,
        no_person_timing_enabled: true,
        no_person_timing_duration: 60,
        sleep_cutoff_duration: 30,
        ..Default::default()
    };
    let radar = R60Abd1Device::new(MockTransport::answering("R60ABD1"), config, fast_settings()).unwrap();
    assert!(radar.errors().is_empty(), "{:?}", radar.errors());

    let state = radar.state();
    assert!(state.heart_rate_enabled);
    assert!(!state.heart_rate_waveform_enabled);
    assert!(state.struggle_enabled);
    assert_eq!(state.struggle_sensitivity, 2);
    assert_eq!(state.no_person_timing_duration, 60);
    assert_eq!(state.sleep_end_duration, 30);

    let current = radar.configuration_status().current_settings;
    assert!(current.sleep_monitoring_enabled);
    assert_eq!(current.no_person_timing_duration, 60);
}

#[test]
fn test_afd1_configuration_reaches_mirror() {
    init_logging();
    let config = Afd1Config {
        install_angle: [0, -5, 10],
        install_height: 250,
        ..Default::default()
    };
    let radar = R60Afd1Device::new(MockTransport::answering("R60AFD1"), config, fast_settings()).unwrap();
    assert!(radar.errors().is_empty(), "{:?}", radar.errors());

    let state = radar.state();
    assert_eq!(state.install_angle, [0, -5, 10]);
    assert_eq!(state.install_height, 250);
    assert_eq!(state.static_distance, 30);
    assert_eq!(state.no_person_time, 30);
    assert_eq!(state.fall_duration, 10);
    assert_eq!(state.fall_sensitivity, 3);
    assert_eq!(state.static_stay_duration, 300);
    assert_eq!(state.track_frequency, 2);
    assert!(state.track_enabled && state.fall_enabled && state.static_stay_enabled);
}

#[test]
fn test_invalid_settings_send_nothing() {
    let io = MockTransport::answering("R60AMP1");
    let settings = Settings {
        parse_interval_ms: 600,
        ..Default::default()
    };
    let result = R60Amp1Device::new(io.clone(), Amp1Config::default(), settings);
    assert!(matches!(result, Err(DeviceError::Settings(_))));
    assert!(io.sent().is_empty());

    let config = Abd1Config {
        struggle_sensitivity: 3,
        ..Default::default()
    };
    let io = MockTransport::answering("R60ABD1");
    assert!(R60Abd1Device::new(io.clone(), config, fast_settings()).is_err());
    assert!(io.sent().is_empty());
}
