//! R60AFD1 fall detection radar.
//!
//! Wall or ceiling mounted. The installation geometry has to be known for
//! the fall algorithm to work, so it is applied first at start-up, then
//! presence and its reporting options, then the fall and static stay
//! parameters.
//!
//! Payload layouts of the set calls:
//!
//! | Parameter                                  | Encoding                   |
//! |--------------------------------------------|----------------------------|
//! | install angle                              | 3 x sign-magnitude 16 bit  |
//! | install height, distances, break height    | big endian u16             |
//! | times, durations, threshold, frequency     | big endian u32             |
//! | fall sensitivity                           | u8                         |

use std::time::Duration;

use mmwave_core::models::r60afd1::{Op, R60Afd1, State};
use mmwave_core::protocol::decode::encode_sign_magnitude;
use mmwave_core::status::{FallStatus, MotionStatus, PresenceStatus, StaticStayStatus};
use mmwave_core::value::HeightRatio;
use mmwave_core::Value;
use serde::{Deserialize, Serialize};

use super::{check_arg, unexpected, RadarDevice};
use crate::error::OperationError;
use crate::init::{ConfigStep, FeatureConfig, VerifyCheck};
use crate::settings::{check_range, SettingsError};

pub type R60Afd1Device = RadarDevice<R60Afd1, Afd1Config>;

/// Sign-magnitude keeps 15 bits for the value
pub const INSTALL_ANGLE: (i64, i64) = (-0x7FFF, 0x7FFF);
pub const DISTANCE: (i64, i64) = (0, 300);
/// Seconds; the module rejects the end points
pub const NO_PERSON_TIME: (i64, i64) = (6, 1799);
pub const FALL_DURATION: (i64, i64) = (6, 179);
pub const STATIC_STAY_DURATION: (i64, i64) = (61, 3599);
pub const HEIGHT_ACCUMULATION: (i64, i64) = (0, 300);
pub const FALL_BREAK_HEIGHT: (i64, i64) = (0, 150);
pub const FALL_SENSITIVITY: (i64, i64) = (0, 3);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Afd1Config {
    pub presence_enabled: bool,
    pub track_report_enabled: bool,
    pub energy_report_enabled: bool,
    pub height_ratio_enabled: bool,
    pub fall_detection_enabled: bool,
    pub static_stay_enabled: bool,
    /// cm
    pub static_distance: u16,
    /// cm
    pub motion_distance: u16,
    /// Degrees (x, y, z); all zero leaves the module setting alone
    pub install_angle: [i16; 3],
    /// cm; zero leaves the module setting alone
    pub install_height: u16,
    /// Seconds
    pub track_report_frequency: u32,
    pub presence_threshold: u32,
    /// Seconds
    pub no_person_timeout: u32,
    pub fall_sensitivity: u8,
    /// Seconds
    pub fall_duration_threshold: u32,
    /// Seconds
    pub static_stay_duration: u32,
    /// Seconds
    pub height_accumulation_time: u32,
    /// cm
    pub fall_break_height: u16,
}

impl Default for Afd1Config {
    fn default() -> Self {
        Afd1Config {
            presence_enabled: true,
            track_report_enabled: true,
            energy_report_enabled: true,
            height_ratio_enabled: true,
            fall_detection_enabled: true,
            static_stay_enabled: true,
            static_distance: 30,
            motion_distance: 30,
            install_angle: [0, 0, 0],
            install_height: 0,
            track_report_frequency: 2,
            presence_threshold: 0,
            no_person_timeout: 30,
            fall_sensitivity: 3,
            fall_duration_threshold: 10,
            static_stay_duration: 300,
            height_accumulation_time: 0,
            fall_break_height: 0,
        }
    }
}

fn angle_payload(angle: [i16; 3]) -> Vec<u8> {
    angle.iter().flat_map(|a| encode_sign_magnitude(*a)).collect()
}

impl FeatureConfig<R60Afd1> for Afd1Config {
    type Current = Afd1Config;

    /// Zero means "not configured" for the timing values, so only non-zero
    /// values are range checked
    fn validate(&self) -> Result<(), SettingsError> {
        let (min, max) = INSTALL_ANGLE;
        for a in self.install_angle {
            check_range("install_angle", a as i64, min, max)?;
        }
        let (min, max) = DISTANCE;
        check_range("static_distance", self.static_distance as i64, min, max)?;
        check_range("motion_distance", self.motion_distance as i64, min, max)?;
        if self.no_person_timeout > 0 {
            let (min, max) = NO_PERSON_TIME;
            check_range("no_person_timeout", self.no_person_timeout as i64, min, max)?;
        }
        if self.fall_duration_threshold > 0 {
            let (min, max) = FALL_DURATION;
            check_range("fall_duration_threshold", self.fall_duration_threshold as i64, min, max)?;
        }
        if self.static_stay_duration > 0 {
            let (min, max) = STATIC_STAY_DURATION;
            check_range("static_stay_duration", self.static_stay_duration as i64, min, max)?;
        }
        let (min, max) = HEIGHT_ACCUMULATION;
        check_range("height_accumulation_time", self.height_accumulation_time as i64, min, max)?;
        let (min, max) = FALL_BREAK_HEIGHT;
        check_range("fall_break_height", self.fall_break_height as i64, min, max)?;
        let (min, max) = FALL_SENSITIVITY;
        check_range("fall_sensitivity", self.fall_sensitivity as i64, min, max)?;
        Ok(())
    }

    fn plan(&self) -> Vec<ConfigStep<Op>> {
        let mut steps = Vec::new();

        let [x, y, z] = self.install_angle;
        if self.install_angle != [0, 0, 0] {
            steps.push(ConfigStep::with_payload(
                format!("Set install angle (X:{}, Y:{}, Z:{})", x, y, z),
                Op::SetInstallAngle,
                angle_payload(self.install_angle),
            ));
        }
        if self.install_height > 0 {
            steps.push(ConfigStep::with_payload(
                format!("Set install height to {}cm", self.install_height),
                Op::SetInstallHeight,
                self.install_height.to_be_bytes().to_vec(),
            ));
        }

        if self.presence_enabled {
            steps.push(ConfigStep::new("Enable Human Presence Detection", Op::PresenceOn));
            if self.static_distance > 0 {
                steps.push(ConfigStep::with_payload(
                    format!("Set static distance to {}cm", self.static_distance),
                    Op::SetStaticDistance,
                    self.static_distance.to_be_bytes().to_vec(),
                ));
            }
            if self.motion_distance > 0 {
                steps.push(ConfigStep::with_payload(
                    format!("Set motion distance to {}cm", self.motion_distance),
                    Op::SetMotionDistance,
                    self.motion_distance.to_be_bytes().to_vec(),
                ));
            }
            if self.no_person_timeout > 0 {
                steps.push(ConfigStep::with_payload(
                    format!("Set no-person timeout to {} seconds", self.no_person_timeout),
                    Op::SetNoPersonTime,
                    self.no_person_timeout.to_be_bytes().to_vec(),
                ));
            }
            if self.presence_threshold > 0 {
                steps.push(ConfigStep::with_payload(
                    format!("Set presence threshold to {}", self.presence_threshold),
                    Op::SetPresenceThreshold,
                    self.presence_threshold.to_be_bytes().to_vec(),
                ));
            }
            if self.energy_report_enabled {
                steps.push(ConfigStep::new("Enable energy report", Op::EnergyReportOn));
            } else {
                steps.push(ConfigStep::new("Disable energy report", Op::EnergyReportOff));
            }
            if self.height_ratio_enabled {
                steps.push(ConfigStep::new("Enable height ratio reporting", Op::HeightRatioOn));
            } else {
                steps.push(ConfigStep::new("Disable height ratio reporting", Op::HeightRatioOff));
            }
            if self.track_report_enabled {
                steps.push(ConfigStep::new(
                    format!("Enable track reporting (frequency: {}s)", self.track_report_frequency),
                    Op::TrackOn,
                ));
                if self.track_report_frequency > 0 {
                    steps.push(ConfigStep::with_payload(
                        format!("Set track report frequency to {} seconds", self.track_report_frequency),
                        Op::SetTrackFrequency,
                        self.track_report_frequency.to_be_bytes().to_vec(),
                    ));
                }
            } else {
                steps.push(ConfigStep::new("Disable track reporting", Op::TrackOff));
            }
        } else {
            steps.push(ConfigStep::new("Disable Human Presence Detection", Op::PresenceOff));
        }

        if self.fall_detection_enabled {
            steps.push(ConfigStep::new("Enable Fall Detection", Op::FallOn));
            if self.fall_duration_threshold > 0 {
                steps.push(ConfigStep::with_payload(
                    format!("Set fall duration threshold to {} seconds", self.fall_duration_threshold),
                    Op::SetFallDuration,
                    self.fall_duration_threshold.to_be_bytes().to_vec(),
                ));
            }
            if self.fall_sensitivity > 0 {
                steps.push(ConfigStep::with_payload(
                    format!("Set fall sensitivity to {}", self.fall_sensitivity),
                    Op::SetFallSensitivity,
                    vec![self.fall_sensitivity],
                ));
            }
            steps.push(ConfigStep::with_payload(
                format!("Set fall break height to {}cm", self.fall_break_height),
                Op::SetFallBreakHeight,
                self.fall_break_height.to_be_bytes().to_vec(),
            ));
            steps.push(ConfigStep::with_payload(
                format!("Set height accumulation time to {} seconds", self.height_accumulation_time),
                Op::SetHeightAccumulation,
                self.height_accumulation_time.to_be_bytes().to_vec(),
            ));
            if self.static_stay_enabled {
                steps.push(ConfigStep::new("Enable Static Stay Detection", Op::StaticStayOn));
                if self.static_stay_duration > 0 {
                    steps.push(ConfigStep::with_payload(
                        format!("Set static stay duration to {} seconds", self.static_stay_duration),
                        Op::SetStaticStayDuration,
                        self.static_stay_duration.to_be_bytes().to_vec(),
                    ));
                }
            } else {
                steps.push(ConfigStep::new("Disable Static Stay Detection", Op::StaticStayOff));
            }
        } else {
            steps.push(ConfigStep::new("Disable Fall Detection", Op::FallOff));
        }
        steps
    }

    fn checks(&self) -> Vec<VerifyCheck<Op>> {
        let mut checks = vec![VerifyCheck::new("Device Initialization", Op::InitComplete, Some(true))];
        let switches = [
            (self.presence_enabled, "Human Presence Detection Switch", Op::PresenceSwitch),
            (self.track_report_enabled, "Track Reporting Switch", Op::TrackSwitch),
            (self.energy_report_enabled, "Energy Report Switch", Op::EnergyReportSwitch),
            (self.height_ratio_enabled, "Height Ratio Reporting Switch", Op::HeightRatioSwitch),
            (self.static_stay_enabled, "Static Stay Detection Switch", Op::StaticStaySwitch),
            (self.fall_detection_enabled, "Fall Detection Switch", Op::FallSwitch),
        ];
        for (enabled, name, op) in switches {
            if enabled {
                checks.push(VerifyCheck::new(name, op, Some(true)));
            }
        }
        checks
    }

    fn current(&self, state: &State) -> Afd1Config {
        Afd1Config {
            presence_enabled: state.presence_enabled,
            track_report_enabled: state.track_enabled,
            energy_report_enabled: state.energy_report_enabled,
            height_ratio_enabled: state.height_ratio_enabled,
            fall_detection_enabled: state.fall_enabled,
            static_stay_enabled: state.static_stay_enabled,
            ..self.clone()
        }
    }
}

impl RadarDevice<R60Afd1, Afd1Config> {
    pub fn query_scene_info(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::SceneInfo, timeout)
    }

    // -------------------------------------------------------------------------
    // Installation
    // -------------------------------------------------------------------------

    /// Installation angle (x, y, z) in degrees
    pub fn set_install_angle(&self, angle: [i16; 3], timeout: Option<Duration>) -> Result<[i16; 3], OperationError> {
        let (min, max) = INSTALL_ANGLE;
        for a in angle {
            check_arg("install angle", a as i64, min, max)?;
        }
        let reply = self.set(Op::SetInstallAngle, &angle_payload(angle), timeout)?;
        match reply {
            Value::Vector(v) => Ok(v),
            other => Err(unexpected(Op::SetInstallAngle, &other)),
        }
    }

    pub fn query_install_angle(&self, timeout: Option<Duration>) -> Result<[i16; 3], OperationError> {
        match self.query(Op::InstallAngle, timeout)? {
            Value::Vector(v) => Ok(v),
            other => Err(unexpected(Op::InstallAngle, &other)),
        }
    }

    /// Any height a u16 can carry, in cm
    pub fn set_install_height(&self, height: u16, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.set_u16(Op::SetInstallHeight, height, timeout)
    }

    pub fn query_install_height(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::InstallHeight, timeout)
    }

    /// Let the module measure its own height, in cm
    pub fn auto_measure_height(&self, timeout: Option<Duration>) -> Result<i16, OperationError> {
        self.query_i16(Op::AutoHeight, timeout)
    }

    // -------------------------------------------------------------------------
    // Presence
    // -------------------------------------------------------------------------

    pub fn set_presence_switch(&self, enabled: bool, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(if enabled { Op::PresenceOn } else { Op::PresenceOff }, timeout)
    }

    pub fn query_presence_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::PresenceSwitch, timeout)
    }

    pub fn query_presence_status(&self, timeout: Option<Duration>) -> Result<PresenceStatus, OperationError> {
        self.query_status(Op::PresenceStatus, "presence status", timeout)
    }

    pub fn query_motion_status(&self, timeout: Option<Duration>) -> Result<MotionStatus, OperationError> {
        self.query_status(Op::MotionStatus, "motion status", timeout)
    }

    pub fn query_body_motion_param(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::BodyMotion, timeout)
    }

    pub fn set_static_distance(&self, cm: u16, timeout: Option<Duration>) -> Result<u16, OperationError> {
        let (min, max) = DISTANCE;
        check_arg("static distance", cm as i64, min, max)?;
        self.set_u16(Op::SetStaticDistance, cm, timeout)
    }

    pub fn query_static_distance(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::StaticDistance, timeout)
    }

    pub fn set_motion_distance(&self, cm: u16, timeout: Option<Duration>) -> Result<u16, OperationError> {
        let (min, max) = DISTANCE;
        check_arg("motion distance", cm as i64, min, max)?;
        self.set_u16(Op::SetMotionDistance, cm, timeout)
    }

    pub fn query_motion_distance(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::MotionDistance, timeout)
    }

    pub fn set_no_person_time(&self, seconds: u32, timeout: Option<Duration>) -> Result<u32, OperationError> {
        let (min, max) = NO_PERSON_TIME;
        check_arg("no person time", seconds as i64, min, max)?;
        self.set_u32(Op::SetNoPersonTime, seconds, timeout)
    }

    pub fn query_no_person_time(&self, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.query_u32(Op::NoPersonTime, timeout)
    }

    pub fn set_presence_threshold(&self, threshold: u32, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.set_u32(Op::SetPresenceThreshold, threshold, timeout)
    }

    pub fn query_presence_threshold(&self, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.query_u32(Op::PresenceThreshold, timeout)
    }

    pub fn set_energy_report_switch(&self, enabled: bool, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(if enabled { Op::EnergyReportOn } else { Op::EnergyReportOff }, timeout)
    }

    pub fn query_energy_report_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::EnergyReportSwitch, timeout)
    }

    pub fn query_max_energy(&self, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.query_u32(Op::MaxEnergy, timeout)
    }

    // -------------------------------------------------------------------------
    // Fall detection
    // -------------------------------------------------------------------------

    pub fn set_fall_detection_switch(&self, enabled: bool, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(if enabled { Op::FallOn } else { Op::FallOff }, timeout)
    }

    pub fn query_fall_detection_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::FallSwitch, timeout)
    }

    pub fn query_fall_status(&self, timeout: Option<Duration>) -> Result<FallStatus, OperationError> {
        self.query_status(Op::FallStatus, "fall status", timeout)
    }

    pub fn set_fall_duration(&self, seconds: u32, timeout: Option<Duration>) -> Result<u32, OperationError> {
        let (min, max) = FALL_DURATION;
        check_arg("fall duration", seconds as i64, min, max)?;
        self.set_u32(Op::SetFallDuration, seconds, timeout)
    }

    pub fn query_fall_duration(&self, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.query_u32(Op::FallDuration, timeout)
    }

    pub fn set_fall_sensitivity(&self, sensitivity: u8, timeout: Option<Duration>) -> Result<u8, OperationError> {
        let (min, max) = FALL_SENSITIVITY;
        check_arg("fall sensitivity", sensitivity as i64, min, max)?;
        let reply = self.set(Op::SetFallSensitivity, &[sensitivity], timeout)?;
        reply.as_u8().ok_or_else(|| unexpected(Op::SetFallSensitivity, &reply))
    }

    pub fn query_fall_sensitivity(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::FallSensitivity, timeout)
    }

    pub fn set_fall_break_height(&self, cm: u16, timeout: Option<Duration>) -> Result<u16, OperationError> {
        let (min, max) = FALL_BREAK_HEIGHT;
        check_arg("fall break height", cm as i64, min, max)?;
        self.set_u16(Op::SetFallBreakHeight, cm, timeout)
    }

    pub fn query_fall_break_height(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::FallBreakHeight, timeout)
    }

    pub fn set_height_accumulation_time(&self, seconds: u32, timeout: Option<Duration>) -> Result<u32, OperationError> {
        let (min, max) = HEIGHT_ACCUMULATION;
        check_arg("height accumulation time", seconds as i64, min, max)?;
        self.set_u32(Op::SetHeightAccumulation, seconds, timeout)
    }

    pub fn query_height_accumulation_time(&self, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.query_u32(Op::HeightAccumulation, timeout)
    }

    // -------------------------------------------------------------------------
    // Static stay
    // -------------------------------------------------------------------------

    pub fn set_static_stay_switch(&self, enabled: bool, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(if enabled { Op::StaticStayOn } else { Op::StaticStayOff }, timeout)
    }

    pub fn query_static_stay_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::StaticStaySwitch, timeout)
    }

    pub fn query_static_stay_status(&self, timeout: Option<Duration>) -> Result<StaticStayStatus, OperationError> {
        self.query_status(Op::StaticStayStatus, "static stay status", timeout)
    }

    pub fn set_static_stay_duration(&self, seconds: u32, timeout: Option<Duration>) -> Result<u32, OperationError> {
        let (min, max) = STATIC_STAY_DURATION;
        check_arg("static stay duration", seconds as i64, min, max)?;
        self.set_u32(Op::SetStaticStayDuration, seconds, timeout)
    }

    pub fn query_static_stay_duration(&self, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.query_u32(Op::StaticStayDuration, timeout)
    }

    // -------------------------------------------------------------------------
    // Height ratio and tracking
    // -------------------------------------------------------------------------

    pub fn set_height_ratio_switch(&self, enabled: bool, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(if enabled { Op::HeightRatioOn } else { Op::HeightRatioOff }, timeout)
    }

    pub fn query_height_ratio_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::HeightRatioSwitch, timeout)
    }

    pub fn query_height_ratio(&self, timeout: Option<Duration>) -> Result<HeightRatio, OperationError> {
        match self.query(Op::HeightRatio, timeout)? {
            Value::HeightRatio(ratio) => Ok(ratio),
            other => Err(unexpected(Op::HeightRatio, &other)),
        }
    }

    pub fn set_track_switch(&self, enabled: bool, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(if enabled { Op::TrackOn } else { Op::TrackOff }, timeout)
    }

    pub fn query_track_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::TrackSwitch, timeout)
    }

    /// Last track point (x, y) in cm
    pub fn query_track_point(&self, timeout: Option<Duration>) -> Result<(i16, i16), OperationError> {
        match self.query(Op::TrackPoint, timeout)? {
            Value::Point { x, y } => Ok((x, y)),
            other => Err(unexpected(Op::TrackPoint, &other)),
        }
    }

    pub fn set_track_frequency(&self, seconds: u32, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.set_u32(Op::SetTrackFrequency, seconds, timeout)
    }

    pub fn query_track_frequency(&self, timeout: Option<Duration>) -> Result<u32, OperationError> {
        self.query_u32(Op::TrackFrequency, timeout)
    }

    fn set_u16(&self, op: Op, value: u16, timeout: Option<Duration>) -> Result<u16, OperationError> {
        let reply = self.set(op, &value.to_be_bytes(), timeout)?;
        reply.as_u16().ok_or_else(|| unexpected(op, &reply))
    }

    fn set_u32(&self, op: Op, value: u32, timeout: Option<Duration>) -> Result<u32, OperationError> {
        let reply = self.set(op, &value.to_be_bytes(), timeout)?;
        reply.as_u32().ok_or_else(|| unexpected(op, &reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_order() {
        let plan = Afd1Config::default().plan();
        let ops: Vec<Op> = plan.iter().map(|s| s.operation).collect();
        assert_eq!(
            ops,
            vec![
                Op::PresenceOn,
                Op::SetStaticDistance,
                Op::SetMotionDistance,
                Op::SetNoPersonTime,
                Op::EnergyReportOn,
                Op::HeightRatioOn,
                Op::TrackOn,
                Op::SetTrackFrequency,
                Op::FallOn,
                Op::SetFallDuration,
                Op::SetFallSensitivity,
                Op::SetFallBreakHeight,
                Op::SetHeightAccumulation,
                Op::StaticStayOn,
                Op::SetStaticStayDuration,
            ]
        );
        assert_eq!(plan[0].name, "Enable Human Presence Detection");
        assert_eq!(plan[3].payload, Some(vec![0, 0, 0, 30]));
    }

    #[test]
    fn test_installation_steps() {
        let config = Afd1Config {
            install_angle: [0, -5, 10],
            install_height: 250,
            presence_enabled: false,
            fall_detection_enabled: false,
            ..Default::default()
        };
        let plan = config.plan();
        assert_eq!(plan[0].name, "Set install angle (X:0, Y:-5, Z:10)");
        assert_eq!(plan[0].payload, Some(vec![0x00, 0x00, 0x80, 0x05, 0x00, 0x0A]));
        assert_eq!(plan[1].payload, Some(vec![0x00, 0xFA]));
        assert_eq!(plan.len(), 4);
        assert_eq!(plan[3].operation, Op::FallOff);
    }

    #[test]
    fn test_checks() {
        let checks = Afd1Config::default().checks();
        assert_eq!(checks.len(), 7);
        assert_eq!(checks[2].name, "Track Reporting Switch");
    }

    #[test]
    fn test_validate_exclusive_bounds() {
        assert!(Afd1Config::default().validate().is_ok());
        let config = Afd1Config {
            fall_duration_threshold: 180,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = Afd1Config {
            static_stay_duration: 60,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SettingsError::TooLow { min: 61, .. })));
    }
}
