//! R60ABD1 breathing, heart rate and sleep radar.
//!
//! Three monitors sit behind their own switches. At start-up each one is
//! switched to the configured position; the waveform streams and the sleep
//! sub-features are only touched when their parent monitor is enabled.

use std::time::Duration;

use mmwave_core::models::r60abd1::{Op, R60Abd1, State};
use mmwave_core::status::{
    BedStatus, BreathInfo, MotionStatus, NoPersonStatus, PresenceStatus, SleepAnomaly,
    SleepQuality, SleepStatus, StruggleStatus,
};
use mmwave_core::value::{SleepStatistics, SleepSummary};
use mmwave_core::Value;
use serde::{Deserialize, Serialize};

use super::{check_arg, unexpected, RadarDevice};
use crate::error::OperationError;
use crate::init::{ConfigStep, FeatureConfig, VerifyCheck};
use crate::settings::{check_range, check_step, SettingsError};

pub type R60Abd1Device = RadarDevice<R60Abd1, Abd1Config>;

pub const LOW_BREATH_THRESHOLD: (i64, i64) = (10, 20);
/// 0 low, 1 medium, 2 high
pub const STRUGGLE_SENSITIVITY: (i64, i64) = (0, 2);
/// Minutes, in steps of [`NO_PERSON_TIMING_STEP`]
pub const NO_PERSON_TIMING_DURATION: (i64, i64) = (30, 180);
pub const NO_PERSON_TIMING_STEP: i64 = 10;
/// Minutes
pub const SLEEP_END_DURATION: (i64, i64) = (5, 120);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Abd1Config {
    pub presence_enabled: bool,
    pub heart_rate_enabled: bool,
    pub heart_rate_waveform_enabled: bool,
    pub breath_monitoring_enabled: bool,
    pub breath_waveform_enabled: bool,
    pub sleep_monitoring_enabled: bool,
    pub abnormal_struggle_enabled: bool,
    pub struggle_sensitivity: u8,
    pub no_person_timing_enabled: bool,
    pub no_person_timing_duration: u8,
    pub sleep_cutoff_duration: u8,
}

impl Default for Abd1Config {
    fn default() -> Self {
        Abd1Config {
            presence_enabled: true,
            heart_rate_enabled: true,
            heart_rate_waveform_enabled: false,
            breath_monitoring_enabled: true,
            breath_waveform_enabled: false,
            sleep_monitoring_enabled: true,
            abnormal_struggle_enabled: false,
            struggle_sensitivity: 1,
            no_person_timing_enabled: false,
            no_person_timing_duration: 30,
            sleep_cutoff_duration: 120,
        }
    }
}

fn toggle(steps: &mut Vec<ConfigStep<Op>>, enabled: bool, feature: &str, on: Op, off: Op) {
    if enabled {
        steps.push(ConfigStep::new(format!("Enable {}", feature), on));
    } else {
        steps.push(ConfigStep::new(format!("Disable {}", feature), off));
    }
}

impl FeatureConfig<R60Abd1> for Abd1Config {
    /// Switch positions come from the mirror, tuning values from the configuration
    type Current = Abd1Config;

    fn validate(&self) -> Result<(), SettingsError> {
        let (min, max) = STRUGGLE_SENSITIVITY;
        check_range("struggle_sensitivity", self.struggle_sensitivity as i64, min, max)?;
        let (min, max) = NO_PERSON_TIMING_DURATION;
        check_range("no_person_timing_duration", self.no_person_timing_duration as i64, min, max)?;
        check_step(
            "no_person_timing_duration",
            self.no_person_timing_duration as i64,
            NO_PERSON_TIMING_STEP,
        )?;
        let (min, max) = SLEEP_END_DURATION;
        check_range("sleep_cutoff_duration", self.sleep_cutoff_duration as i64, min, max)?;
        Ok(())
    }

    fn plan(&self) -> Vec<ConfigStep<Op>> {
        let mut steps = Vec::new();
        toggle(&mut steps, self.presence_enabled, "Human Presence", Op::PresenceOn, Op::PresenceOff);

        toggle(&mut steps, self.heart_rate_enabled, "Heart Rate Monitor", Op::HeartRateOn, Op::HeartRateOff);
        if self.heart_rate_enabled {
            toggle(
                &mut steps,
                self.heart_rate_waveform_enabled,
                "Heart Rate Waveform Report",
                Op::HeartRateWaveformOn,
                Op::HeartRateWaveformOff,
            );
        }

        toggle(&mut steps, self.breath_monitoring_enabled, "Breath Monitor", Op::BreathOn, Op::BreathOff);
        if self.breath_monitoring_enabled {
            toggle(
                &mut steps,
                self.breath_waveform_enabled,
                "Breath Waveform Report",
                Op::BreathWaveformOn,
                Op::BreathWaveformOff,
            );
        }

        toggle(&mut steps, self.sleep_monitoring_enabled, "Sleep Monitor", Op::SleepOn, Op::SleepOff);
        if self.sleep_monitoring_enabled {
            toggle(
                &mut steps,
                self.abnormal_struggle_enabled,
                "Abnormal Struggle Monitor",
                Op::StruggleOn,
                Op::StruggleOff,
            );
            if self.abnormal_struggle_enabled {
                steps.push(ConfigStep::with_payload(
                    "Set Struggle Sensitivity",
                    Op::SetStruggleSensitivity,
                    vec![self.struggle_sensitivity],
                ));
            }
            toggle(
                &mut steps,
                self.no_person_timing_enabled,
                "No Person Timing",
                Op::NoPersonTimingOn,
                Op::NoPersonTimingOff,
            );
            if self.no_person_timing_enabled {
                steps.push(ConfigStep::with_payload(
                    "Set No Person Timing Duration",
                    Op::SetNoPersonTimingDuration,
                    vec![self.no_person_timing_duration],
                ));
            }
            steps.push(ConfigStep::with_payload(
                "Set Sleep End Duration",
                Op::SetSleepEndDuration,
                vec![self.sleep_cutoff_duration],
            ));
        }
        steps
    }

    fn checks(&self) -> Vec<VerifyCheck<Op>> {
        let mut checks = vec![
            VerifyCheck::new("Device Initialization", Op::InitComplete, Some(true)),
            VerifyCheck::new("Radar Range", Op::RadarRangeBoundary, None),
        ];
        let monitors = [
            (self.presence_enabled, "Presence Detection", Op::PresenceSwitch),
            (self.heart_rate_enabled, "Heart Rate Monitor", Op::HeartRateSwitch),
            (self.breath_monitoring_enabled, "Breath Monitor", Op::BreathSwitch),
            (self.sleep_monitoring_enabled, "Sleep Monitor", Op::SleepSwitch),
        ];
        for (enabled, name, op) in monitors {
            if enabled {
                checks.push(VerifyCheck::new(name, op, Some(true)));
            }
        }
        checks
    }

    fn current(&self, state: &State) -> Abd1Config {
        Abd1Config {
            presence_enabled: state.presence_enabled,
            heart_rate_enabled: state.heart_rate_enabled,
            heart_rate_waveform_enabled: state.heart_rate_waveform_enabled,
            breath_monitoring_enabled: state.breath_enabled,
            breath_waveform_enabled: state.breath_waveform_enabled,
            sleep_monitoring_enabled: state.sleep_enabled,
            abnormal_struggle_enabled: state.struggle_enabled,
            no_person_timing_enabled: state.no_person_timing_enabled,
            ..self.clone()
        }
    }
}

impl RadarDevice<R60Abd1, Abd1Config> {
    /// True when the target is outside the detection range
    pub fn query_radar_range_boundary(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::RadarRangeBoundary, timeout)
    }

    // -------------------------------------------------------------------------
    // Presence
    // -------------------------------------------------------------------------

    pub fn enable_human_presence(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::PresenceOn, timeout)
    }

    pub fn disable_human_presence(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::PresenceOff, timeout)
    }

    pub fn query_human_presence_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::PresenceSwitch, timeout)
    }

    pub fn query_presence_status(&self, timeout: Option<Duration>) -> Result<PresenceStatus, OperationError> {
        self.query_status(Op::PresenceStatus, "presence status", timeout)
    }

    pub fn query_human_motion_info(&self, timeout: Option<Duration>) -> Result<MotionStatus, OperationError> {
        self.query_status(Op::MotionStatus, "motion status", timeout)
    }

    pub fn query_body_motion_parameter(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::BodyMotion, timeout)
    }

    /// Distance to the person in cm
    pub fn query_human_distance(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::Distance, timeout)
    }

    /// Position (x, y, z) in cm
    pub fn query_human_direction(&self, timeout: Option<Duration>) -> Result<[i16; 3], OperationError> {
        match self.query(Op::Direction, timeout)? {
            Value::Vector(v) => Ok(v),
            other => Err(unexpected(Op::Direction, &other)),
        }
    }

    // -------------------------------------------------------------------------
    // Heart rate
    // -------------------------------------------------------------------------

    pub fn enable_heart_rate_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::HeartRateOn, timeout)
    }

    pub fn disable_heart_rate_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::HeartRateOff, timeout)
    }

    pub fn query_heart_rate_monitor_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::HeartRateSwitch, timeout)
    }

    pub fn enable_heart_rate_waveform_report(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::HeartRateWaveformOn, timeout)
    }

    pub fn disable_heart_rate_waveform_report(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::HeartRateWaveformOff, timeout)
    }

    pub fn query_heart_rate_waveform_report_switch(
        &self,
        timeout: Option<Duration>,
    ) -> Result<bool, OperationError> {
        self.query_bool(Op::HeartRateWaveformSwitch, timeout)
    }

    /// Beats per minute
    pub fn query_heart_rate_value(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::HeartRateValue, timeout)
    }

    pub fn query_heart_rate_waveform(&self, timeout: Option<Duration>) -> Result<[u8; 5], OperationError> {
        self.query_waveform(Op::HeartRateWaveform, timeout)
    }

    // -------------------------------------------------------------------------
    // Breath
    // -------------------------------------------------------------------------

    pub fn enable_breath_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::BreathOn, timeout)
    }

    pub fn disable_breath_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::BreathOff, timeout)
    }

    pub fn query_breath_monitor_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::BreathSwitch, timeout)
    }

    /// Breaths per minute below which the module reports "too low"
    pub fn set_low_breath_threshold(&self, threshold: u8, timeout: Option<Duration>) -> Result<u8, OperationError> {
        let (min, max) = LOW_BREATH_THRESHOLD;
        check_arg("low breath threshold", threshold as i64, min, max)?;
        self.set_u8(Op::SetLowBreathThreshold, threshold, timeout)
    }

    pub fn query_low_breath_threshold(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::LowBreathThreshold, timeout)
    }

    pub fn query_breath_info(&self, timeout: Option<Duration>) -> Result<BreathInfo, OperationError> {
        self.query_status(Op::BreathInfo, "breath info", timeout)
    }

    /// Breaths per minute
    pub fn query_breath_value(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::BreathValue, timeout)
    }

    pub fn enable_breath_waveform_report(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::BreathWaveformOn, timeout)
    }

    pub fn disable_breath_waveform_report(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::BreathWaveformOff, timeout)
    }

    pub fn query_breath_waveform_report_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::BreathWaveformSwitch, timeout)
    }

    pub fn query_breath_waveform(&self, timeout: Option<Duration>) -> Result<[u8; 5], OperationError> {
        self.query_waveform(Op::BreathWaveform, timeout)
    }

    // -------------------------------------------------------------------------
    // Sleep
    // -------------------------------------------------------------------------

    pub fn enable_sleep_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::SleepOn, timeout)
    }

    pub fn disable_sleep_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::SleepOff, timeout)
    }

    pub fn query_sleep_monitor_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::SleepSwitch, timeout)
    }

    pub fn enable_abnormal_struggle_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::StruggleOn, timeout)
    }

    pub fn disable_abnormal_struggle_monitor(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::StruggleOff, timeout)
    }

    pub fn query_abnormal_struggle_monitor_switch(
        &self,
        timeout: Option<Duration>,
    ) -> Result<bool, OperationError> {
        self.query_bool(Op::StruggleSwitch, timeout)
    }

    pub fn query_abnormal_struggle_status(
        &self,
        timeout: Option<Duration>,
    ) -> Result<StruggleStatus, OperationError> {
        self.query_status(Op::StruggleStatus, "struggle status", timeout)
    }

    pub fn set_struggle_sensitivity(&self, sensitivity: u8, timeout: Option<Duration>) -> Result<u8, OperationError> {
        let (min, max) = STRUGGLE_SENSITIVITY;
        check_arg("struggle sensitivity", sensitivity as i64, min, max)?;
        self.set_u8(Op::SetStruggleSensitivity, sensitivity, timeout)
    }

    pub fn query_struggle_sensitivity(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::StruggleSensitivity, timeout)
    }

    pub fn enable_no_person_timing(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::NoPersonTimingOn, timeout)
    }

    pub fn disable_no_person_timing(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.switch(Op::NoPersonTimingOff, timeout)
    }

    pub fn query_no_person_timing_switch(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(Op::NoPersonTimingSwitch, timeout)
    }

    pub fn set_no_person_timing_duration(
        &self,
        minutes: u8,
        timeout: Option<Duration>,
    ) -> Result<u8, OperationError> {
        let (min, max) = NO_PERSON_TIMING_DURATION;
        check_arg("no person timing duration", minutes as i64, min, max)?;
        if minutes as i64 % NO_PERSON_TIMING_STEP != 0 {
            return Err(OperationError::OffStep {
                name: "no person timing duration",
                value: minutes as i64,
                step: NO_PERSON_TIMING_STEP,
            });
        }
        self.set_u8(Op::SetNoPersonTimingDuration, minutes, timeout)
    }

    pub fn query_no_person_timing_duration(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::NoPersonTimingDuration, timeout)
    }

    pub fn query_no_person_timing_status(
        &self,
        timeout: Option<Duration>,
    ) -> Result<NoPersonStatus, OperationError> {
        self.query_status(Op::NoPersonTimingStatus, "no person timing status", timeout)
    }

    /// Minutes out of bed after which a sleep session ends
    pub fn set_sleep_end_duration(&self, minutes: u8, timeout: Option<Duration>) -> Result<u8, OperationError> {
        let (min, max) = SLEEP_END_DURATION;
        check_arg("sleep end duration", minutes as i64, min, max)?;
        self.set_u8(Op::SetSleepEndDuration, minutes, timeout)
    }

    pub fn query_sleep_end_duration(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::SleepEndDuration, timeout)
    }

    pub fn query_bed_status(&self, timeout: Option<Duration>) -> Result<BedStatus, OperationError> {
        self.query_status(Op::BedStatus, "bed status", timeout)
    }

    pub fn query_sleep_status(&self, timeout: Option<Duration>) -> Result<SleepStatus, OperationError> {
        self.query_status(Op::SleepStatus, "sleep status", timeout)
    }

    /// Minutes awake in the current session
    pub fn query_awake_duration(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::AwakeDuration, timeout)
    }

    pub fn query_light_sleep_duration(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::LightSleepDuration, timeout)
    }

    pub fn query_deep_sleep_duration(&self, timeout: Option<Duration>) -> Result<u16, OperationError> {
        self.query_u16(Op::DeepSleepDuration, timeout)
    }

    pub fn query_sleep_quality_score(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::SleepQualityScore, timeout)
    }

    pub fn query_sleep_comprehensive_status(
        &self,
        timeout: Option<Duration>,
    ) -> Result<SleepSummary, OperationError> {
        match self.query(Op::SleepSummary, timeout)? {
            Value::SleepSummary(summary) => Ok(summary),
            other => Err(unexpected(Op::SleepSummary, &other)),
        }
    }

    pub fn query_sleep_anomaly(&self, timeout: Option<Duration>) -> Result<SleepAnomaly, OperationError> {
        self.query_status(Op::SleepAnomaly, "sleep anomaly", timeout)
    }

    pub fn query_sleep_statistics(&self, timeout: Option<Duration>) -> Result<SleepStatistics, OperationError> {
        match self.query(Op::SleepStatistics, timeout)? {
            Value::SleepStatistics(stats) => Ok(stats),
            other => Err(unexpected(Op::SleepStatistics, &other)),
        }
    }

    pub fn query_sleep_quality_level(&self, timeout: Option<Duration>) -> Result<SleepQuality, OperationError> {
        self.query_status(Op::SleepQualityLevel, "sleep quality level", timeout)
    }

    fn set_u8(&self, op: Op, value: u8, timeout: Option<Duration>) -> Result<u8, OperationError> {
        let reply = self.set(op, &[value], timeout)?;
        reply.as_u8().ok_or_else(|| unexpected(op, &reply))
    }

    fn query_waveform(&self, op: Op, timeout: Option<Duration>) -> Result<[u8; 5], OperationError> {
        match self.query(op, timeout)? {
            Value::Waveform(wave) => Ok(wave),
            other => Err(unexpected(op, &other)),
        }
    }
}
