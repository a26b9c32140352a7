//! R60AMP1 presence and trajectory radar.

use std::time::Duration;

use mmwave_core::models::r60amp1::{Op, R60Amp1, State};
use mmwave_core::status::{MotionStatus, PresenceStatus};
use mmwave_core::value::TrajectoryTarget;
use mmwave_core::Value;
use serde::{Deserialize, Serialize};

use super::{unexpected, RadarDevice};
use crate::error::OperationError;
use crate::init::{ConfigStep, FeatureConfig, VerifyCheck};
use crate::settings::SettingsError;

pub type R60Amp1Device = RadarDevice<R60Amp1, Amp1Config>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Amp1Config {
    pub presence_enabled: bool,
}

impl Default for Amp1Config {
    fn default() -> Self {
        Amp1Config {
            presence_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Amp1Settings {
    pub presence_enabled: bool,
}

impl FeatureConfig<R60Amp1> for Amp1Config {
    type Current = Amp1Settings;

    fn validate(&self) -> Result<(), SettingsError> {
        Ok(())
    }

    fn plan(&self) -> Vec<ConfigStep<Op>> {
        if self.presence_enabled {
            vec![ConfigStep::new("Enable Human Presence", Op::PresenceOn)]
        } else {
            vec![ConfigStep::new("Disable Human Presence", Op::PresenceOff)]
        }
    }

    fn checks(&self) -> Vec<VerifyCheck<Op>> {
        let mut checks = vec![VerifyCheck::new("Device Initialization", Op::InitComplete, Some(true))];
        if self.presence_enabled {
            checks.push(VerifyCheck::new("Presence Detection", Op::PresenceSwitch, Some(true)));
        }
        checks
    }

    fn current(&self, state: &State) -> Amp1Settings {
        Amp1Settings {
            presence_enabled: state.presence_enabled,
        }
    }
}

impl RadarDevice<R60Amp1, Amp1Config> {
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

    pub fn query_motion_info(&self, timeout: Option<Duration>) -> Result<MotionStatus, OperationError> {
        self.query_status(Op::MotionStatus, "motion status", timeout)
    }

    /// Body motion parameter, 0-100
    pub fn query_body_motion_parameter(&self, timeout: Option<Duration>) -> Result<u8, OperationError> {
        self.query_u8(Op::BodyMotion, timeout)
    }

    pub fn query_trajectory_info(
        &self,
        timeout: Option<Duration>,
    ) -> Result<Vec<TrajectoryTarget>, OperationError> {
        match self.query(Op::Trajectory, timeout)? {
            Value::Targets(targets) => Ok(targets),
            other => Err(unexpected(Op::Trajectory, &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_follows_flag() {
        let config = Amp1Config::default();
        assert_eq!(config.plan()[0].operation, Op::PresenceOn);
        assert_eq!(config.checks().len(), 2);

        let config = Amp1Config {
            presence_enabled: false,
        };
        assert_eq!(config.plan()[0].name, "Disable Human Presence");
        assert_eq!(config.checks().len(), 1);
    }

    #[test]
    fn test_config_from_json() {
        let config: Amp1Config = serde_json::from_str("{}").unwrap();
        assert!(config.presence_enabled);
    }
}
