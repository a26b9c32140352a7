//! Engine timing settings.
//!
//! These control how the engine talks to a module, independent of which
//! model it is: how often the background poller drains the port, how the
//! start-up sequence retries, and how long it waits for the module to
//! become ready. Per-model feature configuration lives with the device
//! handles.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Setting {name} value {value} is lower than minimum value {min}")]
    TooLow {
        name: &'static str,
        value: i64,
        min: i64,
    },
    #[error("Setting {name} value {value} is higher than maximum value {max}")]
    TooHigh {
        name: &'static str,
        value: i64,
        max: i64,
    },
    #[error("Setting {name} value {value} is not a multiple of {step}")]
    Step {
        name: &'static str,
        value: i64,
        step: i64,
    },
    #[error("Cannot parse JSON '{0}'")]
    ParseJson(String),
}

/// Check `min <= value <= max`.
pub fn check_range(name: &'static str, value: i64, min: i64, max: i64) -> Result<(), SettingsError> {
    if value < min {
        return Err(SettingsError::TooLow { name, value, min });
    }
    if value > max {
        return Err(SettingsError::TooHigh { name, value, max });
    }
    Ok(())
}

pub fn check_step(name: &'static str, value: i64, step: i64) -> Result<(), SettingsError> {
    if value % step != 0 {
        return Err(SettingsError::Step { name, value, step });
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background poller period
    pub parse_interval_ms: u64,
    /// Extra attempts after a failed start-up operation
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// How long to wait for the module to report ready
    pub init_timeout_ms: u64,
    /// Pause after a reset before polling for readiness again
    pub reset_settle_ms: u64,
    /// Readiness timeout after a reset
    pub recovery_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            parse_interval_ms: 200,
            max_retries: 3,
            retry_delay_ms: 100,
            init_timeout_ms: 5000,
            reset_settle_ms: 3000,
            recovery_timeout_ms: 10000,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_range("parse_interval_ms", self.parse_interval_ms as i64, 10, 500)?;
        check_range("max_retries", self.max_retries as i64, 0, 10)?;
        check_range("retry_delay_ms", self.retry_delay_ms as i64, 0, 1000)?;
        check_range("init_timeout_ms", self.init_timeout_ms as i64, 1000, 30000)?;
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings =
            serde_json::from_str(json).map_err(|e| SettingsError::ParseJson(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn parse_interval(&self) -> Duration {
        Duration::from_millis(self.parse_interval_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(Settings::default().validate(), Ok(()));
    }

    #[test]
    fn test_parse_interval_bounds() {
        let settings = Settings {
            parse_interval_ms: 5,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::TooLow {
                name: "parse_interval_ms",
                value: 5,
                min: 10
            })
        );

        let settings = Settings {
            parse_interval_ms: 501,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::TooHigh { .. })));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let settings = Settings::from_json(r#"{ "max_retries": 0, "init_timeout_ms": 2000 }"#).unwrap();
        assert_eq!(settings.max_retries, 0);
        assert_eq!(settings.init_timeout(), Duration::from_millis(2000));
        assert_eq!(settings.parse_interval_ms, 200);
    }

    #[test]
    fn test_from_json_validates() {
        let err = Settings::from_json(r#"{ "retry_delay_ms": 5000 }"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Setting retry_delay_ms value 5000 is higher than maximum value 1000"
        );
        assert!(matches!(
            Settings::from_json("{ nope"),
            Err(SettingsError::ParseJson(_))
        ));
    }

    #[test]
    fn test_step() {
        assert!(check_step("duration", 40, 10).is_ok());
        assert!(check_step("duration", 45, 10).is_err());
    }
}
