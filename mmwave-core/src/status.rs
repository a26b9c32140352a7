//! Enumerated status fields.
//!
//! The mirror keeps the raw byte the module sent. These enums are applied
//! at the public query boundary, where a value outside the declared set is
//! a hard error and not something to clamp.

use std::fmt;

use enum_primitive_derive::Primitive;
use num_traits::FromPrimitive;
use serde::Serialize;

use crate::error::StatusError;

/// Convert a raw status byte, rejecting values outside the declared set.
///
/// # Example
/// ```
/// use mmwave_core::status::{decode_status, MotionStatus};
///
/// assert_eq!(decode_status::<MotionStatus>("motion status", 2), Ok(MotionStatus::Active));
/// assert!(decode_status::<MotionStatus>("motion status", 7).is_err());
/// ```
pub fn decode_status<T: FromPrimitive>(field: &'static str, value: u8) -> Result<T, StatusError> {
    T::from_u8(value).ok_or(StatusError { field, value })
}

macro_rules! display_as_debug {
    ($($t:ty),*) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    fmt::Debug::fmt(self, f)
                }
            }
        )*
    };
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum PresenceStatus {
    Nobody = 0,
    Somebody = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum MotionStatus {
    None = 0,
    Static = 1,
    Active = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum BreathInfo {
    Normal = 1,
    TooHigh = 2,
    TooLow = 3,
    None = 4,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum BedStatus {
    Left = 0,
    Entered = 1,
    None = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum SleepStatus {
    Deep = 0,
    Light = 1,
    Awake = 2,
    None = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum SleepAnomaly {
    /// Slept less than 4 hours
    ShortSleep = 0,
    /// Slept more than 12 hours
    LongSleep = 1,
    /// Nobody in bed for too long
    NoPerson = 2,
    None = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum SleepQuality {
    None = 0,
    Good = 1,
    Normal = 2,
    Poor = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum StruggleStatus {
    None = 0,
    Normal = 1,
    Abnormal = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum NoPersonStatus {
    None = 0,
    Normal = 1,
    Abnormal = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum FallStatus {
    None = 0,
    Fallen = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Primitive, Serialize)]
pub enum StaticStayStatus {
    None = 0,
    Detected = 1,
}

display_as_debug!(
    PresenceStatus,
    MotionStatus,
    BreathInfo,
    BedStatus,
    SleepStatus,
    SleepAnomaly,
    SleepQuality,
    StruggleStatus,
    NoPersonStatus,
    FallStatus,
    StaticStayStatus
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breath_info_starts_at_one() {
        assert!(decode_status::<BreathInfo>("breath info", 0).is_err());
        assert_eq!(decode_status::<BreathInfo>("breath info", 4), Ok(BreathInfo::None));
    }

    #[test]
    fn test_out_of_range_reports_field() {
        let err = decode_status::<SleepQuality>("sleep quality level", 9).unwrap_err();
        assert_eq!(err.field, "sleep quality level");
        assert_eq!(err.value, 9);
        assert_eq!(err.to_string(), "Invalid sleep quality level: 9");
    }

    #[test]
    fn test_display() {
        assert_eq!(FallStatus::Fallen.to_string(), "Fallen");
        assert_eq!(MotionStatus::Static.to_string(), "Static");
    }
}
