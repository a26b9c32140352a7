//! Decoded operation results.
//!
//! Every reply frame decodes into one [`Value`]. The same value is written
//! into the device state mirror and handed back to the caller that was
//! waiting for it.

use serde::{Deserialize, Serialize};

/// One target reported by the trajectory stream (11 bytes on the wire).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryTarget {
    pub index: u8,
    pub size: u8,
    pub feature: u8,
    /// Lateral position in cm
    pub x: i16,
    /// Depth position in cm
    pub y: i16,
    /// Height in cm
    pub height: u16,
    /// Radial speed in cm/s
    pub speed: i16,
}

/// Sleep comprehensive status (8 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSummary {
    pub presence: u8,
    pub sleep_status: u8,
    pub average_breath: u8,
    pub average_heart_rate: u8,
    pub turnover_count: u8,
    pub large_movement_ratio: u8,
    pub small_movement_ratio: u8,
    pub apnea_count: u8,
}

/// Sleep statistics for the last session (12 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepStatistics {
    pub quality_score: u8,
    /// Total sleep duration in minutes
    pub total_duration: u16,
    pub awake_ratio: u8,
    pub light_sleep_ratio: u8,
    pub deep_sleep_ratio: u8,
    pub out_of_bed_duration: u8,
    pub out_of_bed_count: u8,
    pub turnover_count: u8,
    pub average_breath: u8,
    pub average_heart_rate: u8,
    pub apnea_count: u8,
}

/// Height distribution of detected targets (6 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightRatio {
    pub total: u16,
    /// Percentage between 0 and 0.5 m
    pub ratio_0_05: u8,
    /// Percentage between 0.5 and 1 m
    pub ratio_05_1: u8,
    /// Percentage between 1 and 1.5 m
    pub ratio_1_15: u8,
    /// Percentage between 1.5 and 2 m
    pub ratio_15_2: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    I16(i16),
    Text(String),
    /// Three signed components, e.g. an installation angle or a direction
    Vector([i16; 3]),
    Point { x: i16, y: i16 },
    Waveform([u8; 5]),
    Targets(Vec<TrajectoryTarget>),
    SleepSummary(SleepSummary),
    SleepStatistics(SleepStatistics),
    HeightRatio(HeightRatio),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Value::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Value::U16(v) => Some(*v),
            Value::U8(v) => Some(*v as u16),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::U32(v) => Some(*v),
            Value::U16(v) => Some(*v as u32),
            Value::U8(v) => Some(*v as u32),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Value::I16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::I16(_) => "i16",
            Value::Text(_) => "text",
            Value::Vector(_) => "vector",
            Value::Point { .. } => "point",
            Value::Waveform(_) => "waveform",
            Value::Targets(_) => "targets",
            Value::SleepSummary(_) => "sleep summary",
            Value::SleepStatistics(_) => "sleep statistics",
            Value::HeightRatio(_) => "height ratio",
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::U8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
            Value::Vector([x, y, z]) => write!(f, "({}, {}, {})", x, y, z),
            Value::Point { x, y } => write!(f, "({}, {})", x, y),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_accessors() {
        assert_eq!(Value::U8(30).as_u16(), Some(30));
        assert_eq!(Value::U16(300).as_u32(), Some(300));
        assert_eq!(Value::U32(300).as_u16(), None);
        assert_eq!(Value::Bool(true).as_u8(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Vector([1, -2, 3]).to_string(), "(1, -2, 3)");
        assert_eq!(Value::Point { x: -5, y: 7 }.to_string(), "(-5, 7)");
        assert_eq!(Value::Text("R60AFD1".into()).to_string(), "R60AFD1");
    }

    #[test]
    fn test_serialize_untagged() {
        let json = serde_json::to_string(&Value::Point { x: -5, y: 7 }).unwrap();
        assert_eq!(json, r#"{"x":-5,"y":7}"#);
        assert_eq!(serde_json::to_string(&Value::Bool(true)).unwrap(), "true");
    }
}
