//! R60AFD1 fall detection radar.
//!
//! A ceiling mounted module. It has to be told its installation geometry
//! before the fall and static stay detectors give useful results, and it
//! can stream a height histogram and the position of the tracked person.

use serde::Serialize;

use crate::catalog::{Operation, StandardOp, WireCommand, NO_DATA, OFF, ON, QUERY};
use crate::dispatch::{apply_system, switch_reply, DeviceProfile, Reply, SystemState};
use crate::models::Model;
use crate::protocol::decode::{be_u16, be_u32, sign_magnitude_i16, sm16_at, u16_at};
use crate::protocol::Frame;
use crate::value::{HeightRatio, Value};

/// Payload length of a height ratio frame
pub const HEIGHT_RATIO_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // System
    Heartbeat,
    Reset,
    ProductModel,
    ProductId,
    HardwareModel,
    FirmwareVersion,
    InitComplete,
    SceneInfo,

    // Installation
    SetInstallAngle,
    InstallAngle,
    SetInstallHeight,
    InstallHeight,
    AutoHeight,

    // Presence
    PresenceOn,
    PresenceOff,
    PresenceSwitch,
    PresenceStatus,
    MotionStatus,
    BodyMotion,
    SetStaticDistance,
    StaticDistance,
    SetMotionDistance,
    MotionDistance,
    SetNoPersonTime,
    NoPersonTime,
    SetPresenceThreshold,
    PresenceThreshold,
    EnergyReportOn,
    EnergyReportOff,
    EnergyReportSwitch,
    MaxEnergy,

    // Fall detection
    FallOn,
    FallOff,
    FallSwitch,
    FallStatus,
    SetFallDuration,
    FallDuration,
    SetFallSensitivity,
    FallSensitivity,
    SetFallBreakHeight,
    FallBreakHeight,
    SetHeightAccumulation,
    HeightAccumulation,
    StaticStayOn,
    StaticStayOff,
    StaticStaySwitch,
    StaticStayStatus,
    SetStaticStayDuration,
    StaticStayDuration,
    HeightRatioOn,
    HeightRatioOff,
    HeightRatioSwitch,
    HeightRatio,
    TrackOn,
    TrackOff,
    TrackSwitch,
    TrackPoint,
    SetTrackFrequency,
    TrackFrequency,
}

impl Op {
    pub const ALL: &'static [Op] = &[
        Op::Heartbeat,
        Op::Reset,
        Op::ProductModel,
        Op::ProductId,
        Op::HardwareModel,
        Op::FirmwareVersion,
        Op::InitComplete,
        Op::SceneInfo,
        Op::SetInstallAngle,
        Op::InstallAngle,
        Op::SetInstallHeight,
        Op::InstallHeight,
        Op::AutoHeight,
        Op::PresenceOn,
        Op::PresenceOff,
        Op::PresenceSwitch,
        Op::PresenceStatus,
        Op::MotionStatus,
        Op::BodyMotion,
        Op::SetStaticDistance,
        Op::StaticDistance,
        Op::SetMotionDistance,
        Op::MotionDistance,
        Op::SetNoPersonTime,
        Op::NoPersonTime,
        Op::SetPresenceThreshold,
        Op::PresenceThreshold,
        Op::EnergyReportOn,
        Op::EnergyReportOff,
        Op::EnergyReportSwitch,
        Op::MaxEnergy,
        Op::FallOn,
        Op::FallOff,
        Op::FallSwitch,
        Op::FallStatus,
        Op::SetFallDuration,
        Op::FallDuration,
        Op::SetFallSensitivity,
        Op::FallSensitivity,
        Op::SetFallBreakHeight,
        Op::FallBreakHeight,
        Op::SetHeightAccumulation,
        Op::HeightAccumulation,
        Op::StaticStayOn,
        Op::StaticStayOff,
        Op::StaticStaySwitch,
        Op::StaticStayStatus,
        Op::SetStaticStayDuration,
        Op::StaticStayDuration,
        Op::HeightRatioOn,
        Op::HeightRatioOff,
        Op::HeightRatioSwitch,
        Op::HeightRatio,
        Op::TrackOn,
        Op::TrackOff,
        Op::TrackSwitch,
        Op::TrackPoint,
        Op::SetTrackFrequency,
        Op::TrackFrequency,
    ];
}

impl Operation for Op {
    fn wire(&self) -> WireCommand {
        use WireCommand as W;
        match self {
            Op::Heartbeat => W::new(0x01, 0x01, QUERY, "Heartbeat"),
            Op::Reset => W::new(0x01, 0x02, QUERY, "Module Reset"),
            Op::ProductModel => W::new(0x02, 0xA1, QUERY, "Product Model"),
            Op::ProductId => W::new(0x02, 0xA2, QUERY, "Product ID"),
            Op::HardwareModel => W::new(0x02, 0xA3, QUERY, "Hardware Model"),
            Op::FirmwareVersion => W::new(0x02, 0xA4, QUERY, "Firmware Version"),
            Op::InitComplete => W::new(0x05, 0x81, QUERY, "Init Complete"),
            Op::SceneInfo => W::new(0x05, 0x07, QUERY, "Scene Info"),

            Op::SetInstallAngle => W::new(0x06, 0x01, NO_DATA, "Set Install Angle"),
            Op::InstallAngle => W::new(0x06, 0x81, QUERY, "Query Install Angle"),
            Op::SetInstallHeight => W::new(0x06, 0x02, NO_DATA, "Set Install Height"),
            Op::InstallHeight => W::new(0x06, 0x82, QUERY, "Query Install Height"),
            Op::AutoHeight => W::new(0x83, 0x90, QUERY, "Auto Height Measure"),

            Op::PresenceOn => W::new(0x80, 0x00, ON, "Human Presence ON"),
            Op::PresenceOff => W::new(0x80, 0x00, OFF, "Human Presence OFF"),
            Op::PresenceSwitch => W::new(0x80, 0x80, QUERY, "Human Presence Switch"),
            Op::PresenceStatus => W::new(0x80, 0x81, QUERY, "Presence Status"),
            Op::MotionStatus => W::new(0x80, 0x82, QUERY, "Human Motion Info"),
            Op::BodyMotion => W::new(0x80, 0x83, QUERY, "Body Motion Parameter"),
            Op::SetStaticDistance => W::new(0x80, 0x0D, NO_DATA, "Set Static Distance"),
            Op::StaticDistance => W::new(0x80, 0x8D, QUERY, "Query Static Distance"),
            Op::SetMotionDistance => W::new(0x80, 0x0E, NO_DATA, "Set Motion Distance"),
            Op::MotionDistance => W::new(0x80, 0x8E, QUERY, "Query Motion Distance"),
            Op::SetNoPersonTime => W::new(0x80, 0x12, NO_DATA, "Set No Person Time"),
            Op::NoPersonTime => W::new(0x80, 0x92, QUERY, "Query No Person Time"),
            Op::SetPresenceThreshold => W::new(0x80, 0x11, NO_DATA, "Set Presence Threshold"),
            Op::PresenceThreshold => W::new(0x80, 0x91, QUERY, "Query Presence Threshold"),
            Op::EnergyReportOn => W::new(0x80, 0x13, ON, "Energy Report ON"),
            Op::EnergyReportOff => W::new(0x80, 0x13, OFF, "Energy Report OFF"),
            Op::EnergyReportSwitch => W::new(0x80, 0x93, QUERY, "Energy Report Switch"),
            Op::MaxEnergy => W::new(0x80, 0x90, QUERY, "Query Max Energy"),

            Op::FallOn => W::new(0x83, 0x00, ON, "Fall Detection ON"),
            Op::FallOff => W::new(0x83, 0x00, OFF, "Fall Detection OFF"),
            Op::FallSwitch => W::new(0x83, 0x80, QUERY, "Fall Detection Switch"),
            Op::FallStatus => W::new(0x83, 0x81, QUERY, "Fall Status"),
            Op::SetFallDuration => W::new(0x83, 0x0C, NO_DATA, "Set Fall Duration"),
            Op::FallDuration => W::new(0x83, 0x8C, QUERY, "Query Fall Duration"),
            Op::SetFallSensitivity => W::new(0x83, 0x0D, NO_DATA, "Set Fall Sensitivity"),
            Op::FallSensitivity => W::new(0x83, 0x8D, QUERY, "Query Fall Sensitivity"),
            Op::SetFallBreakHeight => W::new(0x83, 0x11, NO_DATA, "Set Fall Break Height"),
            Op::FallBreakHeight => W::new(0x83, 0x91, QUERY, "Query Fall Break Height"),
            Op::SetHeightAccumulation => {
                W::new(0x83, 0x0F, NO_DATA, "Set Height Accumulation Time")
            }
            Op::HeightAccumulation => W::new(0x83, 0x8F, QUERY, "Query Height Accumulation Time"),
            Op::StaticStayOn => W::new(0x83, 0x0B, ON, "Static Stay ON"),
            Op::StaticStayOff => W::new(0x83, 0x0B, OFF, "Static Stay OFF"),
            Op::StaticStaySwitch => W::new(0x83, 0x8B, QUERY, "Static Stay Switch"),
            Op::StaticStayStatus => W::new(0x83, 0x85, QUERY, "Static Stay Status"),
            Op::SetStaticStayDuration => W::new(0x83, 0x0A, NO_DATA, "Set Static Stay Duration"),
            Op::StaticStayDuration => W::new(0x83, 0x8A, QUERY, "Query Static Stay Duration"),
            Op::HeightRatioOn => W::new(0x83, 0x15, ON, "Height Ratio ON"),
            Op::HeightRatioOff => W::new(0x83, 0x15, OFF, "Height Ratio OFF"),
            Op::HeightRatioSwitch => W::new(0x83, 0x95, QUERY, "Height Ratio Switch"),
            Op::HeightRatio => W::new(0x83, 0x8E, QUERY, "Height Ratio"),
            Op::TrackOn => W::new(0x83, 0x14, ON, "Track Report ON"),
            Op::TrackOff => W::new(0x83, 0x14, OFF, "Track Report OFF"),
            Op::TrackSwitch => W::new(0x83, 0x94, QUERY, "Query Track Switch"),
            Op::TrackPoint => W::new(0x83, 0x92, QUERY, "Track Point"),
            Op::SetTrackFrequency => W::new(0x83, 0x13, NO_DATA, "Set Track Frequency"),
            Op::TrackFrequency => W::new(0x83, 0x93, QUERY, "Track Frequency"),
        }
    }
}

/// Last known R60AFD1 properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct State {
    pub system: SystemState,
    /// Seconds since power up, from the periodic report
    pub working_duration: u32,

    /// Installation angle (x, y, z) in degrees
    pub install_angle: [i16; 3],
    /// Installation height in cm
    pub install_height: u16,
    /// Height measured by the module itself, in cm
    pub auto_height: i16,

    pub presence_enabled: bool,
    pub presence: u8,
    pub motion: u8,
    pub body_motion: u8,
    /// Detection ranges in cm
    pub static_distance: u16,
    pub motion_distance: u16,
    /// Seconds without a person before presence drops
    pub no_person_time: u32,
    pub presence_threshold: u32,
    pub energy_report_enabled: bool,
    pub max_energy: u32,

    pub fall_enabled: bool,
    pub fall_status: u8,
    /// Seconds on the floor before a fall is reported
    pub fall_duration: u32,
    pub fall_sensitivity: u8,
    /// cm
    pub fall_break_height: u16,
    pub height_accumulation: u32,

    pub static_stay_enabled: bool,
    pub static_stay_status: u8,
    /// Seconds without movement before a static stay is reported
    pub static_stay_duration: u32,

    pub height_ratio_enabled: bool,
    pub height_ratio: Option<HeightRatio>,

    pub track_enabled: bool,
    pub track_x: i16,
    pub track_y: i16,
    /// Seconds between track reports
    pub track_frequency: u32,
}

fn half(data: &[u8]) -> Option<u16> {
    data.get(..2).map(be_u16)
}

fn word(data: &[u8]) -> Option<u32> {
    data.get(..4).map(be_u32)
}

fn signed(data: &[u8]) -> Option<i16> {
    data.get(..2).map(sign_magnitude_i16)
}

fn angle(data: &[u8]) -> Option<[i16; 3]> {
    (data.len() >= 6).then(|| [sm16_at(data, 0), sm16_at(data, 2), sm16_at(data, 4)])
}

fn track(data: &[u8]) -> Option<(i16, i16)> {
    (data.len() >= 4).then(|| (sm16_at(data, 0), sm16_at(data, 2)))
}

/// Decode a height histogram, `None` if the payload is shorter than 6 bytes.
pub fn parse_height_ratio(data: &[u8]) -> Option<HeightRatio> {
    if data.len() < HEIGHT_RATIO_LEN {
        return None;
    }
    Some(HeightRatio {
        total: u16_at(data, 0),
        ratio_0_05: data[2],
        ratio_05_1: data[3],
        ratio_1_15: data[4],
        ratio_15_2: data[5],
    })
}

pub struct R60Afd1;

impl R60Afd1 {
    fn apply_installation(command: u8, frame: &Frame, state: &mut State) -> Option<Reply<Op>> {
        let data = frame.data.as_slice();
        match command {
            0x01 | 0x81 => {
                state.install_angle = angle(data)?;
                let op = if command == 0x01 { Op::SetInstallAngle } else { Op::InstallAngle };
                Some(Reply::new(op, Value::Vector(state.install_angle)))
            }
            0x02 | 0x82 => {
                state.install_height = half(data)?;
                let op = if command == 0x02 { Op::SetInstallHeight } else { Op::InstallHeight };
                Some(Reply::new(op, Value::U16(state.install_height)))
            }
            _ => None,
        }
    }

    fn apply_presence(command: u8, frame: &Frame, state: &mut State) -> Option<Reply<Op>> {
        let data = frame.data.as_slice();
        match command {
            0x00 => {
                let (enabled, reply) = switch_reply(frame, Op::PresenceOn, Op::PresenceOff)?;
                state.presence_enabled = enabled;
                Some(reply)
            }
            0x13 => {
                let (enabled, reply) = switch_reply(frame, Op::EnergyReportOn, Op::EnergyReportOff)?;
                state.energy_report_enabled = enabled;
                Some(reply)
            }
            0x01 => {
                state.presence = frame.first()?;
                None
            }
            0x02 => {
                state.motion = frame.first()?;
                None
            }
            0x03 => {
                state.body_motion = frame.first()?;
                None
            }
            0x10 => {
                state.max_energy = word(data)?;
                None
            }
            0x0D | 0x8D => {
                state.static_distance = half(data)?;
                let op = if command == 0x0D { Op::SetStaticDistance } else { Op::StaticDistance };
                Some(Reply::new(op, Value::U16(state.static_distance)))
            }
            0x0E | 0x8E => {
                state.motion_distance = half(data)?;
                let op = if command == 0x0E { Op::SetMotionDistance } else { Op::MotionDistance };
                Some(Reply::new(op, Value::U16(state.motion_distance)))
            }
            0x11 | 0x91 => {
                state.presence_threshold = word(data)?;
                let op = if command == 0x11 {
                    Op::SetPresenceThreshold
                } else {
                    Op::PresenceThreshold
                };
                Some(Reply::new(op, Value::U32(state.presence_threshold)))
            }
            0x12 | 0x92 => {
                state.no_person_time = word(data)?;
                let op = if command == 0x12 { Op::SetNoPersonTime } else { Op::NoPersonTime };
                Some(Reply::new(op, Value::U32(state.no_person_time)))
            }
            0x80 => {
                state.presence_enabled = frame.first()? == 1;
                Some(Reply::new(Op::PresenceSwitch, Value::Bool(state.presence_enabled)))
            }
            0x81 => {
                state.presence = frame.first()?;
                Some(Reply::new(Op::PresenceStatus, Value::U8(state.presence)))
            }
            0x82 => {
                state.motion = frame.first()?;
                Some(Reply::new(Op::MotionStatus, Value::U8(state.motion)))
            }
            0x83 => {
                state.body_motion = frame.first()?;
                Some(Reply::new(Op::BodyMotion, Value::U8(state.body_motion)))
            }
            0x90 => {
                state.max_energy = word(data)?;
                Some(Reply::new(Op::MaxEnergy, Value::U32(state.max_energy)))
            }
            0x93 => {
                state.energy_report_enabled = frame.first()? == 1;
                Some(Reply::new(Op::EnergyReportSwitch, Value::Bool(state.energy_report_enabled)))
            }
            _ => None,
        }
    }

    fn apply_fall(command: u8, frame: &Frame, state: &mut State) -> Option<Reply<Op>> {
        let data = frame.data.as_slice();
        match command {
            // Switch echoes
            0x00 => {
                let (enabled, reply) = switch_reply(frame, Op::FallOn, Op::FallOff)?;
                state.fall_enabled = enabled;
                Some(reply)
            }
            0x0B => {
                let (enabled, reply) = switch_reply(frame, Op::StaticStayOn, Op::StaticStayOff)?;
                state.static_stay_enabled = enabled;
                Some(reply)
            }
            0x14 => {
                let (enabled, reply) = switch_reply(frame, Op::TrackOn, Op::TrackOff)?;
                state.track_enabled = enabled;
                Some(reply)
            }
            0x15 => {
                let (enabled, reply) = switch_reply(frame, Op::HeightRatioOn, Op::HeightRatioOff)?;
                state.height_ratio_enabled = enabled;
                Some(reply)
            }

            // Telemetry
            0x01 => {
                state.fall_status = frame.first()?;
                None
            }
            0x05 => {
                state.static_stay_status = frame.first()?;
                None
            }
            0x0E => {
                state.height_ratio = Some(parse_height_ratio(data)?);
                None
            }
            0x12 => {
                (state.track_x, state.track_y) = track(data)?;
                None
            }

            // Parameters: the set echo and the query reply share a layout
            0x0A | 0x8A => {
                state.static_stay_duration = word(data)?;
                let op = if command == 0x0A {
                    Op::SetStaticStayDuration
                } else {
                    Op::StaticStayDuration
                };
                Some(Reply::new(op, Value::U32(state.static_stay_duration)))
            }
            0x0C | 0x8C => {
                state.fall_duration = word(data)?;
                let op = if command == 0x0C { Op::SetFallDuration } else { Op::FallDuration };
                Some(Reply::new(op, Value::U32(state.fall_duration)))
            }
            0x0D | 0x8D => {
                state.fall_sensitivity = frame.first()?;
                let op = if command == 0x0D {
                    Op::SetFallSensitivity
                } else {
                    Op::FallSensitivity
                };
                Some(Reply::new(op, Value::U8(state.fall_sensitivity)))
            }
            0x0F | 0x8F => {
                state.height_accumulation = word(data)?;
                let op = if command == 0x0F {
                    Op::SetHeightAccumulation
                } else {
                    Op::HeightAccumulation
                };
                Some(Reply::new(op, Value::U32(state.height_accumulation)))
            }
            0x11 | 0x91 => {
                state.fall_break_height = half(data)?;
                let op = if command == 0x11 {
                    Op::SetFallBreakHeight
                } else {
                    Op::FallBreakHeight
                };
                Some(Reply::new(op, Value::U16(state.fall_break_height)))
            }
            0x13 | 0x93 => {
                state.track_frequency = word(data)?;
                let op = if command == 0x13 {
                    Op::SetTrackFrequency
                } else {
                    Op::TrackFrequency
                };
                Some(Reply::new(op, Value::U32(state.track_frequency)))
            }

            // Query replies
            0x80 => {
                state.fall_enabled = frame.first()? == 1;
                Some(Reply::new(Op::FallSwitch, Value::Bool(state.fall_enabled)))
            }
            0x81 => {
                state.fall_status = frame.first()?;
                Some(Reply::new(Op::FallStatus, Value::U8(state.fall_status)))
            }
            0x85 => {
                state.static_stay_status = frame.first()?;
                Some(Reply::new(Op::StaticStayStatus, Value::U8(state.static_stay_status)))
            }
            0x8B => {
                state.static_stay_enabled = frame.first()? == 1;
                Some(Reply::new(Op::StaticStaySwitch, Value::Bool(state.static_stay_enabled)))
            }
            0x8E => {
                let ratio = parse_height_ratio(data)?;
                state.height_ratio = Some(ratio);
                Some(Reply::new(Op::HeightRatio, Value::HeightRatio(ratio)))
            }
            0x90 => {
                state.auto_height = signed(data)?;
                Some(Reply::new(Op::AutoHeight, Value::I16(state.auto_height)))
            }
            0x92 => {
                let (x, y) = track(data)?;
                state.track_x = x;
                state.track_y = y;
                Some(Reply::new(Op::TrackPoint, Value::Point { x, y }))
            }
            0x94 => {
                state.track_enabled = frame.first()? == 1;
                Some(Reply::new(Op::TrackSwitch, Value::Bool(state.track_enabled)))
            }
            0x95 => {
                state.height_ratio_enabled = frame.first()? == 1;
                Some(Reply::new(Op::HeightRatioSwitch, Value::Bool(state.height_ratio_enabled)))
            }
            _ => None,
        }
    }
}

impl DeviceProfile for R60Afd1 {
    type Op = Op;
    type State = State;

    const MODEL: Model = Model::R60AFD1;

    fn standard(op: StandardOp) -> Op {
        match op {
            StandardOp::Heartbeat => Op::Heartbeat,
            StandardOp::Reset => Op::Reset,
            StandardOp::ProductModel => Op::ProductModel,
            StandardOp::ProductId => Op::ProductId,
            StandardOp::HardwareModel => Op::HardwareModel,
            StandardOp::FirmwareVersion => Op::FirmwareVersion,
            StandardOp::InitComplete => Op::InitComplete,
        }
    }

    fn system(state: &State) -> &SystemState {
        &state.system
    }

    fn apply(frame: &Frame, state: &mut State, now_ms: u64) -> Option<Reply<Op>> {
        if let Some((op, value)) = apply_system(frame, &mut state.system, now_ms) {
            return Some(Reply::new(Self::standard(op), value));
        }

        match frame.key() {
            // Reported only, the module never answers a heartbeat query
            (0x01, 0x01) => {
                state.system.heartbeat_ms = Some(now_ms);
                None
            }
            (0x05, 0x03) => {
                state.working_duration = word(&frame.data)?;
                None
            }
            (0x05, 0x07) => {
                state.system.scene = frame.first()?;
                Some(Reply::new(Op::SceneInfo, Value::U8(state.system.scene)))
            }
            (0x06, command) => Self::apply_installation(command, frame, state),
            (0x80, command) => Self::apply_presence(command, frame, state),
            (0x83, command) => Self::apply_fall(command, frame, state),
            _ => None,
        }
    }
}
