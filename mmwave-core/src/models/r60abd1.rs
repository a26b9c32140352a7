//! R60ABD1 breathing, heart rate and sleep radar.
//!
//! The largest catalog of the family. Besides presence the module runs three
//! independent monitors (heart rate, breath and sleep), each with its own
//! switch, optional waveform stream and tuning parameters.

use serde::Serialize;

use crate::catalog::{Operation, StandardOp, WireCommand, NO_DATA, OFF, ON, QUERY};
use crate::dispatch::{apply_system, switch_reply, DeviceProfile, Reply, SystemState};
use crate::models::Model;
use crate::protocol::decode::{be_u16, sm16_at};
use crate::protocol::Frame;
use crate::value::{SleepStatistics, SleepSummary, Value};

/// Payload length of a sleep comprehensive status frame
pub const SUMMARY_LEN: usize = 8;
/// Payload length of a sleep statistics frame
pub const STATISTICS_LEN: usize = 12;

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
    RadarRangeBoundary,

    // Presence
    PresenceOn,
    PresenceOff,
    PresenceSwitch,
    PresenceStatus,
    MotionStatus,
    BodyMotion,
    Distance,
    Direction,

    // Heart rate
    HeartRateOn,
    HeartRateOff,
    HeartRateSwitch,
    HeartRateWaveformOn,
    HeartRateWaveformOff,
    HeartRateWaveformSwitch,
    HeartRateValue,
    HeartRateWaveform,

    // Breath
    BreathOn,
    BreathOff,
    BreathSwitch,
    SetLowBreathThreshold,
    LowBreathThreshold,
    BreathInfo,
    BreathValue,
    BreathWaveformOn,
    BreathWaveformOff,
    BreathWaveformSwitch,
    BreathWaveform,

    // Sleep
    SleepOn,
    SleepOff,
    SleepSwitch,
    StruggleOn,
    StruggleOff,
    StruggleSwitch,
    StruggleStatus,
    SetStruggleSensitivity,
    StruggleSensitivity,
    NoPersonTimingOn,
    NoPersonTimingOff,
    NoPersonTimingSwitch,
    SetNoPersonTimingDuration,
    NoPersonTimingDuration,
    NoPersonTimingStatus,
    SetSleepEndDuration,
    SleepEndDuration,
    BedStatus,
    SleepStatus,
    AwakeDuration,
    LightSleepDuration,
    DeepSleepDuration,
    SleepQualityScore,
    SleepSummary,
    SleepAnomaly,
    SleepStatistics,
    SleepQualityLevel,
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
        Op::RadarRangeBoundary,
        Op::PresenceOn,
        Op::PresenceOff,
        Op::PresenceSwitch,
        Op::PresenceStatus,
        Op::MotionStatus,
        Op::BodyMotion,
        Op::Distance,
        Op::Direction,
        Op::HeartRateOn,
        Op::HeartRateOff,
        Op::HeartRateSwitch,
        Op::HeartRateWaveformOn,
        Op::HeartRateWaveformOff,
        Op::HeartRateWaveformSwitch,
        Op::HeartRateValue,
        Op::HeartRateWaveform,
        Op::BreathOn,
        Op::BreathOff,
        Op::BreathSwitch,
        Op::SetLowBreathThreshold,
        Op::LowBreathThreshold,
        Op::BreathInfo,
        Op::BreathValue,
        Op::BreathWaveformOn,
        Op::BreathWaveformOff,
        Op::BreathWaveformSwitch,
        Op::BreathWaveform,
        Op::SleepOn,
        Op::SleepOff,
        Op::SleepSwitch,
        Op::StruggleOn,
        Op::StruggleOff,
        Op::StruggleSwitch,
        Op::StruggleStatus,
        Op::SetStruggleSensitivity,
        Op::StruggleSensitivity,
        Op::NoPersonTimingOn,
        Op::NoPersonTimingOff,
        Op::NoPersonTimingSwitch,
        Op::SetNoPersonTimingDuration,
        Op::NoPersonTimingDuration,
        Op::NoPersonTimingStatus,
        Op::SetSleepEndDuration,
        Op::SleepEndDuration,
        Op::BedStatus,
        Op::SleepStatus,
        Op::AwakeDuration,
        Op::LightSleepDuration,
        Op::DeepSleepDuration,
        Op::SleepQualityScore,
        Op::SleepSummary,
        Op::SleepAnomaly,
        Op::SleepStatistics,
        Op::SleepQualityLevel,
    ];
}

impl Operation for Op {
    fn wire(&self) -> WireCommand {
        use WireCommand as W;
        match self {
            Op::Heartbeat => W::new(0x01, 0x80, QUERY, "Heartbeat"),
            Op::Reset => W::new(0x01, 0x02, QUERY, "Module Reset"),
            Op::ProductModel => W::new(0x02, 0xA1, QUERY, "Product Model"),
            Op::ProductId => W::new(0x02, 0xA2, QUERY, "Product ID"),
            Op::HardwareModel => W::new(0x02, 0xA3, QUERY, "Hardware Model"),
            Op::FirmwareVersion => W::new(0x02, 0xA4, QUERY, "Firmware Version"),
            Op::InitComplete => W::new(0x05, 0x81, QUERY, "Init Complete"),
            Op::RadarRangeBoundary => W::new(0x07, 0x87, QUERY, "Radar Range Boundary"),

            Op::PresenceOn => W::new(0x80, 0x00, ON, "Human Presence ON"),
            Op::PresenceOff => W::new(0x80, 0x00, OFF, "Human Presence OFF"),
            Op::PresenceSwitch => W::new(0x80, 0x80, QUERY, "Human Presence Switch"),
            Op::PresenceStatus => W::new(0x80, 0x81, QUERY, "Presence Status"),
            Op::MotionStatus => W::new(0x80, 0x82, QUERY, "Human Motion Info"),
            Op::BodyMotion => W::new(0x80, 0x83, QUERY, "Body Motion Parameter"),
            Op::Distance => W::new(0x80, 0x84, QUERY, "Human Distance"),
            Op::Direction => W::new(0x80, 0x85, QUERY, "Human Direction"),

            Op::HeartRateOn => W::new(0x85, 0x00, ON, "Heart Rate Monitor ON"),
            Op::HeartRateOff => W::new(0x85, 0x00, OFF, "Heart Rate Monitor OFF"),
            Op::HeartRateSwitch => W::new(0x85, 0x80, QUERY, "Heart Rate Monitor Switch"),
            Op::HeartRateWaveformOn => W::new(0x85, 0x0A, ON, "Heart Rate Waveform Report ON"),
            Op::HeartRateWaveformOff => W::new(0x85, 0x0A, OFF, "Heart Rate Waveform Report OFF"),
            Op::HeartRateWaveformSwitch => {
                W::new(0x85, 0x8A, QUERY, "Heart Rate Waveform Report Switch")
            }
            Op::HeartRateValue => W::new(0x85, 0x82, QUERY, "Heart Rate Value"),
            Op::HeartRateWaveform => W::new(0x85, 0x85, QUERY, "Heart Rate Waveform"),

            Op::BreathOn => W::new(0x81, 0x00, ON, "Breath Monitor ON"),
            Op::BreathOff => W::new(0x81, 0x00, OFF, "Breath Monitor OFF"),
            Op::BreathSwitch => W::new(0x81, 0x80, QUERY, "Breath Monitor Switch"),
            Op::SetLowBreathThreshold => W::new(0x81, 0x0B, NO_DATA, "Set Low Breath Threshold"),
            Op::LowBreathThreshold => W::new(0x81, 0x8B, QUERY, "Query Low Breath Threshold"),
            Op::BreathInfo => W::new(0x81, 0x81, QUERY, "Breath Info"),
            Op::BreathValue => W::new(0x81, 0x82, QUERY, "Breath Value"),
            Op::BreathWaveformOn => W::new(0x81, 0x0C, ON, "Breath Waveform Report ON"),
            Op::BreathWaveformOff => W::new(0x81, 0x0C, OFF, "Breath Waveform Report OFF"),
            Op::BreathWaveformSwitch => W::new(0x81, 0x8C, QUERY, "Breath Waveform Report Switch"),
            Op::BreathWaveform => W::new(0x81, 0x85, QUERY, "Breath Waveform"),

            Op::SleepOn => W::new(0x84, 0x00, ON, "Sleep Monitor ON"),
            Op::SleepOff => W::new(0x84, 0x00, OFF, "Sleep Monitor OFF"),
            Op::SleepSwitch => W::new(0x84, 0x80, QUERY, "Sleep Monitor Switch"),
            Op::StruggleOn => W::new(0x84, 0x13, ON, "Abnormal Struggle Monitor ON"),
            Op::StruggleOff => W::new(0x84, 0x13, OFF, "Abnormal Struggle Monitor OFF"),
            Op::StruggleSwitch => W::new(0x84, 0x93, QUERY, "Abnormal Struggle Monitor Switch"),
            Op::StruggleStatus => W::new(0x84, 0x91, QUERY, "Abnormal Struggle Status"),
            Op::SetStruggleSensitivity => W::new(0x84, 0x1A, NO_DATA, "Set Struggle Sensitivity"),
            Op::StruggleSensitivity => W::new(0x84, 0x9A, QUERY, "Query Struggle Sensitivity"),
            Op::NoPersonTimingOn => W::new(0x84, 0x14, ON, "No Person Timing ON"),
            Op::NoPersonTimingOff => W::new(0x84, 0x14, OFF, "No Person Timing OFF"),
            Op::NoPersonTimingSwitch => W::new(0x84, 0x94, QUERY, "No Person Timing Switch"),
            Op::SetNoPersonTimingDuration => {
                W::new(0x84, 0x15, NO_DATA, "Set No Person Timing Duration")
            }
            Op::NoPersonTimingDuration => {
                W::new(0x84, 0x95, QUERY, "Query No Person Timing Duration")
            }
            Op::NoPersonTimingStatus => W::new(0x84, 0x92, QUERY, "No Person Timing Status"),
            Op::SetSleepEndDuration => W::new(0x84, 0x16, NO_DATA, "Set Sleep End Duration"),
            Op::SleepEndDuration => W::new(0x84, 0x96, QUERY, "Query Sleep End Duration"),
            Op::BedStatus => W::new(0x84, 0x81, QUERY, "Bed Status"),
            Op::SleepStatus => W::new(0x84, 0x82, QUERY, "Sleep Status"),
            Op::AwakeDuration => W::new(0x84, 0x83, QUERY, "Awake Duration"),
            Op::LightSleepDuration => W::new(0x84, 0x84, QUERY, "Light Sleep Duration"),
            Op::DeepSleepDuration => W::new(0x84, 0x85, QUERY, "Deep Sleep Duration"),
            Op::SleepQualityScore => W::new(0x84, 0x86, QUERY, "Sleep Quality Score"),
            Op::SleepSummary => W::new(0x84, 0x8D, QUERY, "Sleep Comprehensive Status"),
            Op::SleepAnomaly => W::new(0x84, 0x8E, QUERY, "Sleep Anomaly"),
            Op::SleepStatistics => W::new(0x84, 0x8F, QUERY, "Sleep Statistics"),
            Op::SleepQualityLevel => W::new(0x84, 0x90, QUERY, "Sleep Quality Level"),
        }
    }
}

/// Last known R60ABD1 properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct State {
    pub system: SystemState,
    /// Target is inside the detection range
    pub radar_in_range: bool,

    pub presence_enabled: bool,
    pub presence: u8,
    pub motion: u8,
    pub body_motion: u8,
    /// Distance to the person in cm
    pub distance: u16,
    /// Position of the person (x, y, z) in cm
    pub direction: [i16; 3],

    pub heart_rate_enabled: bool,
    pub heart_rate_waveform_enabled: bool,
    /// Beats per minute
    pub heart_rate: u8,
    pub heart_rate_waveform: Option<[u8; 5]>,

    pub breath_enabled: bool,
    pub breath_waveform_enabled: bool,
    /// Raw breath info byte (1 normal, 2 too high, 3 too low, 4 none)
    pub breath_info: u8,
    /// Breaths per minute
    pub breath_rate: u8,
    pub breath_waveform: Option<[u8; 5]>,
    pub low_breath_threshold: u8,

    pub sleep_enabled: bool,
    pub struggle_enabled: bool,
    pub struggle_sensitivity: u8,
    pub struggle_status: u8,
    pub no_person_timing_enabled: bool,
    /// Minutes without a person before the timing report fires
    pub no_person_timing_duration: u8,
    pub no_person_timing_status: u8,
    /// Minutes out of bed that end a sleep session
    pub sleep_end_duration: u8,
    pub bed_status: u8,
    pub sleep_status: u8,
    /// Durations in minutes
    pub awake_duration: u16,
    pub light_sleep_duration: u16,
    pub deep_sleep_duration: u16,
    pub sleep_quality_score: u8,
    pub sleep_quality_level: u8,
    pub sleep_anomaly: u8,
    pub sleep_summary: Option<SleepSummary>,
    pub sleep_statistics: Option<SleepStatistics>,
}

fn waveform(data: &[u8]) -> Option<[u8; 5]> {
    data.try_into().ok()
}

fn direction(data: &[u8]) -> Option<[i16; 3]> {
    (data.len() == 6).then(|| [sm16_at(data, 0), sm16_at(data, 2), sm16_at(data, 4)])
}

/// Decode a comprehensive status payload, `None` unless exactly 8 bytes.
pub fn parse_summary(data: &[u8]) -> Option<SleepSummary> {
    let d: [u8; SUMMARY_LEN] = data.try_into().ok()?;
    Some(SleepSummary {
        presence: d[0],
        sleep_status: d[1],
        average_breath: d[2],
        average_heart_rate: d[3],
        turnover_count: d[4],
        large_movement_ratio: d[5],
        small_movement_ratio: d[6],
        apnea_count: d[7],
    })
}

/// Decode a sleep statistics payload, `None` unless exactly 12 bytes.
pub fn parse_statistics(data: &[u8]) -> Option<SleepStatistics> {
    let d: [u8; STATISTICS_LEN] = data.try_into().ok()?;
    Some(SleepStatistics {
        quality_score: d[0],
        total_duration: u16::from_be_bytes([d[1], d[2]]),
        awake_ratio: d[3],
        light_sleep_ratio: d[4],
        deep_sleep_ratio: d[5],
        out_of_bed_duration: d[6],
        out_of_bed_count: d[7],
        turnover_count: d[8],
        average_breath: d[9],
        average_heart_rate: d[10],
        apnea_count: d[11],
    })
}

/// Two byte duration; longer payloads use the first two bytes
fn duration(data: &[u8]) -> Option<u16> {
    data.get(..2).map(be_u16)
}

pub struct R60Abd1;

impl R60Abd1 {
    fn apply_presence(command: u8, frame: &Frame, state: &mut State) -> Option<Reply<Op>> {
        let data = frame.data.as_slice();
        match command {
            0x00 => {
                let (enabled, reply) = switch_reply(frame, Op::PresenceOn, Op::PresenceOff)?;
                state.presence_enabled = enabled;
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
            0x04 => {
                state.distance = duration(data)?;
                None
            }
            0x05 => {
                state.direction = direction(data)?;
                None
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
            0x84 => {
                state.distance = duration(data)?;
                Some(Reply::new(Op::Distance, Value::U16(state.distance)))
            }
            0x85 => {
                state.direction = direction(data)?;
                Some(Reply::new(Op::Direction, Value::Vector(state.direction)))
            }
            _ => None,
        }
    }

    fn apply_heart_rate(command: u8, frame: &Frame, state: &mut State) -> Option<Reply<Op>> {
        match command {
            0x00 => {
                let (enabled, reply) = switch_reply(frame, Op::HeartRateOn, Op::HeartRateOff)?;
                state.heart_rate_enabled = enabled;
                Some(reply)
            }
            0x0A => {
                let (enabled, reply) =
                    switch_reply(frame, Op::HeartRateWaveformOn, Op::HeartRateWaveformOff)?;
                state.heart_rate_waveform_enabled = enabled;
                Some(reply)
            }
            0x02 => {
                state.heart_rate = frame.first()?;
                None
            }
            0x05 => {
                state.heart_rate_waveform = Some(waveform(&frame.data)?);
                None
            }
            0x80 => {
                state.heart_rate_enabled = frame.first()? == 1;
                Some(Reply::new(Op::HeartRateSwitch, Value::Bool(state.heart_rate_enabled)))
            }
            0x8A => {
                state.heart_rate_waveform_enabled = frame.first()? == 1;
                Some(Reply::new(
                    Op::HeartRateWaveformSwitch,
                    Value::Bool(state.heart_rate_waveform_enabled),
                ))
            }
            0x82 => {
                state.heart_rate = frame.first()?;
                Some(Reply::new(Op::HeartRateValue, Value::U8(state.heart_rate)))
            }
            0x85 => {
                let wave = waveform(&frame.data)?;
                state.heart_rate_waveform = Some(wave);
                Some(Reply::new(Op::HeartRateWaveform, Value::Waveform(wave)))
            }
            _ => None,
        }
    }

    fn apply_breath(command: u8, frame: &Frame, state: &mut State) -> Option<Reply<Op>> {
        match command {
            0x00 => {
                let (enabled, reply) = switch_reply(frame, Op::BreathOn, Op::BreathOff)?;
                state.breath_enabled = enabled;
                Some(reply)
            }
            0x0C => {
                let (enabled, reply) =
                    switch_reply(frame, Op::BreathWaveformOn, Op::BreathWaveformOff)?;
                state.breath_waveform_enabled = enabled;
                Some(reply)
            }
            0x01 => {
                state.breath_info = frame.first()?;
                None
            }
            0x02 => {
                state.breath_rate = frame.first()?;
                None
            }
            0x05 => {
                state.breath_waveform = Some(waveform(&frame.data)?);
                None
            }
            0x0B => {
                state.low_breath_threshold = frame.first()?;
                Some(Reply::new(
                    Op::SetLowBreathThreshold,
                    Value::U8(state.low_breath_threshold),
                ))
            }
            0x8B => {
                state.low_breath_threshold = frame.first()?;
                Some(Reply::new(Op::LowBreathThreshold, Value::U8(state.low_breath_threshold)))
            }
            0x80 => {
                state.breath_enabled = frame.first()? == 1;
                Some(Reply::new(Op::BreathSwitch, Value::Bool(state.breath_enabled)))
            }
            0x8C => {
                state.breath_waveform_enabled = frame.first()? == 1;
                Some(Reply::new(
                    Op::BreathWaveformSwitch,
                    Value::Bool(state.breath_waveform_enabled),
                ))
            }
            0x81 => {
                state.breath_info = frame.first()?;
                Some(Reply::new(Op::BreathInfo, Value::U8(state.breath_info)))
            }
            0x82 => {
                state.breath_rate = frame.first()?;
                Some(Reply::new(Op::BreathValue, Value::U8(state.breath_rate)))
            }
            0x85 => {
                let wave = waveform(&frame.data)?;
                state.breath_waveform = Some(wave);
                Some(Reply::new(Op::BreathWaveform, Value::Waveform(wave)))
            }
            _ => None,
        }
    }

    fn apply_sleep(command: u8, frame: &Frame, state: &mut State) -> Option<Reply<Op>> {
        let data = frame.data.as_slice();
        match command {
            // Switch echoes
            0x00 => {
                let (enabled, reply) = switch_reply(frame, Op::SleepOn, Op::SleepOff)?;
                state.sleep_enabled = enabled;
                Some(reply)
            }
            0x13 => {
                let (enabled, reply) = switch_reply(frame, Op::StruggleOn, Op::StruggleOff)?;
                state.struggle_enabled = enabled;
                Some(reply)
            }
            0x14 => {
                let (enabled, reply) =
                    switch_reply(frame, Op::NoPersonTimingOn, Op::NoPersonTimingOff)?;
                state.no_person_timing_enabled = enabled;
                Some(reply)
            }

            // Parameter echoes
            0x1A => {
                state.struggle_sensitivity = frame.first()?;
                Some(Reply::new(
                    Op::SetStruggleSensitivity,
                    Value::U8(state.struggle_sensitivity),
                ))
            }
            0x15 => {
                state.no_person_timing_duration = frame.first()?;
                Some(Reply::new(
                    Op::SetNoPersonTimingDuration,
                    Value::U8(state.no_person_timing_duration),
                ))
            }
            0x16 => {
                state.sleep_end_duration = frame.first()?;
                Some(Reply::new(Op::SetSleepEndDuration, Value::U8(state.sleep_end_duration)))
            }

            // Telemetry
            0x01 => {
                state.bed_status = frame.first()?;
                None
            }
            0x02 => {
                state.sleep_status = frame.first()?;
                None
            }
            0x03 => {
                state.awake_duration = duration(data)?;
                None
            }
            0x04 => {
                state.light_sleep_duration = duration(data)?;
                None
            }
            0x05 => {
                state.deep_sleep_duration = duration(data)?;
                None
            }
            0x06 => {
                state.sleep_quality_score = frame.first()?;
                None
            }
            0x0C => {
                state.sleep_summary = Some(parse_summary(data)?);
                None
            }
            0x0D => {
                // The periodic report only refreshes the score
                let stats = parse_statistics(data)?;
                state.sleep_quality_score = stats.quality_score;
                None
            }
            0x0E => {
                state.sleep_anomaly = frame.first()?;
                None
            }
            0x10 => {
                state.sleep_quality_level = frame.first()?;
                None
            }
            0x11 => {
                state.struggle_status = frame.first()?;
                None
            }
            0x12 => {
                state.no_person_timing_status = frame.first()?;
                None
            }

            // Query replies
            0x80 => {
                state.sleep_enabled = frame.first()? == 1;
                Some(Reply::new(Op::SleepSwitch, Value::Bool(state.sleep_enabled)))
            }
            0x93 => {
                state.struggle_enabled = frame.first()? == 1;
                Some(Reply::new(Op::StruggleSwitch, Value::Bool(state.struggle_enabled)))
            }
            0x91 => {
                state.struggle_status = frame.first()?;
                Some(Reply::new(Op::StruggleStatus, Value::U8(state.struggle_status)))
            }
            0x9A => {
                state.struggle_sensitivity = frame.first()?;
                Some(Reply::new(Op::StruggleSensitivity, Value::U8(state.struggle_sensitivity)))
            }
            0x94 => {
                state.no_person_timing_enabled = frame.first()? == 1;
                Some(Reply::new(
                    Op::NoPersonTimingSwitch,
                    Value::Bool(state.no_person_timing_enabled),
                ))
            }
            0x95 => {
                state.no_person_timing_duration = frame.first()?;
                Some(Reply::new(
                    Op::NoPersonTimingDuration,
                    Value::U8(state.no_person_timing_duration),
                ))
            }
            0x92 => {
                state.no_person_timing_status = frame.first()?;
                Some(Reply::new(
                    Op::NoPersonTimingStatus,
                    Value::U8(state.no_person_timing_status),
                ))
            }
            0x96 => {
                state.sleep_end_duration = frame.first()?;
                Some(Reply::new(Op::SleepEndDuration, Value::U8(state.sleep_end_duration)))
            }
            0x81 => {
                state.bed_status = frame.first()?;
                Some(Reply::new(Op::BedStatus, Value::U8(state.bed_status)))
            }
            0x82 => {
                state.sleep_status = frame.first()?;
                Some(Reply::new(Op::SleepStatus, Value::U8(state.sleep_status)))
            }
            0x83 => {
                state.awake_duration = duration(data)?;
                Some(Reply::new(Op::AwakeDuration, Value::U16(state.awake_duration)))
            }
            0x84 => {
                state.light_sleep_duration = duration(data)?;
                Some(Reply::new(Op::LightSleepDuration, Value::U16(state.light_sleep_duration)))
            }
            0x85 => {
                state.deep_sleep_duration = duration(data)?;
                Some(Reply::new(Op::DeepSleepDuration, Value::U16(state.deep_sleep_duration)))
            }
            0x86 => {
                state.sleep_quality_score = frame.first()?;
                Some(Reply::new(Op::SleepQualityScore, Value::U8(state.sleep_quality_score)))
            }
            0x8D => {
                let summary = parse_summary(data)?;
                state.sleep_summary = Some(summary);
                Some(Reply::new(Op::SleepSummary, Value::SleepSummary(summary)))
            }
            0x8E => {
                state.sleep_anomaly = frame.first()?;
                Some(Reply::new(Op::SleepAnomaly, Value::U8(state.sleep_anomaly)))
            }
            0x8F => {
                let stats = parse_statistics(data)?;
                state.sleep_statistics = Some(stats);
                Some(Reply::new(Op::SleepStatistics, Value::SleepStatistics(stats)))
            }
            0x90 => {
                state.sleep_quality_level = frame.first()?;
                Some(Reply::new(Op::SleepQualityLevel, Value::U8(state.sleep_quality_level)))
            }
            _ => None,
        }
    }
}

impl DeviceProfile for R60Abd1 {
    type Op = Op;
    type State = State;

    const MODEL: Model = Model::R60ABD1;

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
            (0x01, 0x01) => {
                state.system.heartbeat_ms = Some(now_ms);
                None
            }
            (0x01, 0x80) => {
                state.system.heartbeat_ms = Some(now_ms);
                Some(Reply::new(Op::Heartbeat, Value::Bool(true)))
            }
            (0x07, 0x07) => {
                state.radar_in_range = frame.first()? == 1;
                None
            }
            // The query asks "out of bounds?", so true means out of range
            (0x07, 0x87) => {
                let out_of_range = frame.first()? == 1;
                state.radar_in_range = !out_of_range;
                Some(Reply::new(Op::RadarRangeBoundary, Value::Bool(out_of_range)))
            }
            (0x80, command) => Self::apply_presence(command, frame, state),
            (0x81, command) => Self::apply_breath(command, frame, state),
            (0x84, command) => Self::apply_sleep(command, frame, state),
            (0x85, command) => Self::apply_heart_rate(command, frame, state),
            _ => None,
        }
    }
}
