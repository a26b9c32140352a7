//! R60AMP1 presence and trajectory radar.
//!
//! Besides the system group the module reports presence, motion, a body
//! motion parameter and a list of tracked targets.

use serde::Serialize;

use crate::catalog::{Operation, StandardOp, WireCommand, OFF, ON, QUERY};
use crate::dispatch::{apply_system, switch_reply, DeviceProfile, Reply, SystemState};
use crate::models::Model;
use crate::protocol::decode::{sm16_at, u16_at};
use crate::protocol::Frame;
use crate::value::{TrajectoryTarget, Value};

/// Bytes per target in a trajectory frame
pub const TARGET_LEN: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Heartbeat,
    Reset,
    ProductModel,
    ProductId,
    HardwareModel,
    FirmwareVersion,
    InitComplete,
    PresenceOn,
    PresenceOff,
    PresenceSwitch,
    PresenceStatus,
    MotionStatus,
    BodyMotion,
    Trajectory,
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
        Op::PresenceOn,
        Op::PresenceOff,
        Op::PresenceSwitch,
        Op::PresenceStatus,
        Op::MotionStatus,
        Op::BodyMotion,
        Op::Trajectory,
    ];
}

impl Operation for Op {
    fn wire(&self) -> WireCommand {
        match self {
            Op::Heartbeat => WireCommand::new(0x01, 0x01, QUERY, "Heartbeat"),
            Op::Reset => WireCommand::new(0x01, 0x02, QUERY, "Module Reset"),
            Op::ProductModel => WireCommand::new(0x02, 0xA1, QUERY, "Product Model"),
            Op::ProductId => WireCommand::new(0x02, 0xA2, QUERY, "Product ID"),
            Op::HardwareModel => WireCommand::new(0x02, 0xA3, QUERY, "Hardware Model"),
            Op::FirmwareVersion => WireCommand::new(0x02, 0xA4, QUERY, "Firmware Version"),
            Op::InitComplete => WireCommand::new(0x05, 0x81, QUERY, "Init Complete"),
            Op::PresenceOn => WireCommand::new(0x80, 0x00, ON, "Human Presence ON"),
            Op::PresenceOff => WireCommand::new(0x80, 0x00, OFF, "Human Presence OFF"),
            Op::PresenceSwitch => WireCommand::new(0x80, 0x80, QUERY, "Human Presence Switch"),
            Op::PresenceStatus => WireCommand::new(0x80, 0x81, QUERY, "Presence Status"),
            Op::MotionStatus => WireCommand::new(0x80, 0x82, QUERY, "Motion Info"),
            Op::BodyMotion => WireCommand::new(0x80, 0x83, QUERY, "Body Motion Parameter"),
            Op::Trajectory => WireCommand::new(0x82, 0x82, QUERY, "Trajectory Info"),
        }
    }
}

/// Last known R60AMP1 properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct State {
    pub system: SystemState,
    pub presence_enabled: bool,
    /// Raw presence byte (0 nobody, 1 somebody)
    pub presence: u8,
    /// Raw motion byte (0 none, 1 static, 2 active)
    pub motion: u8,
    /// Body motion parameter, 0-100
    pub body_motion: u8,
    pub targets: Vec<TrajectoryTarget>,
    pub trajectory_ms: Option<u64>,
}

/// Split a trajectory payload into targets; a trailing partial record is ignored
pub fn parse_trajectory(data: &[u8]) -> Vec<TrajectoryTarget> {
    data.chunks_exact(TARGET_LEN)
        .map(|t| TrajectoryTarget {
            index: t[0],
            size: t[1],
            feature: t[2],
            x: sm16_at(t, 3),
            y: sm16_at(t, 5),
            height: u16_at(t, 7),
            speed: sm16_at(t, 9),
        })
        .collect()
}

pub struct R60Amp1;

impl DeviceProfile for R60Amp1 {
    type Op = Op;
    type State = State;

    const MODEL: Model = Model::R60AMP1;

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
                Some(Reply::new(Op::Heartbeat, Value::Bool(true)))
            }
            // Environment mode: default, living room, bedroom, bathroom
            (0x05, 0x07) => {
                state.system.scene = frame.first()?;
                None
            }

            (0x80, 0x00) => {
                let (enabled, reply) = switch_reply(frame, Op::PresenceOn, Op::PresenceOff)?;
                state.presence_enabled = enabled;
                Some(reply)
            }
            (0x80, 0x01) => {
                state.presence = frame.first()?;
                None
            }
            (0x80, 0x02) => {
                state.motion = frame.first()?;
                None
            }
            (0x80, 0x03) => {
                state.body_motion = frame.first()?;
                None
            }
            (0x80, 0x80) => {
                state.presence_enabled = frame.first()? == 1;
                Some(Reply::new(Op::PresenceSwitch, Value::Bool(state.presence_enabled)))
            }
            (0x80, 0x81) => {
                state.presence = frame.first()?;
                Some(Reply::new(Op::PresenceStatus, Value::U8(state.presence)))
            }
            (0x80, 0x82) => {
                state.motion = frame.first()?;
                Some(Reply::new(Op::MotionStatus, Value::U8(state.motion)))
            }
            (0x80, 0x83) => {
                state.body_motion = frame.first()?;
                Some(Reply::new(Op::BodyMotion, Value::U8(state.body_motion)))
            }

            (0x82, 0x02) if !frame.data.is_empty() => {
                state.targets = parse_trajectory(&frame.data);
                state.trajectory_ms = Some(now_ms);
                None
            }
            (0x82, 0x82) if !frame.data.is_empty() => {
                state.targets = parse_trajectory(&frame.data);
                state.trajectory_ms = Some(now_ms);
                Some(Reply::new(Op::Trajectory, Value::Targets(state.targets.clone())))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(frame: Frame, state: &mut State) -> Option<Reply<Op>> {
        R60Amp1::apply(&frame, state, 1000)
    }

    #[test]
    fn test_heartbeat_reply() {
        let mut state = State::default();
        let reply = apply(Frame::new(0x01, 0x01, vec![0x0F]), &mut state).unwrap();
        assert_eq!(reply.operation, Op::Heartbeat);
        assert_eq!(state.system.heartbeat_ms, Some(1000));
    }

    #[test]
    fn test_presence_switch_echo() {
        let mut state = State::default();
        let reply = apply(Frame::new(0x80, 0x00, vec![1]), &mut state).unwrap();
        assert_eq!(reply, Reply::new(Op::PresenceOn, Value::Bool(true)));
        assert!(state.presence_enabled);

        let reply = apply(Frame::new(0x80, 0x00, vec![0]), &mut state).unwrap();
        assert_eq!(reply.operation, Op::PresenceOff);
        assert!(!state.presence_enabled);
    }

    #[test]
    fn test_telemetry_has_no_reply() {
        let mut state = State::default();
        assert!(apply(Frame::new(0x80, 0x01, vec![1]), &mut state).is_none());
        assert!(apply(Frame::new(0x80, 0x02, vec![2]), &mut state).is_none());
        assert_eq!(state.presence, 1);
        assert_eq!(state.motion, 2);
    }

    #[test]
    fn test_out_of_range_status_is_stored_raw() {
        let mut state = State::default();
        let reply = apply(Frame::new(0x80, 0x82, vec![9]), &mut state).unwrap();
        assert_eq!(reply.value, Value::U8(9));
        assert_eq!(state.motion, 9);
    }

    #[test]
    fn test_trajectory() {
        let mut data = vec![1, 2, 3, 0x80, 0x0A, 0x00, 0x64, 0x00, 0xAA, 0x80, 0x05];
        data.extend_from_slice(&[2, 1, 0, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04]);
        data.extend_from_slice(&[9, 9]);
        let mut state = State::default();
        let reply = apply(Frame::new(0x82, 0x82, data), &mut state).unwrap();
        assert_eq!(reply.operation, Op::Trajectory);
        assert_eq!(state.targets.len(), 2);
        assert_eq!(
            state.targets[0],
            TrajectoryTarget {
                index: 1,
                size: 2,
                feature: 3,
                x: -10,
                y: 100,
                height: 170,
                speed: -5,
            }
        );
        assert_eq!(state.targets[1].speed, 4);
    }

    #[test]
    fn test_unknown_frame_ignored() {
        let mut state = State::default();
        assert!(apply(Frame::new(0x84, 0x01, vec![1]), &mut state).is_none());
        assert!(apply(Frame::new(0x80, 0x81, Vec::<u8>::new()), &mut state).is_none());
        assert_eq!(state, State::default());
    }

    #[test]
    fn test_catalog_keys_unique() {
        for (i, a) in Op::ALL.iter().enumerate() {
            for b in &Op::ALL[i + 1..] {
                let (wa, wb) = (a.wire(), b.wire());
                assert!(
                    wa.key() != wb.key() || wa.payload != wb.payload,
                    "{:?} and {:?} share a frame",
                    a,
                    b
                );
            }
        }
    }
}
