//! Frame dispatch contract.
//!
//! A dispatch table decodes one incoming frame, writes the result into the
//! device state mirror and, when the frame answers an operation, reports
//! which one through a [`Reply`]. Whether that reply completes the
//! operation in flight is decided by the engine, not by the table.
//!
//! The frames in the system group (control 0x01, 0x02 and 0x05) are laid
//! out the same way on every model and are handled by [`apply_system`].

use serde::{Deserialize, Serialize};

use crate::catalog::{Operation, StandardOp};
use crate::models::Model;
use crate::protocol::decode::decode_text;
use crate::protocol::Frame;
use crate::value::Value;

// =============================================================================
// Reply
// =============================================================================

/// A frame recognized as the answer to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<O> {
    pub operation: O,
    pub value: Value,
}

impl<O> Reply<O> {
    pub fn new(operation: O, value: Value) -> Self {
        Reply { operation, value }
    }
}

// =============================================================================
// Device Profile
// =============================================================================

/// Everything model specific the generic engine needs: the operation
/// catalog, the dispatch table and the shape of the state mirror.
pub trait DeviceProfile: Send + Sync + 'static {
    type Op: Operation;
    type State: Default + Clone + Serialize + Send + Sync + 'static;

    const MODEL: Model;

    /// Map a family-wide operation to this model's catalog entry
    fn standard(op: StandardOp) -> Self::Op;

    /// Decode one frame into the mirror. Returns the operation the frame
    /// answers, or `None` for telemetry and unknown frames.
    fn apply(frame: &Frame, state: &mut Self::State, now_ms: u64) -> Option<Reply<Self::Op>>;

    fn system(state: &Self::State) -> &SystemState;
}

// =============================================================================
// System Group
// =============================================================================

/// Identity strings reported by the module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub product_model: String,
    pub product_id: String,
    pub hardware_model: String,
    pub firmware_version: String,
}

/// Mirror fields common to every model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemState {
    pub identity: DeviceIdentity,
    /// Module reports its start-up sequence as finished
    pub initialized: bool,
    pub initialized_ms: Option<u64>,
    pub heartbeat_ms: Option<u64>,
    pub reset_ms: Option<u64>,
    /// 0 none, other values are module specific fault codes
    pub fault: u8,
    pub fault_ms: Option<u64>,
    /// Environment / scene mode, where the model reports one
    pub scene: u8,
}

/// Handle the frames shared by the whole family.
///
/// Returns `None` both for telemetry and for frames outside the system
/// group; callers fall through to their own table either way.
pub fn apply_system(frame: &Frame, state: &mut SystemState, now_ms: u64) -> Option<(StandardOp, Value)> {
    let data = frame.data.as_slice();
    match frame.key() {
        (0x01, 0x02) => {
            state.reset_ms = Some(now_ms);
            Some((StandardOp::Reset, Value::Bool(true)))
        }
        (0x02, command @ 0xA1..=0xA4) if !data.is_empty() => {
            let text = decode_text(data);
            let (op, field) = match command {
                0xA1 => (StandardOp::ProductModel, &mut state.identity.product_model),
                0xA2 => (StandardOp::ProductId, &mut state.identity.product_id),
                0xA3 => (StandardOp::HardwareModel, &mut state.identity.hardware_model),
                _ => (StandardOp::FirmwareVersion, &mut state.identity.firmware_version),
            };
            *field = text.clone();
            Some((op, Value::Text(text)))
        }
        (0x05, 0x01) => {
            if let Some(b) = frame.first() {
                state.initialized = b == 1;
                state.initialized_ms = Some(now_ms);
            }
            None
        }
        (0x05, 0x02) => {
            if let Some(b) = frame.first() {
                state.fault = b;
                state.fault_ms = Some(now_ms);
            }
            None
        }
        (0x05, 0x81) => {
            let b = frame.first()?;
            state.initialized = b == 1;
            state.initialized_ms = Some(now_ms);
            Some((StandardOp::InitComplete, Value::Bool(b == 1)))
        }
        _ => None,
    }
}

/// Decode the reply to a shared on/off key.
///
/// The enable and disable operations of a feature use the same
/// (control, command) pair and differ only in the payload, so the echoed
/// payload decides which of the two the frame answers: 1 is "on", anything
/// else "off".
pub fn switch_reply<O: Operation>(frame: &Frame, on: O, off: O) -> Option<(bool, Reply<O>)> {
    let enabled = frame.first()? == 1;
    let op = if enabled { on } else { off };
    Some((enabled, Reply::new(op, Value::Bool(enabled))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_frames() {
        let mut state = SystemState::default();
        let frame = Frame::new(0x02, 0xA1, b"R60ABD1\0\0".to_vec());
        let (op, value) = apply_system(&frame, &mut state, 10).unwrap();
        assert_eq!(op, StandardOp::ProductModel);
        assert_eq!(value, Value::Text("R60ABD1".into()));
        assert_eq!(state.identity.product_model, "R60ABD1");

        let frame = Frame::new(0x02, 0xA4, b"G60SM1SYv010309".to_vec());
        apply_system(&frame, &mut state, 11).unwrap();
        assert_eq!(state.identity.firmware_version, "G60SM1SYv010309");
    }

    #[test]
    fn test_empty_identity_is_ignored() {
        let mut state = SystemState::default();
        assert!(apply_system(&Frame::new(0x02, 0xA2, Vec::<u8>::new()), &mut state, 0).is_none());
        assert_eq!(state.identity, DeviceIdentity::default());
    }

    #[test]
    fn test_init_report_is_telemetry() {
        let mut state = SystemState::default();
        assert!(apply_system(&Frame::new(0x05, 0x01, vec![1]), &mut state, 42).is_none());
        assert!(state.initialized);
        assert_eq!(state.initialized_ms, Some(42));
    }

    #[test]
    fn test_init_query_reply() {
        let mut state = SystemState::default();
        let reply = apply_system(&Frame::new(0x05, 0x81, vec![0]), &mut state, 0);
        assert_eq!(reply, Some((StandardOp::InitComplete, Value::Bool(false))));
        assert!(!state.initialized);
    }

    #[test]
    fn test_unknown_key_is_ignored() {
        let mut state = SystemState::default();
        assert!(apply_system(&Frame::new(0x05, 0x7E, vec![1]), &mut state, 0).is_none());
        assert_eq!(state, SystemState::default());
    }
}
