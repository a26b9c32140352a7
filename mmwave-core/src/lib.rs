//! # mmwave Core
//!
//! Platform-independent protocol library for the R60 family of mm-wave
//! radar sensors.
//!
//! This crate contains the frame codec, the command catalogs, the frame
//! dispatch tables and the operation state machine with **zero I/O
//! dependencies**: no threads, no serial port, no clock.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  mmwave-core (platform-independent, no threads, no I/O)     │
//! │  ├── protocol/   (SY frame codec, parser, field decoders)   │
//! │  ├── catalog     (operation → wire parameters)              │
//! │  ├── dispatch    (frame → state mirror + reply)             │
//! │  ├── operation   (single in-flight operation state machine) │
//! │  ├── models/     (R60AMP1, R60ABD1, R60AFD1)                │
//! │  └── FrameTransport (abstracts the serial link)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!              ┌───────────────┴───────────────┐
//!              │  mmwave-driver                │
//!              │  (engine, poller, init,       │
//!              │   SerialTransport, CLI)       │
//!              └───────────────────────────────┘
//! ```
//!
//! ## Supported Radars
//!
//! | Model   | Functions                                        |
//! |---------|--------------------------------------------------|
//! | R60AMP1 | presence, motion, trajectory                     |
//! | R60ABD1 | presence, heart rate, breathing, sleep           |
//! | R60AFD1 | presence, fall detection, static stay, tracking  |
//!
//! ## Feature Flags
//!
//! - `r60amp1` - R60AMP1 catalog and dispatch table (default)
//! - `r60abd1` - R60ABD1 catalog and dispatch table (default)
//! - `r60afd1` - R60AFD1 catalog and dispatch table (default)
//!
//! ## Example: Decoding a Reply
//!
//! ```rust
//! # #[cfg(feature = "r60amp1")] {
//! use mmwave_core::models::r60amp1::{Op, R60Amp1, State};
//! use mmwave_core::{DeviceProfile, Frame, Value};
//!
//! let mut state = State::default();
//! let reply = R60Amp1::apply(&Frame::new(0x80, 0x80, vec![1]), &mut state, 0).unwrap();
//! assert_eq!(reply.operation, Op::PresenceSwitch);
//! assert_eq!(reply.value, Value::Bool(true));
//! assert!(state.presence_enabled);
//! # }
//! ```

pub mod catalog;
pub mod dispatch;
pub mod error;
pub mod io;
pub mod models;
pub mod operation;
pub mod protocol;
pub mod status;
pub mod value;

// Re-export commonly used types
pub use catalog::{Operation, StandardOp, WireCommand};
pub use dispatch::{DeviceIdentity, DeviceProfile, Reply, SystemState};
pub use error::{FrameError, StatusError};
pub use io::{FrameTransport, TransportError, TransportStats};
pub use models::{Model, ModelInfo};
pub use operation::{Offer, OperationState, OperationStats, OperationTracker};
pub use protocol::parser::FrameParser;
pub use protocol::Frame;
pub use value::Value;
