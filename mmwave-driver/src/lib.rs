//! Threaded driver for R60 series mm-wave radars.
//!
//! Builds on the model catalogs in `mmwave_core` and adds what needs an
//! operating system: a serial transport, the background poller, the
//! blocking operation executor and the start-up sequence.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ RadarDevice<P, C>   typed query / set / enable calls          │
//! │   └─ init           identity, readiness, configure, verify    │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Engine<P>           one operation in flight, wait + drain     │
//! │   └─ Poller         tick thread ─► channel ─► dispatch thread │
//! ├──────────────────────────────────────────────────────────────┤
//! │ FrameTransport      SerialTransport, or any test double       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call returns a `Result`: `Ok` carries the decoded reply, `Err`
//! says why there was none. Only [`OperationError::InvalidStatus`] means
//! the module sent something it should not have.

use std::time::Duration;

pub mod device;
pub mod engine;
pub mod error;
pub mod init;
pub mod serial_io;
pub mod settings;

pub use device::{ConfigurationStatus, RadarDevice};
pub use engine::Engine;
pub use error::{DeviceError, OperationError};
pub use init::{ConfigStep, FeatureConfig, VerifyCheck};
pub use serial_io::SerialTransport;
pub use settings::{Settings, SettingsError};

#[cfg(feature = "r60abd1")]
pub use device::r60abd1::{Abd1Config, R60Abd1Device};
#[cfg(feature = "r60afd1")]
pub use device::r60afd1::{Afd1Config, R60Afd1Device};
#[cfg(feature = "r60amp1")]
pub use device::r60amp1::{Amp1Config, R60Amp1Device};

/// Timeout of a query, set, enable or disable call when the caller passes `None`
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);
