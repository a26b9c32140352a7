//! Typed device handles.
//!
//! [`RadarDevice`] binds an [`Engine`] to one model's feature
//! configuration and runs the start-up sequence when it is created. The
//! methods every model shares live here; the per-model files add the
//! query, set, enable and disable calls of that model's catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use mmwave_driver::device::r60abd1::Abd1Config;
//! use mmwave_driver::{R60Abd1Device, SerialTransport, Settings};
//!
//! let io = SerialTransport::open("/dev/ttyUSB0")?;
//! let radar = R60Abd1Device::new(io, Abd1Config::default(), Settings::default())?;
//! println!("{}", radar.query_heart_rate_value(None)?);
//! ```

use std::time::Duration;

use log::{info, warn};
use mmwave_core::io::{FrameTransport, TransportStats};
use mmwave_core::operation::OperationStats;
use mmwave_core::status::decode_status;
use mmwave_core::{DeviceIdentity, DeviceProfile, Model, StandardOp, Value};
use num_traits::FromPrimitive;
use serde::Serialize;

use crate::engine::Engine;
use crate::error::{DeviceError, OperationError};
use crate::init::{initialize, FeatureConfig};
use crate::settings::Settings;
use crate::DEFAULT_TIMEOUT;

#[cfg(feature = "r60abd1")]
pub mod r60abd1;
#[cfg(feature = "r60afd1")]
pub mod r60afd1;
#[cfg(feature = "r60amp1")]
pub mod r60amp1;

/// Snapshot returned by [`RadarDevice::configuration_status`].
#[derive(Debug, Clone, Serialize)]
pub struct ConfigurationStatus<S> {
    pub model: Model,
    pub initialization_complete: bool,
    pub configuration_errors: Vec<String>,
    pub device_info: DeviceIdentity,
    pub current_settings: S,
    pub operation_stats: OperationStats,
    pub transport_stats: TransportStats,
}

pub struct RadarDevice<P: DeviceProfile, C: FeatureConfig<P>> {
    engine: Engine<P>,
    config: C,
    errors: Vec<String>,
    initialized: bool,
    closed: bool,
}

impl<P: DeviceProfile, C: FeatureConfig<P>> RadarDevice<P, C> {
    /// Start the poller and run the start-up sequence.
    ///
    /// Fails on invalid settings, or when the module cannot be identified or
    /// brought to a ready state. The poller is stopped again in that case.
    pub fn new<T>(transport: T, config: C, settings: Settings) -> Result<Self, DeviceError>
    where
        T: FrameTransport + Send + 'static,
    {
        settings.validate()?;
        config.validate()?;

        let engine = Engine::<P>::new(transport, settings);
        engine.start()?;
        info!("{}: starting initialization", engine.key());

        let errors = match initialize(&engine, &config) {
            Ok(errors) => errors,
            Err(e) => {
                warn!("{}: {}", engine.key(), e);
                engine.stop();
                return Err(e);
            }
        };

        Ok(RadarDevice {
            engine,
            config,
            errors,
            initialized: true,
            closed: false,
        })
    }

    pub fn engine(&self) -> &Engine<P> {
        &self.engine
    }

    /// Feature configuration the handle was created with
    pub fn config(&self) -> &C {
        &self.config
    }

    /// Snapshot of the state mirror
    pub fn state(&self) -> P::State {
        self.engine.state()
    }

    /// Configuration error log, oldest first
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn configuration_status(&self) -> ConfigurationStatus<C::Current> {
        let (device_info, current_settings) = self.engine.with_state(|state| {
            (P::system(state).identity.clone(), self.config.current(state))
        });
        ConfigurationStatus {
            model: P::MODEL,
            initialization_complete: self.initialized,
            configuration_errors: self.errors.clone(),
            device_info,
            current_settings,
            operation_stats: self.engine.operation_stats(),
            transport_stats: self.engine.transport_stats(),
        }
    }

    /// Stop the poller, apply what is still buffered and report the final
    /// transport statistics. Later calls return the same statistics.
    pub fn close(&mut self) -> TransportStats {
        if self.closed {
            return self.engine.transport_stats();
        }
        self.closed = true;
        self.engine.close()
    }

    // -------------------------------------------------------------------------
    // System group
    // -------------------------------------------------------------------------

    /// Reset the module. The default timeout depends on the model.
    pub fn reset(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        let timeout =
            timeout.unwrap_or_else(|| Duration::from_millis(P::MODEL.info().reset_timeout_ms));
        self.query_bool(P::standard(StandardOp::Reset), Some(timeout))
    }

    pub fn query_heartbeat(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(P::standard(StandardOp::Heartbeat), timeout)
    }

    pub fn query_product_model(&self, timeout: Option<Duration>) -> Result<String, OperationError> {
        self.query_text(P::standard(StandardOp::ProductModel), timeout)
    }

    pub fn query_product_id(&self, timeout: Option<Duration>) -> Result<String, OperationError> {
        self.query_text(P::standard(StandardOp::ProductId), timeout)
    }

    pub fn query_hardware_model(&self, timeout: Option<Duration>) -> Result<String, OperationError> {
        self.query_text(P::standard(StandardOp::HardwareModel), timeout)
    }

    pub fn query_firmware_version(&self, timeout: Option<Duration>) -> Result<String, OperationError> {
        self.query_text(P::standard(StandardOp::FirmwareVersion), timeout)
    }

    pub fn query_init_complete(&self, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(P::standard(StandardOp::InitComplete), timeout)
    }

    // -------------------------------------------------------------------------
    // Helpers for the model files
    // -------------------------------------------------------------------------

    pub(crate) fn query(&self, op: P::Op, timeout: Option<Duration>) -> Result<Value, OperationError> {
        self.engine.execute(op, None, timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Send `payload` in place of the catalog default
    pub(crate) fn set(
        &self,
        op: P::Op,
        payload: &[u8],
        timeout: Option<Duration>,
    ) -> Result<Value, OperationError> {
        self.engine.execute(op, Some(payload), timeout.unwrap_or(DEFAULT_TIMEOUT))
    }

    /// Enable or disable call; the reply carries the new switch position
    pub(crate) fn switch(&self, op: P::Op, timeout: Option<Duration>) -> Result<bool, OperationError> {
        self.query_bool(op, timeout)
    }

    pub(crate) fn query_bool(&self, op: P::Op, timeout: Option<Duration>) -> Result<bool, OperationError> {
        let value = self.query(op, timeout)?;
        value.as_bool().ok_or_else(|| unexpected(op, &value))
    }

    pub(crate) fn query_u8(&self, op: P::Op, timeout: Option<Duration>) -> Result<u8, OperationError> {
        let value = self.query(op, timeout)?;
        value.as_u8().ok_or_else(|| unexpected(op, &value))
    }

    pub(crate) fn query_u16(&self, op: P::Op, timeout: Option<Duration>) -> Result<u16, OperationError> {
        let value = self.query(op, timeout)?;
        value.as_u16().ok_or_else(|| unexpected(op, &value))
    }

    pub(crate) fn query_u32(&self, op: P::Op, timeout: Option<Duration>) -> Result<u32, OperationError> {
        let value = self.query(op, timeout)?;
        value.as_u32().ok_or_else(|| unexpected(op, &value))
    }

    pub(crate) fn query_i16(&self, op: P::Op, timeout: Option<Duration>) -> Result<i16, OperationError> {
        let value = self.query(op, timeout)?;
        value.as_i16().ok_or_else(|| unexpected(op, &value))
    }

    pub(crate) fn query_text(&self, op: P::Op, timeout: Option<Duration>) -> Result<String, OperationError> {
        match self.query(op, timeout)? {
            Value::Text(text) => Ok(text),
            other => Err(unexpected(op, &other)),
        }
    }

    /// Query an enumerated status byte and convert it, rejecting values
    /// outside the declared set
    pub(crate) fn query_status<T: FromPrimitive>(
        &self,
        op: P::Op,
        field: &'static str,
        timeout: Option<Duration>,
    ) -> Result<T, OperationError> {
        let raw = self.query_u8(op, timeout)?;
        Ok(decode_status(field, raw)?)
    }
}

impl<P: DeviceProfile, C: FeatureConfig<P>> Drop for RadarDevice<P, C> {
    fn drop(&mut self) {
        self.close();
    }
}

pub(crate) fn unexpected<O: mmwave_core::Operation>(op: O, value: &Value) -> OperationError {
    OperationError::UnexpectedValue {
        operation: op.name(),
        kind: value.kind(),
    }
}

/// Reject a set argument before anything reaches the wire
pub(crate) fn check_arg(name: &'static str, value: i64, min: i64, max: i64) -> Result<(), OperationError> {
    if value < min || value > max {
        return Err(OperationError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
