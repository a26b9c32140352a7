//! Start-up sequence.
//!
//! Every device handle runs the same four steps when it is created:
//!
//! 1. load the identity strings (product model, product ID, hardware model,
//!    firmware version)
//! 2. wait for the module to report that its own start-up is complete,
//!    resetting it once if it does not
//! 3. apply the feature configuration
//! 4. re-query the switches that were just set
//!
//! Only two outcomes are fatal: no identity item could be loaded at all, or
//! the module is still not ready after the reset. Anything else is recorded
//! in the configuration error log and the handle stays usable.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use mmwave_core::{DeviceProfile, StandardOp, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::engine::Engine;
use crate::error::DeviceError;
use crate::settings::SettingsError;

/// Timeout of each readiness query
const READY_QUERY_TIMEOUT: Duration = Duration::from_millis(500);
/// Pause between readiness queries
const READY_POLL: Duration = Duration::from_millis(200);
const RESET_TIMEOUT: Duration = Duration::from_millis(1000);
const IDENTITY_TIMEOUT: Duration = Duration::from_millis(200);
const STEP_TIMEOUT: Duration = Duration::from_millis(200);
const VERIFY_TIMEOUT: Duration = Duration::from_millis(500);

/// One configuration operation applied at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStep<O> {
    /// Used in the error log as "Failed to {name}"
    pub name: String,
    pub operation: O,
    /// Argument of a set operation; `None` sends the catalog payload
    pub payload: Option<Vec<u8>>,
}

impl<O> ConfigStep<O> {
    pub fn new(name: impl Into<String>, operation: O) -> Self {
        ConfigStep {
            name: name.into(),
            operation,
            payload: None,
        }
    }

    pub fn with_payload(name: impl Into<String>, operation: O, payload: Vec<u8>) -> Self {
        ConfigStep {
            name: name.into(),
            operation,
            payload: Some(payload),
        }
    }
}

/// A query run after configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyCheck<O> {
    pub name: String,
    pub operation: O,
    /// Value the query has to return; `None` only requires an answer
    pub expected: Option<bool>,
}

impl<O> VerifyCheck<O> {
    pub fn new(name: impl Into<String>, operation: O, expected: Option<bool>) -> Self {
        VerifyCheck {
            name: name.into(),
            operation,
            expected,
        }
    }
}

/// Feature configuration of one model.
///
/// `plan` lists what to send at start-up, in order; `checks` lists what to
/// query afterwards to confirm the module took it.
pub trait FeatureConfig<P: DeviceProfile>:
    Clone + Serialize + DeserializeOwned + Default + Send + Sync + 'static
{
    /// Settings as reported by `configuration_status`
    type Current: Serialize;

    fn validate(&self) -> Result<(), SettingsError>;

    fn plan(&self) -> Vec<ConfigStep<P::Op>>;

    fn checks(&self) -> Vec<VerifyCheck<P::Op>>;

    /// Current feature settings, taken from the mirror where the module reports them
    fn current(&self, state: &P::State) -> Self::Current;
}

/// Run the start-up sequence against a started engine.
///
/// Returns the configuration error log. The caller stops the engine on `Err`.
pub(crate) fn initialize<P, C>(engine: &Engine<P>, config: &C) -> Result<Vec<String>, DeviceError>
where
    P: DeviceProfile,
    C: FeatureConfig<P>,
{
    let started = Instant::now();
    let mut errors = Vec::new();

    load_identity(engine, &mut errors)?;

    if !wait_until_ready(engine, engine.settings().init_timeout()) {
        info!("{}: not ready, resetting", engine.key());
        if !reset_and_wait(engine) {
            return Err(DeviceError::Initialization(
                "Device initialization failed even after reset".to_string(),
            ));
        }
    }

    for step in config.plan() {
        if let Err(e) = engine.execute_with_retry(step.operation, step.payload.as_deref(), STEP_TIMEOUT) {
            warn!("{}: {} failed: {}", engine.key(), step.name, e);
            errors.push(format!("Failed to {}", step.name));
        }
    }

    for check in config.checks() {
        let verified = match engine.execute(check.operation, None, VERIFY_TIMEOUT) {
            Ok(value) => match check.expected {
                Some(expected) => value.as_bool() == Some(expected),
                None => true,
            },
            Err(e) => {
                debug!("{}: {} check failed: {}", engine.key(), check.name, e);
                false
            }
        };
        if !verified {
            warn!("{}: verification of {} failed", engine.key(), check.name);
            errors.push(format!("Verification failed: {}", check.name));
        }
    }

    info!(
        "{}: initialization completed in {} ms with {} errors",
        engine.key(),
        started.elapsed().as_millis(),
        errors.len()
    );
    Ok(errors)
}

fn load_identity<P: DeviceProfile>(engine: &Engine<P>, errors: &mut Vec<String>) -> Result<(), DeviceError> {
    let mut loaded = 0;
    for item in StandardOp::IDENTITY {
        match engine.execute_with_retry(P::standard(item), None, IDENTITY_TIMEOUT) {
            Ok(Value::Text(text)) => {
                debug!("{}: {} is '{}'", engine.key(), item.label(), text);
                loaded += 1;
            }
            Ok(other) => {
                debug!("{}: {} answered {:?}", engine.key(), item.label(), other);
                loaded += 1;
            }
            Err(e) => {
                warn!("{}: failed to load {}: {}", engine.key(), item.label(), e);
                errors.push(format!("Failed to load {}", item.label()));
            }
        }
    }
    if loaded == 0 {
        return Err(DeviceError::Initialization(
            "Failed to load device information".to_string(),
        ));
    }
    Ok(())
}

/// Poll the readiness query until it answers true or `timeout` passes
fn wait_until_ready<P: DeviceProfile>(engine: &Engine<P>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let init = P::standard(StandardOp::InitComplete);
    while Instant::now() < deadline {
        if let Ok(Value::Bool(true)) = engine.execute(init, None, READY_QUERY_TIMEOUT) {
            debug!("{}: device reports ready", engine.key());
            return true;
        }
        std::thread::sleep(READY_POLL);
    }
    debug!("{}: no readiness within {:?}", engine.key(), timeout);
    false
}

fn reset_and_wait<P: DeviceProfile>(engine: &Engine<P>) -> bool {
    let reset = P::standard(StandardOp::Reset);
    if let Err(e) = engine.execute_with_retry(reset, None, RESET_TIMEOUT) {
        warn!("{}: reset failed: {}", engine.key(), e);
        return false;
    }
    std::thread::sleep(engine.settings().reset_settle());
    wait_until_ready(engine, engine.settings().recovery_timeout())
}
