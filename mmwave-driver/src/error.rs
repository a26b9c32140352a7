use mmwave_core::StatusError;
use thiserror::Error;

use crate::settings::SettingsError;

/// Failure of a single query, set, enable or disable call.
///
/// Everything except [`OperationError::InvalidStatus`] is the "no answer"
/// outcome of the protocol: the caller may retry. An invalid status means
/// the module did answer, but with a value outside the declared set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("{requested} rejected, {in_flight} is in flight")]
    Busy {
        requested: &'static str,
        in_flight: &'static str,
    },
    #[error("No reply to {operation} within {timeout_ms} ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
    #[error("Cannot send {operation}: {reason}")]
    SendFailed {
        operation: &'static str,
        reason: String,
    },
    #[error("Unexpected {kind} reply to {operation}")]
    UnexpectedValue {
        operation: &'static str,
        kind: &'static str,
    },
    #[error("{0}")]
    InvalidStatus(#[from] StatusError),
    #[error("Value {value} for {name} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("Value {value} for {name} is not a multiple of {step}")]
    OffStep {
        name: &'static str,
        value: i64,
        step: i64,
    },
}

impl OperationError {
    /// The module answered with something it should never send
    pub fn is_fault(&self) -> bool {
        matches!(self, OperationError::InvalidStatus(_))
    }
}

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Device initialization failed: {0}")]
    Initialization(String),
    #[error("{0}")]
    Settings(#[from] SettingsError),
    #[error("I/O operation failed")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invalid_status_is_fault() {
        let err: OperationError = StatusError {
            field: "motion status",
            value: 7,
        }
        .into();
        assert!(err.is_fault());
        assert_eq!(err.to_string(), "Invalid motion status: 7");

        let err = OperationError::Timeout {
            operation: "Presence Status",
            timeout_ms: 200,
        };
        assert!(!err.is_fault());
        assert_eq!(err.to_string(), "No reply to Presence Status within 200 ms");
    }
}
