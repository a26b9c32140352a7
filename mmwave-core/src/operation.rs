//! Operation state machine for request/response correlation.
//!
//! A radar handle may have at most one operation in flight. This module
//! tracks that single slot as an explicit state value instead of a set of
//! loose flags, so "busy", "waiting" and "answered" cannot disagree.
//!
//! # Architecture
//!
//! ```text
//!           try_begin()                 offer() matching reply
//!   ┌──────┐ ──────────► ┌──────────────────┐ ──────────► ┌─────────────────┐
//!   │ Idle │             │ InFlight (empty) │             │ InFlight (done) │
//!   └──────┘ ◄────────── └──────────────────┘             └─────────────────┘
//!      ▲        finish()                                           │
//!      └───────────────────────────────────────────────────────────┘
//!                                 finish()
//! ```
//!
//! The tracker is a pure state machine with no I/O and no clock: callers
//! pass the current time in milliseconds, the same way the connection
//! handling does.
//!
//! # Usage
//!
//! ```
//! use mmwave_core::operation::{Offer, OperationTracker};
//! use mmwave_core::Value;
//!
//! let mut tracker = OperationTracker::new();
//! tracker.try_begin("presence switch", 0, 200).unwrap();
//! assert!(tracker.try_begin("motion", 5, 200).is_err());
//!
//! assert_eq!(tracker.offer("presence switch", Value::Bool(true)), Offer::Completed);
//! assert_eq!(tracker.take_result(), Some(Value::Bool(true)));
//! tracker.finish();
//! assert!(tracker.is_idle());
//! ```

use serde::Serialize;

use crate::value::Value;

// =============================================================================
// Operation State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OperationState<O> {
    /// No operation in flight
    #[default]
    Idle,
    /// One operation waiting for (or holding) its reply
    InFlight {
        operation: O,
        started_ms: u64,
        deadline_ms: u64,
        /// Filled in by the dispatch of the matching reply
        result: Option<Value>,
    },
}

impl<O> OperationState<O> {
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationState::Idle)
    }

    /// In flight and answered
    pub fn is_complete(&self) -> bool {
        matches!(self, OperationState::InFlight { result: Some(_), .. })
    }
}

/// Outcome of offering a decoded reply to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offer<O> {
    /// The reply completed the operation in flight
    Completed,
    /// No operation was in flight
    Unsolicited,
    /// A different operation is in flight; the reply is telemetry
    Mismatch { expected: O },
    /// The operation in flight already has its result
    Duplicate,
}

/// Counters kept across operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    pub started: u64,
    pub completed: u64,
    pub rejected_busy: u64,
    pub unsolicited: u64,
}

// =============================================================================
// Operation Tracker
// =============================================================================

#[derive(Debug, Clone)]
pub struct OperationTracker<O> {
    state: OperationState<O>,
    stats: OperationStats,
}

impl<O> Default for OperationTracker<O> {
    fn default() -> Self {
        OperationTracker {
            state: OperationState::Idle,
            stats: OperationStats::default(),
        }
    }
}

impl<O: Copy + PartialEq> OperationTracker<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &OperationState<O> {
        &self.state
    }

    pub fn stats(&self) -> OperationStats {
        self.stats
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// The operation currently in flight
    pub fn in_flight(&self) -> Option<O> {
        match &self.state {
            OperationState::InFlight { operation, .. } => Some(*operation),
            OperationState::Idle => None,
        }
    }

    /// Check whether the operation in flight has passed its deadline.
    pub fn is_expired(&self, current_time_ms: u64) -> bool {
        match &self.state {
            OperationState::InFlight { deadline_ms, .. } => current_time_ms >= *deadline_ms,
            OperationState::Idle => false,
        }
    }

    // -------------------------------------------------------------------------
    // State Transitions
    // -------------------------------------------------------------------------

    /// Claim the slot for `operation`.
    ///
    /// Fails with the operation already in flight when the slot is taken.
    /// No queuing: the caller has to retry later.
    pub fn try_begin(&mut self, operation: O, current_time_ms: u64, timeout_ms: u64) -> Result<(), O> {
        if let Some(current) = self.in_flight() {
            self.stats.rejected_busy += 1;
            return Err(current);
        }
        self.state = OperationState::InFlight {
            operation,
            started_ms: current_time_ms,
            deadline_ms: current_time_ms.saturating_add(timeout_ms),
            result: None,
        };
        self.stats.started += 1;
        Ok(())
    }

    /// Offer a decoded reply.
    ///
    /// Only a reply for the exact operation in flight completes it; anything
    /// else leaves the state untouched.
    pub fn offer(&mut self, operation: O, value: Value) -> Offer<O> {
        match &mut self.state {
            OperationState::Idle => {
                self.stats.unsolicited += 1;
                Offer::Unsolicited
            }
            OperationState::InFlight {
                operation: expected,
                ..
            } if *expected != operation => Offer::Mismatch {
                expected: *expected,
            },
            OperationState::InFlight {
                result: Some(_), ..
            } => Offer::Duplicate,
            OperationState::InFlight { result, .. } => {
                *result = Some(value);
                self.stats.completed += 1;
                Offer::Completed
            }
        }
    }

    /// Take the result of a completed operation.
    ///
    /// The slot stays claimed until [`finish`](Self::finish), so a late
    /// duplicate reply cannot start being treated as unsolicited while the
    /// caller is still returning.
    pub fn take_result(&mut self) -> Option<Value> {
        match &mut self.state {
            OperationState::InFlight { result, .. } => result.take(),
            OperationState::Idle => None,
        }
    }

    /// Release the slot, whatever state it is in.
    pub fn finish(&mut self) {
        self.state = OperationState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Presence,
        Motion,
    }

    #[test]
    fn test_busy_rejection() {
        let mut tracker = OperationTracker::new();
        tracker.try_begin(Op::Presence, 100, 200).unwrap();
        assert_eq!(tracker.try_begin(Op::Motion, 110, 200), Err(Op::Presence));
        assert_eq!(tracker.in_flight(), Some(Op::Presence));
        assert_eq!(tracker.stats().rejected_busy, 1);
    }

    #[test]
    fn test_deadline() {
        let mut tracker = OperationTracker::new();
        assert!(!tracker.is_expired(1_000_000));
        tracker.try_begin(Op::Presence, 100, 200).unwrap();
        assert!(!tracker.is_expired(299));
        assert!(tracker.is_expired(300));
    }

    #[test]
    fn test_mismatched_reply_is_telemetry() {
        let mut tracker = OperationTracker::new();
        tracker.try_begin(Op::Presence, 0, 200).unwrap();
        assert_eq!(
            tracker.offer(Op::Motion, Value::U8(1)),
            Offer::Mismatch {
                expected: Op::Presence
            }
        );
        assert!(!tracker.state().is_complete());
        assert_eq!(tracker.offer(Op::Presence, Value::Bool(true)), Offer::Completed);
        assert!(tracker.state().is_complete());
    }

    #[test]
    fn test_first_reply_wins() {
        let mut tracker = OperationTracker::new();
        tracker.try_begin(Op::Motion, 0, 200).unwrap();
        tracker.offer(Op::Motion, Value::U8(1));
        assert_eq!(tracker.offer(Op::Motion, Value::U8(2)), Offer::Duplicate);
        assert_eq!(tracker.take_result(), Some(Value::U8(1)));
        assert_eq!(tracker.take_result(), None);
    }

    #[test]
    fn test_unsolicited_when_idle() {
        let mut tracker: OperationTracker<Op> = OperationTracker::new();
        assert_eq!(tracker.offer(Op::Presence, Value::Bool(true)), Offer::Unsolicited);
        assert_eq!(tracker.stats().unsolicited, 1);
        assert!(tracker.is_idle());
    }

    #[test]
    fn test_finish_releases_slot() {
        let mut tracker = OperationTracker::new();
        tracker.try_begin(Op::Presence, 0, 200).unwrap();
        tracker.finish();
        assert!(tracker.is_idle());
        assert!(tracker.try_begin(Op::Motion, 10, 200).is_ok());
    }
}
