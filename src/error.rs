//! Error types used by the timer engine.
//!
//! Commands never fail: invalid transitions and missing children degrade to
//! no-ops. The only surfaced faults are caller contract violations against the
//! timer pool, described by [`TimerError`].
//!
//! Like the runtime's events, errors provide helper methods (`as_label`,
//! `as_message`) for logs.

use thiserror::Error;

use crate::timers::TimerId;

/// # Errors produced by timer operations.
///
/// Returned by [`Timers`](crate::Timers) when a handle no longer refers to a
/// live timer, or when a bounded timer is started with its loop budget spent.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The handle points to a timer that was released back to the pool.
    #[error("timer {id} was released to the pool")]
    Released {
        /// The stale handle.
        id: TimerId,
    },

    /// A bounded timer was registered after completing all of its loops.
    #[error("timer {id} already completed {completed} of {total} loops")]
    Exhausted {
        /// The rejected timer.
        id: TimerId,
        /// Loops completed so far.
        completed: u32,
        /// Configured loop budget.
        total: u32,
    },
}

impl TimerError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use cmdtick::{Loops, TimerError, TimerSpec, Timers};
    /// use std::time::Duration;
    ///
    /// let timers = Timers::default();
    /// let id = timers.acquire(TimerSpec::new(Duration::from_secs(1), Loops::Times(1)), || {});
    /// timers.release(id).unwrap();
    ///
    /// let err = timers.start(id).unwrap_err();
    /// assert_eq!(err.as_label(), "timer_released");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TimerError::Released { .. } => "timer_released",
            TimerError::Exhausted { .. } => "timer_exhausted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TimerError::Released { id } => format!("released: {id}"),
            TimerError::Exhausted {
                id,
                completed,
                total,
            } => format!("exhausted: {id} loops={completed}/{total}"),
        }
    }

    /// Returns the handle the error refers to.
    pub fn timer(&self) -> TimerId {
        match self {
            TimerError::Released { id } | TimerError::Exhausted { id, .. } => *id,
        }
    }
}
