//! Confirmation timer implementation.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` periodically
//! (once a second is plenty; the engine works on elapsed deltas).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Armed -> (Confirmed | FalseAlarm | TimedOut) -> Idle (reset)
//! ```
//!
//! A lapsed countdown means `TimedOut`, and timeout is escalated as a real
//! emergency: absence of a user response is never treated as a false alarm.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = ConfirmationTimer::new();
//! timer.start(30)?;
//! // In a loop:
//! timer.tick(); // Returns Some(Event) on each elapsed second / timeout
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    /// Countdown running; the user may still confirm or cancel.
    Armed,
    Confirmed,
    FalseAlarm,
    TimedOut,
}

impl TimerState {
    /// Terminal states accept no further confirm/cancel/tick activity.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TimerState::Confirmed | TimerState::FalseAlarm | TimerState::TimedOut
        )
    }

    fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Armed => "armed",
            TimerState::Confirmed => "confirmed",
            TimerState::FalseAlarm => "false_alarm",
            TimerState::TimedOut => "timed_out",
        }
    }
}

/// False-alarm confirmation countdown.
///
/// Operates on wall-clock deltas -- no internal thread. The caller is
/// responsible for calling `tick()` periodically. Each timer instance
/// reaches at most one terminal state; once terminal, `tick()` is inert,
/// so no late tick can fire after confirm/cancel/timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationTimer {
    state: TimerState,
    /// Configured countdown length in milliseconds.
    timeout_ms: u64,
    /// Remaining time in milliseconds.
    remaining_ms: u64,
    /// Timestamp (ms since epoch) of the last tick while armed.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
    /// Whole-seconds value last reported via `CountdownTick`, to emit one
    /// tick event per elapsed second rather than one per poll.
    #[serde(default)]
    last_reported_secs: Option<u64>,
}

impl Default for ConfirmationTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmationTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            timeout_ms: 0,
            remaining_ms: 0,
            last_tick_epoch_ms: None,
            last_reported_secs: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Remaining whole seconds, rounded up (30_000ms -> 30, 1ms -> 1).
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_ms / 1000
    }

    pub fn is_active(&self) -> bool {
        self.state == TimerState::Armed
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the countdown: `Idle -> Armed`.
    ///
    /// # Errors
    /// - `TimerError::InvalidTimeout` if `timeout_secs == 0`.
    /// - `TimerError::InvalidTransition` if not called from `Idle`.
    pub fn start(&mut self, timeout_secs: u64) -> Result<Event, TimerError> {
        self.start_at(timeout_secs, super::now_ms())
    }

    /// Clock-injectable form of `start`, used by tests.
    pub fn start_at(&mut self, timeout_secs: u64, now_epoch_ms: u64) -> Result<Event, TimerError> {
        if timeout_secs == 0 {
            return Err(TimerError::InvalidTimeout { timeout_secs });
        }
        if self.state != TimerState::Idle {
            return Err(self.invalid("start"));
        }
        self.state = TimerState::Armed;
        self.timeout_ms = timeout_secs.saturating_mul(1000);
        self.remaining_ms = self.timeout_ms;
        self.last_tick_epoch_ms = Some(now_epoch_ms);
        self.last_reported_secs = Some(timeout_secs);
        Ok(Event::CountdownStarted {
            timeout_secs,
            at: Utc::now(),
        })
    }

    /// User confirmed a real emergency. Valid only while `Armed`.
    ///
    /// # Errors
    /// `TimerError::InvalidTransition` in any other state; the state is
    /// untouched, so an erroneous call cannot corrupt the machine.
    pub fn confirm_emergency(&mut self) -> Result<Event, TimerError> {
        if self.state != TimerState::Armed {
            return Err(self.invalid("confirm_emergency"));
        }
        self.finish(TimerState::Confirmed);
        Ok(Event::EmergencyConfirmed { at: Utc::now() })
    }

    /// User disavowed the trigger. Valid only while `Armed`.
    pub fn confirm_false_alarm(&mut self) -> Result<Event, TimerError> {
        if self.state != TimerState::Armed {
            return Err(self.invalid("confirm_false_alarm"));
        }
        self.finish(TimerState::FalseAlarm);
        Ok(Event::FalseAlarmConfirmed { at: Utc::now() })
    }

    /// Return to `Idle`. Valid only when the countdown is inactive.
    pub fn reset(&mut self) -> Result<(), TimerError> {
        if self.state == TimerState::Armed {
            return Err(self.invalid("reset"));
        }
        self.state = TimerState::Idle;
        self.timeout_ms = 0;
        self.remaining_ms = 0;
        self.last_tick_epoch_ms = None;
        self.last_reported_secs = None;
        Ok(())
    }

    /// Call periodically while armed.
    ///
    /// Returns `Some(Event::CountdownTick)` once per elapsed whole second
    /// and `Some(Event::CountdownTimedOut)` exactly once when the countdown
    /// lapses. Returns `None` in `Idle` and in every terminal state.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(super::now_ms())
    }

    /// Clock-injectable form of `tick`, used by tests and simulations.
    pub fn tick_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        if self.state != TimerState::Armed {
            return None;
        }
        let last = self.last_tick_epoch_ms?;
        let elapsed = now_epoch_ms.saturating_sub(last);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
        self.last_tick_epoch_ms = Some(now_epoch_ms);

        if self.remaining_ms == 0 {
            self.finish(TimerState::TimedOut);
            return Some(Event::CountdownTimedOut { at: Utc::now() });
        }

        let secs = self.remaining_secs();
        if self.last_reported_secs != Some(secs) {
            self.last_reported_secs = Some(secs);
            return Some(Event::CountdownTick {
                remaining_secs: secs,
                at: Utc::now(),
            });
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, terminal: TimerState) {
        debug_assert!(terminal.is_terminal());
        self.state = terminal;
        // Stopping the tick bookkeeping guarantees no late tick fires.
        self.last_tick_epoch_ms = None;
        self.last_reported_secs = None;
    }

    fn invalid(&self, operation: &str) -> TimerError {
        TimerError::InvalidTransition {
            operation: operation.to_string(),
            state: self.state.as_str().to_string(),
        }
    }
}
