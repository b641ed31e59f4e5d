//! End-to-end emergency workflow.
//!
//! Wires the confirmation timer to the notification dispatcher for one
//! trigger: user action arms the countdown; confirm-emergency or timeout
//! escalates into the fan-out; confirm-false-alarm short-circuits before
//! the dispatcher ever runs. Whatever the channels do, the workflow always
//! settles into exactly one of three outcomes (confirmed / false alarm /
//! timed-out-as-emergency) and, when escalated, always produces a
//! `DispatchResult`.

use chrono::Utc;

use crate::dispatch::{DispatchResult, NotificationDispatcher};
use crate::error::{CoreError, TimerError};
use crate::events::Event;
use crate::model::{Contact, EmergencyEvent, EmergencyStatus};
use crate::sink::{EmergencyRecord, EventLogSink};
use crate::timer::{ConfirmationTimer, TimerState};

pub struct EmergencyWorkflow {
    event: EmergencyEvent,
    timer: ConfirmationTimer,
    dispatcher: NotificationDispatcher,
    contacts: Vec<Contact>,
    max_contacts: usize,
    dispatch_result: Option<DispatchResult>,
}

impl EmergencyWorkflow {
    /// Arm the workflow for an already-created event.
    ///
    /// # Errors
    /// `TimerError::InvalidTimeout` when `timeout_secs == 0`.
    pub fn trigger(
        event: EmergencyEvent,
        contacts: Vec<Contact>,
        max_contacts: usize,
        timeout_secs: u64,
        dispatcher: NotificationDispatcher,
    ) -> Result<(Self, Vec<Event>), CoreError> {
        let mut timer = ConfirmationTimer::new();
        let started = timer.start(timeout_secs)?;
        let triggered = Event::AlertTriggered {
            event_id: event.id,
            emergency_type: event.emergency_type,
            severity: event.severity,
            at: Utc::now(),
        };
        let workflow = Self {
            event,
            timer,
            dispatcher,
            contacts,
            max_contacts,
            dispatch_result: None,
        };
        Ok((workflow, vec![triggered, started]))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn event(&self) -> &EmergencyEvent {
        &self.event
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.timer.remaining_secs()
    }

    /// Present once the workflow has escalated and dispatched.
    pub fn dispatch_result(&self) -> Option<&DispatchResult> {
        self.dispatch_result.as_ref()
    }

    pub fn is_settled(&self) -> bool {
        self.event.status().is_terminal()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Drive the countdown. On timeout this escalates into the full
    /// dispatch sequence, so the returned events may include status
    /// changes and the dispatch summary.
    pub fn tick(&mut self) -> Result<Vec<Event>, CoreError> {
        self.tick_at(crate::timer::now_ms())
    }

    /// Clock-injectable form of `tick`, used by tests and simulations.
    pub fn tick_at(&mut self, now_epoch_ms: u64) -> Result<Vec<Event>, CoreError> {
        match self.timer.tick_at(now_epoch_ms) {
            Some(Event::CountdownTimedOut { at }) => {
                let mut events = vec![Event::CountdownTimedOut { at }];
                events.extend(self.escalate()?);
                Ok(events)
            }
            Some(event) => Ok(vec![event]),
            None => Ok(Vec::new()),
        }
    }

    /// User confirmed a real emergency: escalate immediately.
    ///
    /// # Errors
    /// `TimerError::InvalidTransition` when the countdown already settled
    /// (recoverable; nothing changes).
    pub fn confirm_emergency(&mut self) -> Result<Vec<Event>, CoreError> {
        let confirmed = self.timer.confirm_emergency()?;
        let mut events = vec![confirmed];
        events.extend(self.escalate()?);
        Ok(events)
    }

    /// User disavowed the trigger: cancel before any notification runs.
    pub fn confirm_false_alarm(&mut self) -> Result<Vec<Event>, CoreError> {
        let cancelled = self.timer.confirm_false_alarm()?;
        let from = self.event.status();
        self.event.set_status(EmergencyStatus::FalseAlarm)?;

        // Record the false alarm for the log viewer; best-effort.
        let record = self.false_alarm_record();
        if let Err(e) = self.dispatcher.sink().append(&record) {
            eprintln!("Warning: failed to log false alarm: {e}");
        }

        Ok(vec![
            cancelled,
            Event::StatusChanged {
                event_id: self.event.id,
                from,
                to: EmergencyStatus::FalseAlarm,
                at: Utc::now(),
            },
        ])
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Confirmed (by user or by timeout): run the status sequence
    /// confirmed -> notifying -> dispatch -> resolved.
    fn escalate(&mut self) -> Result<Vec<Event>, CoreError> {
        let mut events = Vec::new();
        for next in [EmergencyStatus::Confirmed, EmergencyStatus::Notifying] {
            let from = self.event.status();
            self.event.set_status(next)?;
            events.push(Event::StatusChanged {
                event_id: self.event.id,
                from,
                to: next,
                at: Utc::now(),
            });
        }

        let result = self
            .dispatcher
            .dispatch(&self.event, &self.contacts, self.max_contacts)?;
        events.push(Event::DispatchCompleted {
            event_id: self.event.id,
            emails_sent: result.emails_sent,
            push_sent: result.push_sent,
            error_count: result.errors.len(),
            at: Utc::now(),
        });
        self.dispatch_result = Some(result);

        let from = self.event.status();
        self.event.set_status(EmergencyStatus::Resolved)?;
        events.push(Event::StatusChanged {
            event_id: self.event.id,
            from,
            to: EmergencyStatus::Resolved,
            at: Utc::now(),
        });
        Ok(events)
    }

    fn false_alarm_record(&self) -> EmergencyRecord {
        EmergencyRecord {
            event_id: self.event.id,
            emergency_type: self.event.emergency_type,
            severity: self.event.severity,
            status: self.event.status(),
            location: self.event.location.clone(),
            ai_summary: self.event.ai_summary.clone(),
            total_contacts: 0,
            emails_sent: 0,
            push_sent: 0,
            errors: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Convenience: is this error the recoverable "already settled" case?
pub fn is_recoverable_transition(err: &CoreError) -> bool {
    matches!(
        err,
        CoreError::Timer(TimerError::InvalidTransition { .. })
    )
}
