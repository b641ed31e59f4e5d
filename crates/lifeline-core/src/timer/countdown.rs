//! Subscription wrapper around the confirmation timer.
//!
//! UI layers want a stream of tick updates without owning the state
//! machine. `Countdown` forwards every timer event to registered
//! observers and detaches them all as soon as a terminal state is
//! reached, so no callback can fire late.

use crate::error::TimerError;
use crate::events::Event;

use super::engine::{ConfirmationTimer, TimerState};

/// Handle returned by [`Countdown::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Event) + Send>;

/// A confirmation timer plus its observers.
pub struct Countdown {
    timer: ConfirmationTimer,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            timer: ConfirmationTimer::new(),
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.timer.remaining_secs()
    }

    /// Register an observer for countdown events. Observers receive every
    /// event the underlying timer emits, including the terminal one.
    pub fn subscribe(&mut self, observer: impl FnMut(&Event) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Unknown ids are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(sub_id, _)| *sub_id != id);
    }

    pub fn start(&mut self, timeout_secs: u64) -> Result<(), TimerError> {
        let event = self.timer.start(timeout_secs)?;
        self.notify(&event);
        Ok(())
    }

    pub fn confirm_emergency(&mut self) -> Result<(), TimerError> {
        let event = self.timer.confirm_emergency()?;
        self.settle(&event);
        Ok(())
    }

    pub fn confirm_false_alarm(&mut self) -> Result<(), TimerError> {
        let event = self.timer.confirm_false_alarm()?;
        self.settle(&event);
        Ok(())
    }

    /// Drive the countdown; call once per second (or faster).
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(crate::timer::now_ms())
    }

    /// Clock-injectable form of `tick`, used by tests.
    pub fn tick_at(&mut self, now_epoch_ms: u64) -> Option<Event> {
        let event = self.timer.tick_at(now_epoch_ms)?;
        if self.timer.state().is_terminal() {
            self.settle(&event);
        } else {
            self.notify(&event);
        }
        Some(event)
    }

    pub fn reset(&mut self) -> Result<(), TimerError> {
        self.timer.reset()
    }

    fn notify(&mut self, event: &Event) {
        for (_, observer) in &mut self.observers {
            observer(event);
        }
    }

    /// Deliver the terminal event, then drop every observer so nothing
    /// fires after the countdown has settled.
    fn settle(&mut self, event: &Event) {
        self.notify(event);
        self.observers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn collecting_observer() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&Event) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let observer = move |event: &Event| {
            let tag = match event {
                Event::CountdownStarted { .. } => "started",
                Event::CountdownTick { .. } => "tick",
                Event::CountdownTimedOut { .. } => "timed_out",
                Event::EmergencyConfirmed { .. } => "confirmed",
                Event::FalseAlarmConfirmed { .. } => "false_alarm",
                _ => "other",
            };
            sink.lock().unwrap().push(tag.to_string());
        };
        (seen, observer)
    }

    #[test]
    fn observers_receive_ticks_and_terminal() {
        let mut countdown = Countdown::new();
        let (seen, observer) = collecting_observer();
        countdown.subscribe(observer);

        countdown.start(3).unwrap();
        // start() uses the wall clock; re-anchor with explicit ticks.
        let base = crate::timer::now_ms();
        countdown.tick_at(base + 1000);
        countdown.tick_at(base + 2000);
        countdown.tick_at(base + 4000);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.first().map(String::as_str), Some("started"));
        assert_eq!(seen.last().map(String::as_str), Some("timed_out"));
        assert!(seen.iter().filter(|t| *t == "timed_out").count() == 1);
    }

    #[test]
    fn no_callback_after_terminal() {
        let mut countdown = Countdown::new();
        let (seen, observer) = collecting_observer();
        countdown.subscribe(observer);

        countdown.start(30).unwrap();
        countdown.confirm_false_alarm().unwrap();
        let count_at_settle = seen.lock().unwrap().len();

        // Late polling delivers nothing to the (now detached) observer.
        let base = crate::timer::now_ms();
        countdown.tick_at(base + 60_000);
        countdown.tick_at(base + 90_000);
        assert_eq!(seen.lock().unwrap().len(), count_at_settle);
    }

    #[test]
    fn unsubscribe_detaches_observer() {
        let mut countdown = Countdown::new();
        let (seen, observer) = collecting_observer();
        let id = countdown.subscribe(observer);

        countdown.start(10).unwrap();
        countdown.unsubscribe(id);
        countdown.confirm_emergency().unwrap();

        // Only the start event was observed.
        assert_eq!(seen.lock().unwrap().as_slice(), ["started"]);
    }
}
