use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{EmergencyStatus, EmergencyType};

/// Every state change in the workflow produces an Event.
/// The CLI prints them as JSON lines; UI layers subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An alert was triggered and is awaiting confirmation.
    AlertTriggered {
        event_id: Uuid,
        emergency_type: EmergencyType,
        severity: u8,
        at: DateTime<Utc>,
    },
    /// The false-alarm countdown was armed.
    CountdownStarted {
        timeout_secs: u64,
        at: DateTime<Utc>,
    },
    /// One second of the countdown elapsed.
    CountdownTick {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// User confirmed a real emergency before the countdown lapsed.
    EmergencyConfirmed {
        at: DateTime<Utc>,
    },
    /// User disavowed the trigger; escalation is cancelled.
    FalseAlarmConfirmed {
        at: DateTime<Utc>,
    },
    /// Countdown lapsed with no user response. Treated as a real
    /// emergency, never as a false alarm.
    CountdownTimedOut {
        at: DateTime<Utc>,
    },
    /// The emergency event moved forward in its lifecycle.
    StatusChanged {
        event_id: Uuid,
        from: EmergencyStatus,
        to: EmergencyStatus,
        at: DateTime<Utc>,
    },
    /// Notification fan-out finished (possibly with partial failures).
    DispatchCompleted {
        event_id: Uuid,
        emails_sent: u32,
        push_sent: u32,
        error_count: usize,
        at: DateTime<Utc>,
    },
}
