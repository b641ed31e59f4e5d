//! Shared data model: emergency events, contacts, locations.
//!
//! `EmergencyEvent` is created when the user triggers an alert, mutated by
//! the confirmation timer (confirm/cancel/timeout) and by the dispatcher
//! (notifying -> resolved). Its status only ever moves forward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Kind of emergency trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyType {
    PanicButton,
    FallDetection,
    MedicalEmergency,
    Fire,
    Security,
    TestAlert,
}

impl EmergencyType {
    /// Human-readable label, e.g. "PANIC BUTTON" (used in messages).
    pub fn display_label(&self) -> &'static str {
        match self {
            EmergencyType::PanicButton => "PANIC BUTTON",
            EmergencyType::FallDetection => "FALL DETECTION",
            EmergencyType::MedicalEmergency => "MEDICAL EMERGENCY",
            EmergencyType::Fire => "FIRE",
            EmergencyType::Security => "SECURITY",
            EmergencyType::TestAlert => "TEST ALERT",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyType::PanicButton => "panic_button",
            EmergencyType::FallDetection => "fall_detection",
            EmergencyType::MedicalEmergency => "medical_emergency",
            EmergencyType::Fire => "fire",
            EmergencyType::Security => "security",
            EmergencyType::TestAlert => "test_alert",
        }
    }
}

/// Lifecycle status of an emergency event.
///
/// Transitions only move forward:
///
/// ```text
/// PendingConfirmation -> Confirmed -> Notifying -> Resolved
/// PendingConfirmation -> FalseAlarm
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyStatus {
    PendingConfirmation,
    Confirmed,
    FalseAlarm,
    Notifying,
    Resolved,
}

impl EmergencyStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EmergencyStatus::FalseAlarm | EmergencyStatus::Resolved)
    }

    fn allows(self, next: EmergencyStatus) -> bool {
        use EmergencyStatus::*;
        matches!(
            (self, next),
            (PendingConfirmation, Confirmed)
                | (PendingConfirmation, FalseAlarm)
                | (Confirmed, Notifying)
                | (Notifying, Resolved)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyStatus::PendingConfirmation => "pending_confirmation",
            EmergencyStatus::Confirmed => "confirmed",
            EmergencyStatus::FalseAlarm => "false_alarm",
            EmergencyStatus::Notifying => "notifying",
            EmergencyStatus::Resolved => "resolved",
        }
    }
}

/// Structured location. Absent entirely when unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

impl Location {
    /// Text form used in notification messages: the address when known,
    /// otherwise raw coordinates.
    pub fn display(&self) -> String {
        match &self.address {
            Some(addr) => addr.clone(),
            None => format!("{:.5}, {:.5}", self.latitude, self.longitude),
        }
    }
}

/// One emergency trigger, from creation to resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyEvent {
    pub id: Uuid,
    pub emergency_type: EmergencyType,
    /// 1 (lowest) to 10 (highest).
    pub severity: u8,
    #[serde(default)]
    pub location: Option<Location>,
    pub timestamp: DateTime<Utc>,
    /// Free-text assessment from the voice-AI collaborator. Opaque here.
    #[serde(default)]
    pub ai_summary: String,
    status: EmergencyStatus,
}

impl EmergencyEvent {
    /// Create a new event in `PendingConfirmation`.
    ///
    /// # Errors
    /// Returns `ModelError::SeverityOutOfRange` unless `1 <= severity <= 10`.
    pub fn new(emergency_type: EmergencyType, severity: u8) -> Result<Self, ModelError> {
        if !(1..=10).contains(&severity) {
            return Err(ModelError::SeverityOutOfRange { severity });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            emergency_type,
            severity,
            location: None,
            timestamp: Utc::now(),
            ai_summary: String::new(),
            status: EmergencyStatus::PendingConfirmation,
        })
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_ai_summary(mut self, summary: impl Into<String>) -> Self {
        self.ai_summary = summary.into();
        self
    }

    pub fn status(&self) -> EmergencyStatus {
        self.status
    }

    /// Advance the lifecycle status.
    ///
    /// # Errors
    /// Returns `ModelError::InvalidStatusTransition` for any transition not
    /// on the forward path; the status is left untouched.
    pub fn set_status(&mut self, next: EmergencyStatus) -> Result<(), ModelError> {
        if !self.status.allows(next) {
            return Err(ModelError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

/// An emergency contact, owned by the calling context. The core only
/// reads contacts -- it never mutates or persists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    /// Lower = contacted first.
    #[serde(default)]
    pub priority_order: u32,
}

/// Input collaborator: where the contact list comes from.
pub trait ContactDirectory: Send + Sync {
    /// List the emergency contacts for a user. Ordering and truncation are
    /// the dispatcher's responsibility, not the directory's.
    fn list_contacts(&self, user_id: &str) -> Result<Vec<Contact>, Box<dyn std::error::Error>>;
}
