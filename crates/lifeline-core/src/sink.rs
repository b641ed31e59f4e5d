//! Event log sink: append-only persistence of emergency outcomes.
//!
//! The sink is fire-and-forget from the core's perspective: append
//! failures are logged by the caller and never propagated into the
//! user-facing dispatch result.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SinkError;
use crate::model::{EmergencyStatus, EmergencyType, Location};

/// Snapshot of an emergency event and its dispatch outcome, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyRecord {
    pub event_id: Uuid,
    pub emergency_type: EmergencyType,
    pub severity: u8,
    pub status: EmergencyStatus,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub ai_summary: String,
    pub total_contacts: usize,
    pub emails_sent: u32,
    pub push_sent: u32,
    #[serde(default)]
    pub errors: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Output collaborator: append-only emergency log.
pub trait EventLogSink: Send + Sync {
    fn append(&self, record: &EmergencyRecord) -> Result<(), SinkError>;
}

/// In-memory sink for tests and for running without any configured store.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<EmergencyRecord>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose every append fails, for log-and-continue tests.
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<EmergencyRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl EventLogSink for MemorySink {
    fn append(&self, record: &EmergencyRecord) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Append("memory sink configured to fail".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
