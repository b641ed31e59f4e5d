//! SQLite-based emergency log.
//!
//! The local fallback for the event log sink: every dispatch summary is
//! appended here when no CMS is configured (and it doubles as the backing
//! store for the CLI log viewer).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::error::{SinkError, StorageError};
use crate::model::{EmergencyStatus, EmergencyType, Location};
use crate::sink::{EmergencyRecord, EventLogSink};

use super::data_dir;

/// SQLite database for the emergency log.
pub struct LogDb {
    conn: std::sync::Mutex<Connection>,
}

impl LogDb {
    /// Open the database at `~/.config/lifeline/lifeline.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("lifeline.db");
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self {
            conn: std::sync::Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: std::sync::Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.lock().unwrap().execute_batch(
            "CREATE TABLE IF NOT EXISTS emergency_log (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id       TEXT NOT NULL,
                emergency_type TEXT NOT NULL,
                severity       INTEGER NOT NULL,
                status         TEXT NOT NULL,
                latitude       REAL,
                longitude      REAL,
                address        TEXT,
                ai_summary     TEXT NOT NULL DEFAULT '',
                total_contacts INTEGER NOT NULL,
                emails_sent    INTEGER NOT NULL,
                push_sent      INTEGER NOT NULL,
                errors         TEXT NOT NULL DEFAULT '[]',
                created_at     TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_emergency_log_created_at
                ON emergency_log(created_at);",
        )?;
        Ok(())
    }

    /// Append one record to the log.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn append_record(&self, record: &EmergencyRecord) -> Result<(), StorageError> {
        let errors_json =
            serde_json::to_string(&record.errors).unwrap_or_else(|_| "[]".to_string());
        self.conn.lock().unwrap().execute(
            "INSERT INTO emergency_log (
                event_id, emergency_type, severity, status,
                latitude, longitude, address, ai_summary,
                total_contacts, emails_sent, push_sent, errors, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                record.event_id.to_string(),
                record.emergency_type.as_str(),
                record.severity,
                record.status.as_str(),
                record.location.as_ref().map(|l| l.latitude),
                record.location.as_ref().map(|l| l.longitude),
                record.location.as_ref().and_then(|l| l.address.clone()),
                record.ai_summary,
                record.total_contacts as i64,
                record.emails_sent,
                record.push_sent,
                errors_json,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Most recent records, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<EmergencyRecord>, StorageError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT event_id, emergency_type, severity, status,
                    latitude, longitude, address, ai_summary,
                    total_contacts, emails_sent, push_sent, errors, created_at
             FROM emergency_log
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let event_id: String = row.get(0)?;
            let emergency_type: String = row.get(1)?;
            let severity: u8 = row.get(2)?;
            let status: String = row.get(3)?;
            let latitude: Option<f64> = row.get(4)?;
            let longitude: Option<f64> = row.get(5)?;
            let address: Option<String> = row.get(6)?;
            let ai_summary: String = row.get(7)?;
            let total_contacts: i64 = row.get(8)?;
            let emails_sent: u32 = row.get(9)?;
            let push_sent: u32 = row.get(10)?;
            let errors: String = row.get(11)?;
            let created_at: String = row.get(12)?;
            Ok((
                event_id,
                emergency_type,
                severity,
                status,
                latitude,
                longitude,
                address,
                ai_summary,
                total_contacts,
                emails_sent,
                push_sent,
                errors,
                created_at,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (
                event_id,
                emergency_type,
                severity,
                status,
                latitude,
                longitude,
                address,
                ai_summary,
                total_contacts,
                emails_sent,
                push_sent,
                errors,
                created_at,
            ) = row?;

            let location = match (latitude, longitude) {
                (Some(latitude), Some(longitude)) => Some(Location {
                    latitude,
                    longitude,
                    address,
                }),
                _ => None,
            };

            records.push(EmergencyRecord {
                event_id: event_id.parse::<Uuid>().unwrap_or_default(),
                emergency_type: parse_emergency_type(&emergency_type),
                severity,
                status: parse_status(&status),
                location,
                ai_summary,
                total_contacts: total_contacts as usize,
                emails_sent,
                push_sent,
                errors: serde_json::from_str(&errors).unwrap_or_default(),
                created_at: created_at
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now()),
            });
        }
        Ok(records)
    }
}

fn parse_emergency_type(raw: &str) -> EmergencyType {
    match raw {
        "fall_detection" => EmergencyType::FallDetection,
        "medical_emergency" => EmergencyType::MedicalEmergency,
        "fire" => EmergencyType::Fire,
        "security" => EmergencyType::Security,
        "test_alert" => EmergencyType::TestAlert,
        _ => EmergencyType::PanicButton,
    }
}

fn parse_status(raw: &str) -> EmergencyStatus {
    match raw {
        "pending_confirmation" => EmergencyStatus::PendingConfirmation,
        "confirmed" => EmergencyStatus::Confirmed,
        "false_alarm" => EmergencyStatus::FalseAlarm,
        "notifying" => EmergencyStatus::Notifying,
        _ => EmergencyStatus::Resolved,
    }
}

impl EventLogSink for LogDb {
    fn append(&self, record: &EmergencyRecord) -> Result<(), SinkError> {
        self.append_record(record)
            .map_err(|e| SinkError::Append(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(severity: u8) -> EmergencyRecord {
        EmergencyRecord {
            event_id: Uuid::new_v4(),
            emergency_type: EmergencyType::PanicButton,
            severity,
            status: EmergencyStatus::Resolved,
            location: Some(Location {
                latitude: 37.0,
                longitude: -122.0,
                address: Some("somewhere".to_string()),
            }),
            ai_summary: "ok".to_string(),
            total_contacts: 2,
            emails_sent: 1,
            push_sent: 2,
            errors: vec!["Email failed for Ada: boom".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn append_and_read_back() {
        let db = LogDb::open_memory().unwrap();
        db.append_record(&record(8)).unwrap();
        db.append_record(&record(3)).unwrap();

        let recent = db.recent(10).unwrap();
        assert_eq!(recent.len(), 2);
        // Newest first.
        assert_eq!(recent[0].severity, 3);
        assert_eq!(recent[1].severity, 8);
        assert_eq!(recent[1].errors.len(), 1);
        assert_eq!(
            recent[1].location.as_ref().unwrap().address.as_deref(),
            Some("somewhere")
        );
    }

    #[test]
    fn recent_respects_limit() {
        let db = LogDb::open_memory().unwrap();
        for s in 1..=5 {
            db.append_record(&record(s)).unwrap();
        }
        assert_eq!(db.recent(3).unwrap().len(), 3);
    }
}
