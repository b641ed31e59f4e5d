//! Notification fan-out.
//!
//! Given a confirmed emergency event and a prioritized contact list, the
//! dispatcher attempts email (when an address exists) and push (always)
//! for each selected contact. Every per-contact, per-channel failure is
//! caught, recorded, and isolated: nothing short of structurally invalid
//! input aborts the batch. The aggregate result is deterministic -- one
//! outcome per attempt, in input contact order.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::channel::{EmailChannel, PushChannel};
use crate::error::DispatchError;
use crate::model::{Contact, EmergencyEvent};
use crate::sink::{EmergencyRecord, EventLogSink};
use crate::template::{resolve_message, TemplateProvider};

/// Channel a notification attempt went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Email,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Sent,
    Failed,
}

/// One notification attempt, per contact per channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub channel: ChannelKind,
    /// Email address or phone number the attempt targeted.
    pub recipient: String,
    pub contact_name: String,
    pub status: OutcomeStatus,
    #[serde(default)]
    pub error: Option<String>,
}

/// Aggregated result of one dispatch. Immutable once returned.
///
/// `success` stays true as long as the dispatch process itself completed,
/// even when every individual send failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success: bool,
    pub emails_sent: u32,
    pub push_sent: u32,
    /// Number of contacts actually selected (after truncation).
    pub total_contacts: usize,
    pub errors: Vec<String>,
    pub outcomes: Vec<NotificationOutcome>,
}

/// Best-effort, partial-failure-tolerant notification fan-out.
pub struct NotificationDispatcher {
    templates: Box<dyn TemplateProvider>,
    email: Box<dyn EmailChannel>,
    push: Box<dyn PushChannel>,
    sink: Arc<dyn EventLogSink>,
}

impl NotificationDispatcher {
    pub fn new(
        templates: Box<dyn TemplateProvider>,
        email: Box<dyn EmailChannel>,
        push: Box<dyn PushChannel>,
        sink: Arc<dyn EventLogSink>,
    ) -> Self {
        Self {
            templates,
            email,
            push,
            sink,
        }
    }

    /// Fan out notifications for one event.
    ///
    /// Contacts are notified in `priority_order` ascending (ties keep list
    /// order), truncated to the first `max_contacts`. An empty list is a
    /// valid dispatch producing an empty result, not an error.
    ///
    /// # Errors
    /// Only structural problems fail hard (severity off the 1-10 scale).
    pub fn dispatch(
        &self,
        event: &EmergencyEvent,
        contacts: &[Contact],
        max_contacts: usize,
    ) -> Result<DispatchResult, DispatchError> {
        if !(1..=10).contains(&event.severity) {
            return Err(DispatchError::MalformedEvent(format!(
                "severity {} out of range",
                event.severity
            )));
        }

        let selected = select_contacts(contacts, max_contacts);

        let mut result = DispatchResult {
            success: true,
            emails_sent: 0,
            push_sent: 0,
            total_contacts: selected.len(),
            errors: Vec::new(),
            outcomes: Vec::new(),
        };

        for contact in &selected {
            let message = resolve_message(self.templates.as_ref(), event, contact);

            if let Some(address) = &contact.email {
                match self.email.send(address, &message) {
                    Ok(()) => {
                        result.emails_sent += 1;
                        result.outcomes.push(NotificationOutcome {
                            channel: ChannelKind::Email,
                            recipient: address.clone(),
                            contact_name: contact.name.clone(),
                            status: OutcomeStatus::Sent,
                            error: None,
                        });
                    }
                    Err(e) => {
                        result
                            .errors
                            .push(format!("Email failed for {}: {e}", contact.name));
                        result.outcomes.push(NotificationOutcome {
                            channel: ChannelKind::Email,
                            recipient: address.clone(),
                            contact_name: contact.name.clone(),
                            status: OutcomeStatus::Failed,
                            error: Some(e.to_string()),
                        });
                    }
                }
            }

            // Push is attempted regardless of the email outcome.
            match self.push.send(contact, &message) {
                Ok(()) => {
                    result.push_sent += 1;
                    result.outcomes.push(NotificationOutcome {
                        channel: ChannelKind::Push,
                        recipient: contact.phone.clone(),
                        contact_name: contact.name.clone(),
                        status: OutcomeStatus::Sent,
                        error: None,
                    });
                }
                Err(e) => {
                    result
                        .errors
                        .push(format!("Push failed for {}: {e}", contact.name));
                    result.outcomes.push(NotificationOutcome {
                        channel: ChannelKind::Push,
                        recipient: contact.phone.clone(),
                        contact_name: contact.name.clone(),
                        status: OutcomeStatus::Failed,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        // Summary goes to the log sink; a sink failure must not affect the
        // result handed back to the user-facing flow.
        let record = summary_record(event, &result);
        if let Err(e) = self.sink.append(&record) {
            eprintln!("Warning: failed to append dispatch summary: {e}");
        }

        Ok(result)
    }

    pub fn sink(&self) -> Arc<dyn EventLogSink> {
        self.sink.clone()
    }
}

/// First `max_contacts` by ascending `priority_order`; stable for ties.
fn select_contacts(contacts: &[Contact], max_contacts: usize) -> Vec<Contact> {
    let mut selected: Vec<Contact> = contacts.to_vec();
    selected.sort_by_key(|c| c.priority_order);
    selected.truncate(max_contacts);
    selected
}

fn summary_record(event: &EmergencyEvent, result: &DispatchResult) -> EmergencyRecord {
    EmergencyRecord {
        event_id: event.id,
        emergency_type: event.emergency_type,
        severity: event.severity,
        status: event.status(),
        location: event.location.clone(),
        ai_summary: event.ai_summary.clone(),
        total_contacts: result.total_contacts,
        emails_sent: result.emails_sent,
        push_sent: result.push_sent,
        errors: result.errors.clone(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_orders_by_priority_then_truncates() {
        let contacts = vec![
            contact("Low", 3),
            contact("First", 1),
            contact("Second", 2),
        ];
        let selected = select_contacts(&contacts, 2);
        assert_eq!(selected[0].name, "First");
        assert_eq!(selected[1].name, "Second");
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn selection_ties_keep_list_order() {
        let contacts = vec![contact("A", 1), contact("B", 1), contact("C", 1)];
        let selected = select_contacts(&contacts, 3);
        let names: Vec<&str> = selected.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    fn contact(name: &str, priority: u32) -> Contact {
        Contact {
            name: name.to_string(),
            relationship: "friend".to_string(),
            phone: format!("+1555{priority:04}"),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            is_primary: priority == 1,
            priority_order: priority,
        }
    }
}
