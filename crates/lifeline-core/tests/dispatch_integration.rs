//! Dispatcher integration tests: partial-failure isolation, counters,
//! priority truncation.

use std::sync::Arc;

use lifeline_core::channel::{MockEmailChannel, MockPushChannel};
use lifeline_core::dispatch::{ChannelKind, NotificationDispatcher, OutcomeStatus};
use lifeline_core::model::{Contact, EmergencyEvent, EmergencyType};
use lifeline_core::sink::MemorySink;
use lifeline_core::template::NoTemplates;

fn contact(name: &str, priority: u32, email: Option<&str>) -> Contact {
    Contact {
        name: name.to_string(),
        relationship: "family".to_string(),
        phone: format!("+1555{priority:04}"),
        email: email.map(|e| e.to_string()),
        is_primary: priority == 1,
        priority_order: priority,
    }
}

fn dispatcher_with(
    email: MockEmailChannel,
    push: MockPushChannel,
    sink: Arc<MemorySink>,
) -> NotificationDispatcher {
    NotificationDispatcher::new(
        Box::new(NoTemplates),
        Box::new(email),
        Box::new(push),
        sink,
    )
}

#[test]
fn empty_contact_list_is_valid_and_empty() {
    let sink = Arc::new(MemorySink::new());
    let dispatcher = dispatcher_with(MockEmailChannel::new(), MockPushChannel::new(), sink.clone());
    let event = EmergencyEvent::new(EmergencyType::PanicButton, 7).unwrap();

    let result = dispatcher.dispatch(&event, &[], 5).unwrap();

    assert!(result.success);
    assert_eq!(result.emails_sent, 0);
    assert_eq!(result.push_sent, 0);
    assert_eq!(result.total_contacts, 0);
    assert!(result.errors.is_empty());
    assert!(result.outcomes.is_empty());
    // The summary is still logged.
    assert_eq!(sink.records().len(), 1);
}

#[test]
fn contacts_without_email_still_get_push() {
    let sink = Arc::new(MemorySink::new());
    let dispatcher = dispatcher_with(MockEmailChannel::new(), MockPushChannel::new(), sink);
    let event = EmergencyEvent::new(EmergencyType::MedicalEmergency, 6).unwrap();

    // 3 contacts, 1 without email: exactly 2 email attempts, 3 push.
    let contacts = vec![
        contact("Ada", 1, Some("ada@example.com")),
        contact("Grace", 2, None),
        contact("Linus", 3, Some("linus@example.com")),
    ];
    let result = dispatcher.dispatch(&event, &contacts, 10).unwrap();

    assert_eq!(result.emails_sent, 2);
    assert_eq!(result.push_sent, 3);
    assert!(result.errors.is_empty());

    let email_outcomes: Vec<_> = result
        .outcomes
        .iter()
        .filter(|o| o.channel == ChannelKind::Email)
        .collect();
    assert_eq!(email_outcomes.len(), 2);
    // No outcome exists for the email-less contact on the email channel.
    assert!(email_outcomes.iter().all(|o| o.contact_name != "Grace"));
}

#[test]
fn one_failing_channel_does_not_abort_the_batch() {
    let sink = Arc::new(MemorySink::new());
    let email = MockEmailChannel::failing_for(&["grace@example.com"]);
    let dispatcher = dispatcher_with(email, MockPushChannel::new(), sink);
    let event = EmergencyEvent::new(EmergencyType::PanicButton, 9).unwrap();

    let contacts = vec![
        contact("Ada", 1, Some("ada@example.com")),
        contact("Grace", 2, Some("grace@example.com")),
        contact("Linus", 3, Some("linus@example.com")),
    ];
    let result = dispatcher.dispatch(&event, &contacts, 10).unwrap();

    // Dispatch completed despite the failure.
    assert!(result.success);
    assert_eq!(result.emails_sent, 2);
    assert_eq!(result.push_sent, 3);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Grace"));

    // Invariant: emails_sent + failed emails == contacts with email.
    let failed_emails = result
        .outcomes
        .iter()
        .filter(|o| o.channel == ChannelKind::Email && o.status == OutcomeStatus::Failed)
        .count();
    assert_eq!(result.emails_sent as usize + failed_emails, 3);

    // All other contacts still have outcomes.
    for name in ["Ada", "Linus"] {
        assert!(result
            .outcomes
            .iter()
            .any(|o| o.contact_name == name && o.status == OutcomeStatus::Sent));
    }
}

#[test]
fn failed_push_recorded_and_email_unaffected() {
    let sink = Arc::new(MemorySink::new());
    let push = MockPushChannel::failing_for(&["Ada"]);
    let dispatcher = dispatcher_with(MockEmailChannel::new(), push, sink);
    let event = EmergencyEvent::new(EmergencyType::FallDetection, 5).unwrap();

    let contacts = vec![contact("Ada", 1, Some("ada@example.com"))];
    let result = dispatcher.dispatch(&event, &contacts, 1).unwrap();

    assert!(result.success);
    assert_eq!(result.emails_sent, 1);
    assert_eq!(result.push_sent, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Push failed for Ada"));
}

#[test]
fn max_contacts_truncates_by_priority() {
    let sink = Arc::new(MemorySink::new());
    let email = MockEmailChannel::new();
    let push = MockPushChannel::new();
    let dispatcher = NotificationDispatcher::new(
        Box::new(NoTemplates),
        Box::new(email),
        Box::new(push),
        sink,
    );
    let event = EmergencyEvent::new(EmergencyType::PanicButton, 8).unwrap();

    // Listed out of order on purpose; priority must win.
    let contacts = vec![
        contact("Third", 3, Some("third@example.com")),
        contact("First", 1, Some("first@example.com")),
        contact("Second", 2, Some("second@example.com")),
    ];
    let result = dispatcher.dispatch(&event, &contacts, 2).unwrap();

    assert_eq!(result.total_contacts, 2);
    assert_eq!(result.emails_sent, 2);
    assert_eq!(result.push_sent, 2);
    // Contact 3 receives nothing and appears in no outcome list.
    assert!(result.outcomes.iter().all(|o| o.contact_name != "Third"));
    let notified: Vec<_> = result
        .outcomes
        .iter()
        .map(|o| o.contact_name.as_str())
        .collect();
    assert!(notified.contains(&"First"));
    assert!(notified.contains(&"Second"));
}

#[test]
fn sink_failure_does_not_affect_result() {
    let sink = Arc::new(MemorySink::failing());
    let dispatcher = dispatcher_with(MockEmailChannel::new(), MockPushChannel::new(), sink);
    let event = EmergencyEvent::new(EmergencyType::PanicButton, 8).unwrap();

    let contacts = vec![contact("Ada", 1, Some("ada@example.com"))];
    let result = dispatcher.dispatch(&event, &contacts, 5).unwrap();

    assert!(result.success);
    assert_eq!(result.emails_sent, 1);
    assert!(result.errors.is_empty());
}

#[test]
fn summary_record_lands_in_sink() {
    let sink = Arc::new(MemorySink::new());
    let email = MockEmailChannel::failing_for(&["ada@example.com"]);
    let dispatcher = dispatcher_with(email, MockPushChannel::new(), sink.clone());
    let event = EmergencyEvent::new(EmergencyType::Security, 4).unwrap();

    let contacts = vec![contact("Ada", 1, Some("ada@example.com"))];
    dispatcher.dispatch(&event, &contacts, 5).unwrap();

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].event_id, event.id);
    assert_eq!(records[0].emails_sent, 0);
    assert_eq!(records[0].push_sent, 1);
    assert_eq!(records[0].errors.len(), 1);
    assert_eq!(records[0].total_contacts, 1);
}

#[test]
fn outcomes_follow_input_contact_order() {
    let sink = Arc::new(MemorySink::new());
    let dispatcher = dispatcher_with(MockEmailChannel::new(), MockPushChannel::new(), sink);
    let event = EmergencyEvent::new(EmergencyType::PanicButton, 8).unwrap();

    let contacts = vec![
        contact("Ada", 1, Some("ada@example.com")),
        contact("Grace", 2, Some("grace@example.com")),
    ];
    let result = dispatcher.dispatch(&event, &contacts, 5).unwrap();

    // Per-contact outcomes are deterministic: email then push, contact by
    // contact, in priority order.
    let names: Vec<_> = result
        .outcomes
        .iter()
        .map(|o| (o.contact_name.as_str(), o.channel))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Ada", ChannelKind::Email),
            ("Ada", ChannelKind::Push),
            ("Grace", ChannelKind::Email),
            ("Grace", ChannelKind::Push),
        ]
    );
}
