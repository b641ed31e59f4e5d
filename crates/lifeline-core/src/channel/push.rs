//! Push notification delivery.
//!
//! There is no real push gateway behind this channel yet; the mock stands
//! in for one, recording sends against the contact's phone number. The
//! dispatcher treats it identically to any other channel.

use std::sync::Mutex;

use crate::error::ChannelError;
use crate::model::Contact;
use crate::template::RenderedMessage;

use super::PushChannel;

/// Record of one mock push send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentPush {
    pub contact_name: String,
    pub phone: String,
}

/// Always-succeeding push channel that records deliveries. Contacts named
/// in `fail_for` fail instead, to exercise the dispatcher's isolation.
#[derive(Default)]
pub struct MockPushChannel {
    sent: Mutex<Vec<SentPush>>,
    fail_for: Vec<String>,
}

impl MockPushChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that fails for the given contact names.
    pub fn failing_for(names: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<SentPush> {
        self.sent.lock().unwrap().clone()
    }
}

impl PushChannel for MockPushChannel {
    fn send(&self, contact: &Contact, _message: &RenderedMessage) -> Result<(), ChannelError> {
        if self.fail_for.iter().any(|n| n == &contact.name) {
            return Err(ChannelError::Send(format!(
                "mock failure for {}",
                contact.name
            )));
        }
        self.sent.lock().unwrap().push(SentPush {
            contact_name: contact.name.clone(),
            phone: contact.phone.clone(),
        });
        Ok(())
    }
}
