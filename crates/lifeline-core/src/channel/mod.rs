pub mod email;
pub mod push;

pub use email::{HttpEmailChannel, MockEmailChannel};
pub use push::MockPushChannel;

use crate::error::ChannelError;
use crate::model::Contact;
use crate::template::RenderedMessage;

/// Output collaborator: email transport.
pub trait EmailChannel: Send + Sync {
    /// Deliver one rendered message to one address. Failures are isolated
    /// per contact by the dispatcher; implementations should apply their
    /// own conservative timeouts and surface failures as `ChannelError`.
    fn send(&self, address: &str, message: &RenderedMessage) -> Result<(), ChannelError>;
}

/// Output collaborator: push-style notification to a contact's phone.
pub trait PushChannel: Send + Sync {
    fn send(&self, contact: &Contact, message: &RenderedMessage) -> Result<(), ChannelError>;
}
