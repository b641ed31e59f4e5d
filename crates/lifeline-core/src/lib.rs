//! # Lifeline Core Library
//!
//! Core business logic for Lifeline, a panic-button emergency response
//! system: a false-alarm confirmation countdown, a partial-failure-tolerant
//! notification fan-out, and the narrow collaborator interfaces (templates,
//! channels, log sink, contact directory) the workflow talks through. All
//! operations are available via a standalone CLI binary; any GUI layer is a
//! thin shell over this same library.
//!
//! ## Architecture
//!
//! - **Confirmation Timer**: a wall-clock-based state machine giving the
//!   user a bounded window to disavow an accidental trigger; the caller
//!   periodically invokes `tick()`. A lapsed countdown escalates as a real
//!   emergency.
//! - **Notification Dispatcher**: best-effort fan-out to a prioritized
//!   contact list across email and push, isolating every per-contact
//!   failure and returning a deterministic aggregate result.
//! - **Collaborators**: Storyblok CMS (templates + remote log), HTTP email
//!   gateway, mock channels for keyless operation, SQLite fallback log.
//!
//! ## Key Components
//!
//! - [`ConfirmationTimer`]: countdown state machine
//! - [`NotificationDispatcher`]: fan-out with partial-failure semantics
//! - [`EmergencyWorkflow`]: timer -> dispatcher -> log orchestration
//! - [`Config`]: injected configuration (never read from the environment
//!   inside the core)

pub mod channel;
pub mod cms;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod model;
pub mod sink;
pub mod storage;
pub mod template;
pub mod timer;
pub mod workflow;

pub use channel::{EmailChannel, HttpEmailChannel, MockEmailChannel, MockPushChannel, PushChannel};
pub use cms::StoryblokClient;
pub use dispatch::{ChannelKind, DispatchResult, NotificationOutcome, NotificationDispatcher, OutcomeStatus};
pub use error::{CoreError, TimerError};
pub use events::Event;
pub use model::{Contact, ContactDirectory, EmergencyEvent, EmergencyStatus, EmergencyType, Location};
pub use sink::{EmergencyRecord, EventLogSink, MemorySink};
pub use storage::{Config, LogDb};
pub use template::{MessageTemplate, RenderedMessage, TemplateProvider, Tier};
pub use timer::{ConfirmationTimer, Countdown, TimerState};
pub use workflow::EmergencyWorkflow;
