//! The `trigger` command: run one alert through the confirmation and
//! notification workflow, printing every event as a JSON line.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use lifeline_core::channel::{HttpEmailChannel, MockEmailChannel, MockPushChannel};
use lifeline_core::dispatch::NotificationDispatcher;
use lifeline_core::sink::EventLogSink;
use lifeline_core::template::{NoTemplates, TemplateProvider};
use lifeline_core::workflow::{is_recoverable_transition, EmergencyWorkflow};
use lifeline_core::{
    Config, EmailChannel, EmergencyEvent, EmergencyType, Event, Location, LogDb, StoryblokClient,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TriggerType {
    PanicButton,
    FallDetection,
    MedicalEmergency,
    Fire,
    Security,
    TestAlert,
}

impl From<TriggerType> for EmergencyType {
    fn from(value: TriggerType) -> Self {
        match value {
            TriggerType::PanicButton => EmergencyType::PanicButton,
            TriggerType::FallDetection => EmergencyType::FallDetection,
            TriggerType::MedicalEmergency => EmergencyType::MedicalEmergency,
            TriggerType::Fire => EmergencyType::Fire,
            TriggerType::Security => EmergencyType::Security,
            TriggerType::TestAlert => EmergencyType::TestAlert,
        }
    }
}

#[derive(Args)]
pub struct TriggerArgs {
    /// Kind of emergency
    #[arg(long, value_enum, default_value = "panic-button")]
    pub emergency_type: TriggerType,
    /// Severity, 1 (lowest) to 10 (highest)
    #[arg(long, default_value = "8")]
    pub severity: u8,
    /// Confirmation window in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,
    /// AI assessment summary to attach to the event
    #[arg(long)]
    pub summary: Option<String>,
    /// Latitude of the emergency location
    #[arg(long, requires = "longitude")]
    pub latitude: Option<f64>,
    /// Longitude of the emergency location
    #[arg(long, requires = "latitude")]
    pub longitude: Option<f64>,
    /// Street address of the emergency location
    #[arg(long)]
    pub address: Option<String>,
    /// Confirm the emergency immediately instead of waiting
    #[arg(long, conflicts_with = "false_alarm")]
    pub confirm: bool,
    /// Cancel as a false alarm immediately instead of waiting
    #[arg(long)]
    pub false_alarm: bool,
}

/// Assemble the dispatcher from config: real collaborators when keys are
/// present, mock/local fallbacks otherwise.
fn build_dispatcher(config: &Config) -> Result<NotificationDispatcher, Box<dyn std::error::Error>> {
    let templates: Box<dyn TemplateProvider> = if config.cms_configured() {
        Box::new(StoryblokClient::new(&config.cms)?)
    } else {
        Box::new(NoTemplates)
    };

    let email: Box<dyn EmailChannel> = match HttpEmailChannel::from_config(&config.email) {
        Some(channel) => Box::new(channel?),
        None => {
            eprintln!("No email gateway configured; using mock email channel");
            Box::new(MockEmailChannel::new())
        }
    };

    let sink: Arc<dyn EventLogSink> = if config.cms_configured() {
        Arc::new(StoryblokClient::new(&config.cms)?)
    } else {
        Arc::new(LogDb::open()?)
    };

    Ok(NotificationDispatcher::new(
        templates,
        email,
        Box::new(MockPushChannel::new()),
        sink,
    ))
}

fn print_events(events: &[Event]) -> Result<(), Box<dyn std::error::Error>> {
    for event in events {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

pub fn run(args: TriggerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let dispatcher = build_dispatcher(&config)?;

    let mut event = EmergencyEvent::new(args.emergency_type.into(), args.severity)?;
    if let (Some(latitude), Some(longitude)) = (args.latitude, args.longitude) {
        event = event.with_location(Location {
            latitude,
            longitude,
            address: args.address.clone(),
        });
    }
    if let Some(summary) = &args.summary {
        event = event.with_ai_summary(summary.clone());
    }

    let timeout = args
        .timeout
        .unwrap_or(config.alert.confirmation_timeout_secs);
    let (mut workflow, events) = EmergencyWorkflow::trigger(
        event,
        config.contacts.clone(),
        config.alert.max_contacts,
        timeout,
        dispatcher,
    )?;
    print_events(&events)?;

    if args.confirm {
        print_events(&workflow.confirm_emergency()?)?;
    } else if args.false_alarm {
        print_events(&workflow.confirm_false_alarm()?)?;
    } else {
        // Wait out the countdown; timeout escalates as a real emergency.
        while !workflow.is_settled() {
            std::thread::sleep(Duration::from_millis(250));
            match workflow.tick() {
                Ok(events) => print_events(&events)?,
                Err(e) if is_recoverable_transition(&e) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }

    if let Some(result) = workflow.dispatch_result() {
        println!("{}", serde_json::to_string_pretty(result)?);
    }
    Ok(())
}
