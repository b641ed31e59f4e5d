//! Severity tiering and message rendering.
//!
//! Messages are rendered from a template fetched from the CMS collaborator
//! when one exists for the `(emergency_type, tier)` pair, falling back to
//! built-in defaults otherwise. Substitution is plain `{{key}}` token
//! replacement; unknown tokens are left verbatim rather than blanked,
//! which downstream consumers rely on.

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::model::{Contact, EmergencyEvent, EmergencyType};

/// Severity band driving message content and recommended actions.
///
/// ```text
/// severity >= 8     -> Critical
/// 5 <= severity < 8 -> Moderate
/// severity < 5      -> Low
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Critical,
    Moderate,
    Low,
}

impl Tier {
    pub fn from_severity(severity: u8) -> Tier {
        if severity >= 8 {
            Tier::Critical
        } else if severity >= 5 {
            Tier::Moderate
        } else {
            Tier::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Critical => "CRITICAL",
            Tier::Moderate => "MODERATE",
            Tier::Low => "LOW",
        }
    }

    /// Machine tags for the tier's recommended action set.
    pub fn action_set(&self) -> &'static [&'static str] {
        match self {
            Tier::Critical => &["call_911", "go_to_location", "contact_family"],
            Tier::Moderate => &["call_contact", "consider_visiting", "stay_in_communication"],
            Tier::Low => &["call_to_check_in", "follow_up_within_hour"],
        }
    }

    /// Human phrasing of the action set, one line per action.
    pub fn action_lines(&self) -> &'static [&'static str] {
        match self {
            Tier::Critical => &[
                "Call emergency services (911) if not already contacted",
                "Go to the location immediately if safe to do so",
                "Contact other family members",
            ],
            Tier::Moderate => &[
                "Contact them immediately by phone",
                "Consider visiting their location",
                "Stay in communication until the situation is resolved",
            ],
            Tier::Low => &[
                "Call them to check on their wellbeing",
                "Follow up within the next hour",
            ],
        }
    }
}

/// Raw template text with `{{key}}` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    #[serde(default)]
    pub sms_body: String,
}

/// A template after variable substitution, ready for the channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub sms_body: String,
}

/// Input collaborator: template storage (CMS).
///
/// "Not found" is `Ok(None)`, never an error -- the dispatcher needs to
/// distinguish absence (expected, fall back quietly) from a fetch failure
/// (also recovered by fallback, but logged).
pub trait TemplateProvider: Send + Sync {
    fn get_template(
        &self,
        emergency_type: EmergencyType,
        tier: Tier,
    ) -> Result<Option<MessageTemplate>, TemplateError>;
}

/// Provider that never has a template; forces the built-in defaults.
pub struct NoTemplates;

impl TemplateProvider for NoTemplates {
    fn get_template(
        &self,
        _emergency_type: EmergencyType,
        _tier: Tier,
    ) -> Result<Option<MessageTemplate>, TemplateError> {
        Ok(None)
    }
}

/// Substitution variables available to every template.
fn template_vars(event: &EmergencyEvent, contact: &Contact) -> Vec<(&'static str, String)> {
    vec![
        ("contact_name", contact.name.clone()),
        ("emergency_type", event.emergency_type.display_label().to_string()),
        ("severity", event.severity.to_string()),
        ("timestamp", event.timestamp.to_rfc2822()),
        (
            "location",
            event
                .location
                .as_ref()
                .map(|l| l.display())
                .unwrap_or_else(|| "Location unavailable".to_string()),
        ),
        ("ai_summary", event.ai_summary.clone()),
    ]
}

fn substitute(text: &str, vars: &[(&'static str, String)]) -> String {
    let mut out = text.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{key}}}}}"), value);
    }
    // Tokens with no matching variable stay verbatim.
    out
}

/// Render a template for one contact. Used for both CMS-provided and
/// built-in templates.
pub fn render(template: &MessageTemplate, event: &EmergencyEvent, contact: &Contact) -> RenderedMessage {
    let vars = template_vars(event, contact);
    RenderedMessage {
        subject: substitute(&template.subject, &vars),
        html_body: substitute(&template.html_body, &vars),
        text_body: substitute(&template.text_body, &vars),
        sms_body: substitute(&template.sms_body, &vars),
    }
}

/// Built-in default template for a severity tier, used whenever the
/// provider has nothing or fails.
pub fn default_template(tier: Tier) -> MessageTemplate {
    let actions_text = tier
        .action_lines()
        .iter()
        .map(|line| format!("- {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    let actions_html = tier
        .action_lines()
        .iter()
        .map(|line| format!("<li>{line}</li>"))
        .collect::<Vec<_>>()
        .join("");

    let subject = format!("EMERGENCY ALERT - {{{{emergency_type}}}} [{}]", tier.label());

    let text_body = format!(
        "EMERGENCY ALERT - {{{{emergency_type}}}}\n\
         Severity: {} ({{{{severity}}}}/10)\n\
         \n\
         Hello {{{{contact_name}}}},\n\
         \n\
         Your emergency contact has activated their alert system.\n\
         \n\
         Details:\n\
         - Type: {{{{emergency_type}}}}\n\
         - Time: {{{{timestamp}}}}\n\
         - Location: {{{{location}}}}\n\
         - AI Assessment: {{{{ai_summary}}}}\n\
         \n\
         Recommended actions:\n\
         {actions_text}\n",
        tier.label(),
    );

    let html_body = format!(
        "<h1>EMERGENCY ALERT</h1>\
         <p>Severity: {} ({{{{severity}}}}/10)</p>\
         <p>Hello <strong>{{{{contact_name}}}}</strong>, your emergency contact \
         has activated their alert system.</p>\
         <ul>\
         <li>Type: {{{{emergency_type}}}}</li>\
         <li>Time: {{{{timestamp}}}}</li>\
         <li>Location: {{{{location}}}}</li>\
         <li>AI Assessment: {{{{ai_summary}}}}</li>\
         </ul>\
         <h3>Recommended actions</h3><ul>{actions_html}</ul>",
        tier.label(),
    );

    let sms_body = format!(
        "EMERGENCY [{}]: {{{{emergency_type}}}}, severity {{{{severity}}}}/10 at {{{{location}}}}. {}",
        tier.label(),
        tier.action_lines()[0],
    );

    MessageTemplate {
        subject,
        html_body,
        text_body,
        sms_body,
    }
}

/// Resolve and render the message for one contact: provider first, then
/// the built-in default. Provider failures are recovered locally and
/// surfaced only as a log line.
pub fn resolve_message(
    provider: &dyn TemplateProvider,
    event: &EmergencyEvent,
    contact: &Contact,
) -> RenderedMessage {
    let tier = Tier::from_severity(event.severity);
    let template = match provider.get_template(event.emergency_type, tier) {
        Ok(Some(template)) => template,
        Ok(None) => default_template(tier),
        Err(e) => {
            eprintln!("Warning: template fetch failed, using default: {e}");
            default_template(tier)
        }
    };
    render(&template, event, contact)
}
