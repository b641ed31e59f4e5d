//! Storyblok collaborator -- template provider and emergency log sink.
//!
//! Templates are fetched from the CDN API (`message_template` component,
//! one story per severity tier); log records are appended as stories via
//! the management API. An unconfigured client (no token or space id)
//! reports itself unavailable so callers fall back to defaults and the
//! local store.

use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{CmsError, SinkError, TemplateError};
use crate::model::EmergencyType;
use crate::sink::{EmergencyRecord, EventLogSink};
use crate::storage::CmsConfig;
use crate::template::{MessageTemplate, TemplateProvider, Tier};

const CDN_BASE: &str = "https://api.storyblok.com";
const MAPI_BASE: &str = "https://mapi.storyblok.com";

/// Storyblok story name for a tier's message template.
fn template_name(tier: Tier) -> &'static str {
    match tier {
        Tier::Critical => "critical_emergency_email",
        Tier::Moderate => "moderate_emergency_email",
        Tier::Low => "emergency_sms",
    }
}

pub struct StoryblokClient {
    token: String,
    space_id: String,
    cdn_base: String,
    mapi_base: String,
    client: Client,
    rt: tokio::runtime::Runtime,
}

impl StoryblokClient {
    pub fn new(config: &CmsConfig) -> Result<Self, CmsError> {
        Self::with_base_urls(&config.token, &config.space_id, CDN_BASE, MAPI_BASE)
    }

    /// Constructor with overridable endpoints, used by tests.
    pub fn with_base_urls(
        token: &str,
        space_id: &str,
        cdn_base: &str,
        mapi_base: &str,
    ) -> Result<Self, CmsError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| CmsError::Runtime(e.to_string()))?;
        Ok(Self {
            token: token.to_string(),
            space_id: space_id.to_string(),
            cdn_base: cdn_base.trim_end_matches('/').to_string(),
            mapi_base: mapi_base.trim_end_matches('/').to_string(),
            client: Client::new(),
            rt,
        })
    }

    /// Whether both token and space id are present.
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty() && !self.space_id.is_empty()
    }

    /// Fetch the message template for a tier, `Ok(None)` when the space
    /// has none.
    pub fn fetch_template(
        &self,
        _emergency_type: EmergencyType,
        tier: Tier,
    ) -> Result<Option<MessageTemplate>, CmsError> {
        if !self.is_configured() {
            return Err(CmsError::NotConfigured);
        }

        let url = format!(
            "{}/v2/cdn/stories?token={}&filter_query[component][eq]=message_template&filter_query[template_name][eq]={}&per_page=1",
            self.cdn_base,
            self.token,
            template_name(tier),
        );

        let resp = self
            .rt
            .block_on(self.client.get(&url).send())
            .map_err(|e| CmsError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CmsError::Http {
                status: resp.status().as_u16(),
            });
        }

        let body: Value = self
            .rt
            .block_on(resp.json())
            .map_err(|e| CmsError::Request(e.to_string()))?;

        let content = match body
            .get("stories")
            .and_then(|s| s.as_array())
            .and_then(|s| s.first())
            .and_then(|story| story.get("content"))
        {
            Some(content) => content,
            None => return Ok(None),
        };

        let field = |key: &str| -> String {
            content
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Ok(Some(MessageTemplate {
            subject: field("subject_template"),
            html_body: field("html_template"),
            text_body: field("text_template"),
            sms_body: field("sms_template"),
        }))
    }

    /// Append a story via the management API.
    pub fn create_story(&self, name: &str, slug: &str, content: Value) -> Result<(), CmsError> {
        if !self.is_configured() {
            return Err(CmsError::NotConfigured);
        }

        let url = format!("{}/v1/spaces/{}/stories/", self.mapi_base, self.space_id);
        let body = json!({
            "story": {
                "name": name,
                "slug": slug,
                "content": content,
            }
        });

        let resp = self
            .rt
            .block_on(
                self.client
                    .post(&url)
                    .header("Authorization", self.token.clone())
                    .json(&body)
                    .send(),
            )
            .map_err(|e| CmsError::Request(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CmsError::Http {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

impl TemplateProvider for StoryblokClient {
    fn get_template(
        &self,
        emergency_type: EmergencyType,
        tier: Tier,
    ) -> Result<Option<MessageTemplate>, TemplateError> {
        self.fetch_template(emergency_type, tier)
            .map_err(|e| TemplateError::Fetch(e.to_string()))
    }
}

impl EventLogSink for StoryblokClient {
    fn append(&self, record: &EmergencyRecord) -> Result<(), SinkError> {
        let content = json!({
            "component": "emergency_log",
            "emergency_type": record.emergency_type.as_str(),
            "severity": record.severity,
            "status": record.status.as_str(),
            "location": record.location.as_ref().map(|l| l.display()),
            "ai_summary": record.ai_summary,
            "total_contacts": record.total_contacts,
            "emails_sent": record.emails_sent,
            "push_notifications_sent": record.push_sent,
            "errors_count": record.errors.len(),
            "errors_details": record.errors.join("; "),
            "created_at": record.created_at.to_rfc3339(),
        });
        let name = format!(
            "Emergency Log - {} - {}",
            record.emergency_type.display_label(),
            record.created_at.format("%Y-%m-%d %H:%M:%S"),
        );
        let slug = format!("emergency-log-{}", record.event_id);

        self.create_story(&name, &slug, content)
            .map_err(|e| SinkError::Append(e.to_string()))
    }
}
